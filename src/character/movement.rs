//! 移动与接地积分
//!
//! 每帧顺序：速度（重力、摩擦）→ 位置（防穿透射线）→ 接地（球体与舞台）。
//! 调参常量以 60fps 帧为单位，乘以经过帧数使用。

use glam::{Vec2, Vec3};

use super::{Character, InputState};
use crate::collision::{ray_intersect_model, sphere_intersect_model};
use crate::convert_to_game_frame;
use crate::model::Model;
use crate::physics::SandboxConfig;

/// 接地时每帧的微小下压速度，保证持续检测到地面
const GROUND_STICK_SPEED: f32 = 0.001;
/// 接地检测次数（第二次降低检测高度，防止下坡、下台阶时浮空）
const GROUND_PASSES: usize = 2;
/// 空中最大移动速度比例
const AIR_MOVE_SPEED_SCALE: f32 = 0.8;
/// 根运动时水平速度衰减
const ROOT_MOTION_VELOCITY_DAMPING: f32 = 0.8;

/// 把向量投影到法线所在平面
#[inline]
fn project_on_plane(vec: Vec3, normal: Vec3) -> Vec3 {
    normal.cross(vec.cross(normal))
}

impl Character {
    /// 摄像机相对的转身与加速
    ///
    /// 根运动开启时位移来自动画（投影到地面），否则加速水平速度。
    pub fn input_movement(&mut self, elapsed_time: f32, input: &InputState, config: &SandboxConfig) {
        let front = Vec2::new(input.camera_front.x, input.camera_front.z).normalize_or_zero();
        let right = Vec2::new(input.camera_right.x, input.camera_right.z).normalize_or_zero();

        // 转身
        let move_x = front.x * input.axis_y + right.x * input.axis_x;
        let move_z = front.y * input.axis_y + right.y * input.axis_x;
        let move_length = (move_x * move_x + move_z * move_z).sqrt();
        if move_length > 0.0 {
            let vec_x = move_x / move_length;
            let vec_z = move_z / move_length;
            let dir_x = self.angle.y.sin();
            let dir_z = self.angle.y.cos();
            let cross = dir_x * vec_z - dir_z * vec_x;
            let dot = dir_x * vec_x + dir_z * vec_z;

            let mut turn_speed = config.turn_speed * elapsed_time;
            if !self.on_ground {
                turn_speed *= config.air_control;
            }
            let rot = (1.0 - dot).min(turn_speed);
            if cross < 0.0 {
                self.angle.y += rot;
            } else {
                self.angle.y -= rot;
            }
        }

        // 移动
        if self.player.root_motion_enabled() {
            let translation = self.transform.transform_vector3(self.player.root_motion_translation());
            let translation = project_on_plane(translation, self.ground_normal);

            self.velocity.x *= ROOT_MOTION_VELOCITY_DAMPING;
            self.velocity.z *= ROOT_MOTION_VELOCITY_DAMPING;
            self.delta_move += translation;
        } else if move_length > 0.0 {
            let length = Vec2::new(self.velocity.x, self.velocity.z).length();
            if length <= config.move_speed {
                let mut acceleration = config.acceleration * convert_to_game_frame(elapsed_time);
                let mut move_speed = config.move_speed;
                if !self.on_ground {
                    acceleration *= config.air_control;
                    move_speed *= AIR_MOVE_SPEED_SCALE;
                }

                // 限速
                let mut vec = Vec3::new(
                    self.velocity.x + move_x * acceleration,
                    0.0,
                    self.velocity.z + move_z * acceleration,
                );
                let length = vec.length();
                if length > move_speed {
                    vec *= move_speed / length;
                }
                vec.x -= self.velocity.x;
                vec.z -= self.velocity.z;

                // 沿斜面加速
                let vec = project_on_plane(vec, self.ground_normal);
                self.velocity.x += vec.x;
                self.velocity.z += vec.z;
                self.delta_move.y += vec.y * elapsed_time;
            }
        }

        self.desired_direction = Vec3::new(move_x, 0.0, move_z);
    }

    /// 重力与水平摩擦，并把速度累加到本帧位移
    pub fn update_velocity(&mut self, elapsed_time: f32, config: &SandboxConfig) {
        let elapsed_frame = convert_to_game_frame(elapsed_time);

        if self.on_ground {
            self.velocity.y -= GROUND_STICK_SPEED;
        } else {
            self.velocity.y -= config.gravity * elapsed_frame;
        }

        let horizontal = Vec2::new(self.velocity.x, self.velocity.z);
        let length = horizontal.length();
        if length > 0.0 {
            let mut friction = config.friction * elapsed_frame;
            if !self.on_ground {
                friction *= config.air_control;
            }
            let horizontal = if length > friction {
                horizontal - horizontal / length * friction
            } else {
                Vec2::ZERO
            };
            self.velocity.x = horizontal.x;
            self.velocity.z = horizontal.y;
        }

        self.delta_move += self.velocity * elapsed_time;
    }

    /// 应用本帧位移，再与舞台做接地处理
    pub fn update_position(&mut self, elapsed_time: f32, stage: &Model, config: &SandboxConfig) {
        let radius = config.radius;
        let up = Vec3::new(0.0, radius, 0.0);

        // 射线防止高速时穿过薄墙
        let range = radius * 0.5;
        let direction = self.delta_move.normalize_or_zero();
        let ray_start = self.position + up;
        let ray_end = ray_start + direction * range + self.delta_move;
        match ray_intersect_model(ray_start, ray_end, stage) {
            Some(hit) => self.position = hit.position + hit.normal * range - up,
            None => self.position += self.delta_move,
        }
        self.delta_move = Vec3::ZERO;

        self.resolve_ground(elapsed_time, stage, config);
    }

    /// 球体与舞台相交，平均所有接触位置
    ///
    /// 下落中接触到坡度不超过上限的面时接地。上一帧接地而本次没有时，
    /// 降低检测高度再试一次。
    fn resolve_ground(&mut self, elapsed_time: f32, stage: &Model, config: &SandboxConfig) {
        let radius = config.radius;
        let up = Vec3::new(0.0, radius, 0.0);
        let was_on_ground = self.on_ground;
        self.on_ground = false;

        let mut center = self.position + up;
        let ground_adjust = config.ground_adjust * convert_to_game_frame(elapsed_time);

        for _ in 0..GROUND_PASSES {
            if sphere_intersect_model(center, radius, stage, &mut self.hits) {
                let mut hit_position = Vec3::ZERO;
                let mut ground_normal = Vec3::ZERO;
                let mut ground_count = 0usize;
                for hit in &self.hits {
                    if self.velocity.y < 0.0 {
                        let degree = hit.normal.y.clamp(-1.0, 1.0).acos().to_degrees();
                        if degree <= config.slope_limit {
                            self.on_ground = true;
                            self.velocity.y = 0.0;
                            ground_normal += hit.normal;
                            ground_count += 1;
                        }
                    }
                    hit_position += hit.position;
                }

                self.position = hit_position / self.hits.len() as f32 - up;
                if ground_count > 0 {
                    self.ground_normal = ground_normal / ground_count as f32;
                }
            }

            if !was_on_ground || self.on_ground || self.velocity.y > 0.0 {
                break;
            }
            center.y -= ground_adjust / (GROUND_PASSES - 1) as f32;
        }

        if !self.on_ground {
            self.ground_normal = Vec3::Y;
        }
        if config.debug_log {
            log::debug!(
                "[角色] 接地 {} 接触 {} 个 位置 {:?}",
                self.on_ground,
                self.hits.len(),
                self.position
            );
        }
    }
}
