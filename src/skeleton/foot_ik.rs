//! 足部 IK - 让双脚贴合地面
//!
//! 流程：
//! 1. 从角色中心向下射线，确认脚下有地面
//! 2. 每只脚从踝关节上方向下射线，求出踝关节目标位置
//! 3. 按最大下沉量降低腰部（平滑）
//! 4. 两骨 IK 把踝关节移到目标位置，再按地面法线重建脚的朝向

use glam::{Mat3, Mat4, Quat, Vec3};

use super::{solve_two_bone_ik, Skeleton};
use crate::collision::{ray_intersect_model, HitResult};
use crate::model::Model;
use crate::Result;

/// 腰部最大下沉量（同时是地面射线的向下长度）
const MAX_HIPS_OFFSET: f32 = 0.25;
/// 脚部射线起点高于踝关节的距离
const FOOT_RAY_HEIGHT: f32 = 0.1;
/// 脚部射线长度
const FOOT_RAY_LENGTH: f32 = 100.0;
/// 踝关节离地高度
const FOOT_HEIGHT: f32 = 0.04;
/// 腰部偏移平滑系数
const HIPS_SMOOTHING: f32 = 0.1;
/// 极向量（小腿本地空间）
const POLE_OFFSET: Vec3 = Vec3::new(0.0, 0.1, 0.0);
/// 脚部朝向修正角（度）
const FOOT_OFFSET_DEGREES: f32 = 60.0;

/// 单只脚的 IK 数据
#[derive(Clone, Debug)]
pub struct FootIkBone {
    pub thigh: usize,
    pub leg: usize,
    pub foot: usize,
    pub toe: usize,
    pub ray_start: Vec3,
    pub ray_end: Vec3,
    pub ankle_position: Vec3,
    pub ankle_target: Vec3,
    pub hit_result: HitResult,
    pub hit: bool,
}

impl FootIkBone {
    pub fn new(skeleton: &Skeleton, thigh: &str, leg: &str, foot: &str, toe: &str) -> Result<Self> {
        Ok(Self {
            thigh: skeleton.require(thigh)?,
            leg: skeleton.require(leg)?,
            foot: skeleton.require(foot)?,
            toe: skeleton.require(toe)?,
            ray_start: Vec3::ZERO,
            ray_end: Vec3::ZERO,
            ankle_position: Vec3::ZERO,
            ankle_target: Vec3::ZERO,
            hit_result: HitResult::default(),
            hit: false,
        })
    }

    /// 从踝关节上方向下射线检测地面
    pub fn raycast(&mut self, skeleton: &Skeleton, stage: &Model) {
        self.ankle_position = skeleton.node(self.foot).world_position();
        self.ray_start = self.ankle_position + Vec3::new(0.0, FOOT_RAY_HEIGHT, 0.0);
        self.ray_end = self.ray_start - Vec3::new(0.0, FOOT_RAY_LENGTH, 0.0);

        match ray_intersect_model(self.ray_start, self.ray_end, stage) {
            Some(hit) => {
                self.hit_result = hit;
                self.hit = true;
            }
            None => self.hit = false,
        }
    }

    /// 由射线命中点与法线求踝关节目标位置（斜面上按法线方向保持脚高）
    pub fn compute_ankle_target(&mut self, foot_height: f32) {
        if !self.hit {
            return;
        }
        let hit_position = self.hit_result.position;
        let normal = self.hit_result.normal;

        let vec = self.ray_start - hit_position;
        let ab_length = vec.dot(normal);
        if ab_length == 0.0 {
            return;
        }

        let ib_length = vec.length();
        self.ankle_target = if ib_length <= 0.0 {
            hit_position + normal * foot_height
        } else {
            let ih_length = ib_length * foot_height / ab_length;
            hit_position + vec * (ih_length / ib_length) + normal * foot_height
        };
    }

    /// 踝关节需要向下移动的量（负值表示向上）
    #[inline]
    fn downward_offset(&self) -> f32 {
        (self.ankle_target - self.ankle_position).dot(Vec3::NEG_Y)
    }

    /// 两骨 IK + 脚部贴地旋转
    fn solve(&self, skeleton: &mut Skeleton) {
        let leg_world = skeleton.node(self.leg).world_transform;
        let pole = leg_world.transform_point3(POLE_OFFSET);

        solve_two_bone_ik(skeleton, self.thigh, self.leg, self.foot, self.ankle_target, pole);

        let leg_world = skeleton.node(self.leg).world_transform;
        let foot_world = skeleton.node(self.foot).world_transform;
        let toe_position = skeleton.node(self.toe).world_position();
        let foot_position = foot_world.w_axis.truncate();

        // 以地面法线为 Y 轴、脚跟方向为 X 轴重建脚的世界矩阵
        let y_axis = self.hit_result.normal;
        let x_axis = (foot_position - toe_position).normalize_or_zero();
        let z_axis = x_axis.cross(y_axis).normalize_or_zero();
        let x_axis = y_axis.cross(z_axis).normalize_or_zero();
        if z_axis == Vec3::ZERO || x_axis == Vec3::ZERO {
            return;
        }
        let foot_world = Mat4::from_cols(
            x_axis.extend(0.0),
            y_axis.extend(0.0),
            z_axis.extend(0.0),
            foot_world.w_axis,
        ) * Mat4::from_rotation_z(FOOT_OFFSET_DEGREES.to_radians());

        // 转换到小腿空间
        let local = leg_world.inverse() * foot_world;
        let basis = Mat3::from_cols(
            local.x_axis.truncate().normalize_or_zero(),
            local.y_axis.truncate().normalize_or_zero(),
            local.z_axis.truncate().normalize_or_zero(),
        );
        skeleton.node_mut(self.foot).rotation = Quat::from_mat3(&basis).normalize();
        skeleton.compute_world_transform(self.foot);
    }
}

/// 双脚 IK 与腰部高度调整
#[derive(Clone, Debug)]
pub struct FootIk {
    pub hips: usize,
    pub left: FootIkBone,
    pub right: FootIkBone,
    /// 平滑后的腰部偏移（世界空间）
    pub hips_offset: Vec3,
}

impl FootIk {
    pub fn new(hips: usize, left: FootIkBone, right: FootIkBone) -> Self {
        Self {
            hips,
            left,
            right,
            hips_offset: Vec3::ZERO,
        }
    }

    /// 执行足部 IK，返回是否实际处理
    ///
    /// `position` 为角色脚底位置，`radius` 为角色碰撞半径。
    pub fn apply(&mut self, skeleton: &mut Skeleton, stage: &Model, position: Vec3, radius: f32) -> bool {
        let ray_start = position + Vec3::new(0.0, radius, 0.0);
        let ray_end = position - Vec3::new(0.0, MAX_HIPS_OFFSET, 0.0);
        if ray_intersect_model(ray_start, ray_end, stage).is_none() {
            return false;
        }

        self.left.raycast(skeleton, stage);
        self.right.raycast(skeleton, stage);
        self.left.compute_ankle_target(FOOT_HEIGHT);
        self.right.compute_ankle_target(FOOT_HEIGHT);

        // 取下沉量最大的一只脚决定腰部偏移
        let mut offset = Vec3::ZERO;
        let mut max_dot = f32::MIN;
        for bone in [&self.left, &self.right] {
            if !bone.hit {
                continue;
            }
            let dot = bone.downward_offset();
            if dot > max_dot {
                max_dot = dot;
                offset = Vec3::NEG_Y * dot;
            }
        }
        self.hips_offset = self.hips_offset.lerp(offset, HIPS_SMOOTHING);

        // 调整腰部位置
        let hips_world_position = skeleton.node(self.hips).world_position() + self.hips_offset;
        let inverse_parent = skeleton.parent_world_transform(self.hips).inverse();
        skeleton.node_mut(self.hips).position = inverse_parent.transform_point3(hips_world_position);
        skeleton.compute_world_transform(self.hips);

        if self.left.hit {
            self.left.solve(skeleton);
        }
        if self.right.hit {
            self.right.solve(skeleton);
        }
        true
    }

    /// 未执行 IK 时腰部偏移回归零
    #[inline]
    pub fn relax(&mut self) {
        self.hips_offset = self.hips_offset.lerp(Vec3::ZERO, HIPS_SMOOTHING);
    }

    /// 每帧入口
    pub fn update(&mut self, skeleton: &mut Skeleton, stage: &Model, position: Vec3, radius: f32, enabled: bool) -> bool {
        let processed = enabled && self.apply(skeleton, stage, position, radius);
        if !processed {
            self.relax();
        }
        processed
    }
}
