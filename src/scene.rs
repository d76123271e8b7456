//! 角色控制场景
//!
//! 宿主每帧：
//! 1. 写入 `input`（摇杆、按键、摄像机基向量）
//! 2. `update(dt)`
//! 3. `render(dt)` 取调试图元与拖尾
//! 4. `draw_debug_ui(ui)`

use glam::{Mat4, Vec3};

pub use crate::debug_draw::{DebugDraw, DebugPrimitive, DebugUi};

use crate::character::{Character, CharacterDebug, CharacterEnv, InputState};
use crate::collision;
use crate::convert_to_game_frame;
use crate::model::{Mesh, Model};
use crate::physics::{get_config, SandboxConfig};
use crate::skeleton::NodePose;
use crate::Result;

/// 出生位置
pub const SPAWN_POSITION: Vec3 = Vec3::new(15.0, 0.5, 15.0);

/// 注视目标（场景中的球）
pub const LOOK_TARGETS: [Vec3; 3] = [
    Vec3::new(12.0, 2.0, 18.0),
    Vec3::new(8.0, 4.0, 18.0),
    Vec3::new(10.0, 5.0, 14.0),
];

/// 角色控制场景
pub struct CharacterControlScene {
    /// 场景自己的参数副本，调试面板直接修改
    pub config: SandboxConfig,
    stage: Model,
    look_targets: Vec<Vec3>,
    pub character: Character,
    pub debug: CharacterDebug,
    /// 本帧输入，由宿主在 `update` 前写入
    pub input: InputState,
}

impl CharacterControlScene {
    /// 以全局配置建立场景
    pub fn new(stage: Model, model: Model) -> Result<Self> {
        Self::with_config(stage, model, get_config())
    }

    pub fn with_config(stage: Model, model: Model, config: SandboxConfig) -> Result<Self> {
        let character = Character::new(model, SPAWN_POSITION)?;
        let debug = CharacterDebug::for_character(&character);

        log::info!(
            "[场景] 建立完成: 舞台网格 {} 个 (三角形 {} 个), 注视目标 {} 个",
            stage.meshes().len(),
            stage.meshes().iter().map(Mesh::triangle_count).sum::<usize>(),
            LOOK_TARGETS.len()
        );

        Ok(Self {
            config,
            stage,
            look_targets: LOOK_TARGETS.to_vec(),
            character,
            debug,
            input: InputState::default(),
        })
    }

    #[inline]
    pub fn stage(&self) -> &Model {
        &self.stage
    }

    #[inline]
    pub fn look_targets(&self) -> &[Vec3] {
        &self.look_targets
    }

    pub fn set_look_targets(&mut self, targets: Vec<Vec3>) {
        self.look_targets = targets;
    }

    /// 每帧更新（经过时间乘以时间缩放）
    pub fn update(&mut self, elapsed_time: f32) {
        let elapsed_time = elapsed_time * self.config.time_scale;
        let env = CharacterEnv {
            stage: &self.stage,
            look_targets: &self.look_targets,
            config: &self.config,
        };
        self.character.update(elapsed_time, &self.input, &env);
    }

    /// 调试图元与拖尾
    pub fn render(&self, elapsed_time: f32) -> DebugDraw {
        let elapsed_frame = convert_to_game_frame(elapsed_time * self.config.time_scale);
        let mut draw = DebugDraw::new();
        self.character
            .render_debug(&self.debug, &self.config, elapsed_frame, &mut draw);
        draw
    }

    /// 调试面板
    pub fn draw_debug_ui(&mut self, ui: &mut dyn DebugUi) {
        if ui.header("Global") {
            ui.drag_float("TimeScale", &mut self.config.time_scale, 0.01, 0.0, 3.0);
            ui.drag_float("Gravity", &mut self.config.gravity, 0.01, 0.0, 1.0);
            ui.drag_float3("FieldForce", &mut self.config.field_force, 0.01);
            ui.checkbox("DebugLog", &mut self.config.debug_log);
        }
        self.character
            .draw_debug_ui(ui, &mut self.debug, &mut self.config);
    }

    /// 摄像机视线被舞台遮挡时把视点拉到遮挡处
    #[inline]
    pub fn clamp_camera_eye(&self, focus: Vec3, eye: Vec3) -> Vec3 {
        collision::clamp_camera_eye(focus, eye, &self.stage)
    }
}

// ============================================================================
// 灰盒舞台
// ============================================================================

/// 按 a, b, c, d 顺序添加四边形，法线方向为 (b - a) × (c - b)
fn push_quad(vertices: &mut Vec<Vec3>, indices: &mut Vec<u32>, corners: [Vec3; 4]) {
    let base = vertices.len() as u32;
    vertices.extend_from_slice(&corners);
    indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}

/// 地面、缓坡与平台、墙、陡坡组成的测试舞台
pub fn greybox_stage() -> Result<Model> {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    // 地面
    push_quad(
        &mut vertices,
        &mut indices,
        [
            Vec3::new(-10.0, 0.0, -10.0),
            Vec3::new(-10.0, 0.0, 40.0),
            Vec3::new(40.0, 0.0, 40.0),
            Vec3::new(40.0, 0.0, -10.0),
        ],
    );
    // 缓坡（沿 +X 升高 2m，约 18 度）
    push_quad(
        &mut vertices,
        &mut indices,
        [
            Vec3::new(20.0, 0.0, 10.0),
            Vec3::new(20.0, 0.0, 16.0),
            Vec3::new(26.0, 2.0, 16.0),
            Vec3::new(26.0, 2.0, 10.0),
        ],
    );
    // 平台
    push_quad(
        &mut vertices,
        &mut indices,
        [
            Vec3::new(26.0, 2.0, 10.0),
            Vec3::new(26.0, 2.0, 16.0),
            Vec3::new(32.0, 2.0, 16.0),
            Vec3::new(32.0, 2.0, 10.0),
        ],
    );
    // 墙（朝 -Z）
    push_quad(
        &mut vertices,
        &mut indices,
        [
            Vec3::new(5.0, 0.0, 25.0),
            Vec3::new(5.0, 3.0, 25.0),
            Vec3::new(25.0, 3.0, 25.0),
            Vec3::new(25.0, 0.0, 25.0),
        ],
    );
    // 陡坡（沿 +Z 升高 3m，约 56 度）
    push_quad(
        &mut vertices,
        &mut indices,
        [
            Vec3::new(6.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 3.0, 2.0),
            Vec3::new(6.0, 3.0, 2.0),
        ],
    );

    let mut stage = Model::new();
    let node = stage.skeleton.add_node("Stage", None, NodePose::default())?;
    stage.add_mesh(Mesh::new(node, vertices, indices)?)?;
    stage.update_transform(Mat4::IDENTITY);
    Ok(stage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::mannequin::build_mannequin;
    use crate::character::InputKeys;
    use crate::collision::ray_intersect_model;
    use crate::debug_draw::COLOR_CYAN;
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn scene(config: SandboxConfig) -> CharacterControlScene {
        CharacterControlScene::with_config(greybox_stage().unwrap(), build_mannequin().unwrap(), config).unwrap()
    }

    /// 打开全部标题，记录控件并按标签改值
    #[derive(Default)]
    struct RecordingUi {
        labels: Vec<String>,
        texts: Vec<String>,
        gravity: Option<f32>,
    }

    impl DebugUi for RecordingUi {
        fn header(&mut self, label: &str) -> bool {
            self.labels.push(label.to_string());
            true
        }

        fn drag_float(&mut self, label: &str, value: &mut f32, _speed: f32, _min: f32, _max: f32) -> bool {
            self.labels.push(label.to_string());
            match (label, self.gravity) {
                ("Gravity", Some(gravity)) => {
                    *value = gravity;
                    true
                }
                _ => false,
            }
        }

        fn drag_float3(&mut self, label: &str, _value: &mut Vec3, _speed: f32) -> bool {
            self.labels.push(label.to_string());
            false
        }

        fn checkbox(&mut self, label: &str, _value: &mut bool) -> bool {
            self.labels.push(label.to_string());
            false
        }

        fn text(&mut self, text: &str) {
            self.texts.push(text.to_string());
        }
    }

    #[test]
    fn test_greybox_stage_surfaces() {
        let stage = greybox_stage().unwrap();
        assert_eq!(stage.meshes()[0].triangle_count(), 10);

        let floor = ray_intersect_model(Vec3::new(14.0, 5.0, 16.0), Vec3::new(14.0, -5.0, 16.0), &stage).unwrap();
        assert!(floor.normal.abs_diff_eq(Vec3::Y, 1e-5));

        let wall = ray_intersect_model(Vec3::new(15.0, 1.0, 20.0), Vec3::new(15.0, 1.0, 30.0), &stage).unwrap();
        assert!(wall.normal.abs_diff_eq(Vec3::NEG_Z, 1e-5));

        let steep = ray_intersect_model(Vec3::new(2.0, 5.0, 1.0), Vec3::new(2.0, -5.0, 1.0), &stage).unwrap();
        assert!(steep.normal.y > 0.0 && steep.normal.z < 0.0);
        assert!(steep.normal.dot(Vec3::Y).acos().to_degrees() > 45.0);
    }

    #[test]
    fn test_character_settles_at_spawn() {
        let mut scene = scene(SandboxConfig::default());
        for _ in 0..60 {
            scene.input.update(Vec2::ZERO, InputKeys::empty());
            scene.update(DT);
        }
        let character = &scene.character;
        assert!(character.on_ground);
        assert!(character.position.y.abs() < 1e-3);
        assert!((character.position.x - SPAWN_POSITION.x).abs() < 1e-3);
    }

    #[test]
    fn test_update_applies_time_scale() {
        let mut slow = scene(SandboxConfig {
            time_scale: 0.5,
            ..SandboxConfig::default()
        });
        let mut normal = scene(SandboxConfig::default());
        for _ in 0..10 {
            slow.update(2.0 * DT);
            normal.update(DT);
        }
        assert!(slow
            .character
            .position
            .abs_diff_eq(normal.character.position, 1e-5));
    }

    #[test]
    fn test_render_character_collision() {
        let mut scene = scene(SandboxConfig::default());
        scene.update(DT);
        assert_eq!(scene.render(DT).spheres(COLOR_CYAN).count(), 0);

        scene.debug.visible_collision = true;
        let draw = scene.render(DT);
        assert_eq!(draw.spheres(COLOR_CYAN).count(), 1);
        assert!(!draw.trail.is_empty());
    }

    #[test]
    fn test_debug_ui_edits_scene_config() {
        let mut scene = scene(SandboxConfig::default());
        let mut ui = RecordingUi {
            gravity: Some(0.5),
            ..RecordingUi::default()
        };
        scene.draw_debug_ui(&mut ui);

        assert_eq!(scene.config.gravity, 0.5);
        for label in ["Global", "TimeScale", "Movement", "SlopeLimit", "PhysicsBones", "LeftHairTail", "CollisionBones"] {
            assert!(ui.labels.iter().any(|l| l == label), "{}", label);
        }
        assert!(ui.texts.iter().any(|t| t == "State: Idle"));
    }

    #[test]
    fn test_camera_eye_clamped_by_wall() {
        let scene = scene(SandboxConfig::default());
        let eye = scene.clamp_camera_eye(Vec3::new(15.0, 1.0, 20.0), Vec3::new(15.0, 1.0, 30.0));
        assert!((eye.z - 25.0).abs() < 1e-4);

        let open = Vec3::new(15.0, 1.0, 10.0);
        assert_eq!(scene.clamp_camera_eye(Vec3::new(15.0, 1.0, 20.0), open), open);
    }
}
