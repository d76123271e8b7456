//! 角色控制
//!
//! 每帧顺序：
//! 1. 动画（采样、根运动、混合）
//! 2. 状态机
//! 3. 速度、位置与接地
//! 4. 世界矩阵、武器挂点与拖尾
//! 5. 注视、足部 IK
//! 6. 摇摆骨骼

mod debug;
mod input;
pub mod mannequin;
mod movement;
pub mod rig;
mod state;
mod trail;

pub use debug::CharacterDebug;
pub use input::{InputKeys, InputState};
pub use rig::ClipSet;
pub use state::{CharacterState, StateListener};
pub use trail::{catmull_rom, StaffTrail, TrailVertex, TRAIL_COLOR, TRAIL_LENGTH};

use glam::{EulerRot, Mat4, Vec3};

use crate::animation::AnimationPlayer;
use crate::collision::HitResult;
use crate::convert_to_game_frame;
use crate::model::Model;
use crate::physics::{
    compute_physics_bones, setup_collision_bones, setup_physics_bones, CollisionBone, PhysicsBone, SandboxConfig,
};
use crate::skeleton::{FootIk, FootIkBone, LookAtBone};
use crate::Result;

/// 摇摆链
#[derive(Debug, Clone)]
pub struct PhysicsChain {
    pub name: &'static str,
    pub bones: Vec<PhysicsBone>,
    /// 碰撞球组下标
    pub colliders: usize,
}

/// 碰撞球组
#[derive(Debug, Clone)]
pub struct ColliderGroup {
    pub name: &'static str,
    pub bones: Vec<CollisionBone>,
}

/// 角色每帧依赖的外部环境（只读）
#[derive(Clone, Copy)]
pub struct CharacterEnv<'a> {
    /// 舞台碰撞模型
    pub stage: &'a Model,
    /// 注视目标
    pub look_targets: &'a [Vec3],
    pub config: &'a SandboxConfig,
}

/// 角色
#[derive(Debug, Clone)]
pub struct Character {
    pub model: Model,
    pub player: AnimationPlayer,
    pub clips: ClipSet,

    state: CharacterState,
    next_state: CharacterState,

    // ========== 运动 ==========
    /// 脚底位置
    pub position: Vec3,
    /// 欧拉角（弧度）
    pub angle: Vec3,
    /// 世界矩阵
    pub transform: Mat4,
    pub velocity: Vec3,
    /// 本帧累计位移
    pub delta_move: Vec3,
    pub ground_normal: Vec3,
    /// 摄像机相对的输入方向（未归一化）
    pub desired_direction: Vec3,
    pub on_ground: bool,
    pub apply_foot_ik: bool,
    /// 已记下连招输入
    pub combo: bool,
    hits: Vec<HitResult>,

    // ========== 程序化骨骼 ==========
    pub chains: Vec<PhysicsChain>,
    pub collider_groups: Vec<ColliderGroup>,
    pub foot_ik: FootIk,
    pub look_at: LookAtBone,
    pub trail: StaffTrail,
    left_hand: usize,
}

impl Character {
    /// 以模型建立角色，节点或动画缺失时返回错误
    pub fn new(mut model: Model, position: Vec3) -> Result<Self> {
        let clips = ClipSet::resolve(&model)?;
        let hips = model.require_node(rig::HIPS_NODE)?;
        let head = model.require_node(rig::HEAD_NODE)?;
        let left_hand = model.require_node(rig::LEFT_HAND_NODE)?;

        let transform = Mat4::from_translation(position);
        model.update_transform(transform);

        let skeleton = &model.skeleton;
        let collider_groups = rig::COLLIDER_GROUPS
            .iter()
            .map(|desc| -> Result<ColliderGroup> {
                Ok(ColliderGroup {
                    name: desc.name,
                    bones: setup_collision_bones(skeleton, desc.bones)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let chains = rig::PHYSICS_CHAINS
            .iter()
            .map(|desc| -> Result<PhysicsChain> {
                Ok(PhysicsChain {
                    name: desc.name,
                    bones: setup_physics_bones(skeleton, desc.bones)?,
                    colliders: desc.colliders,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let [thigh, leg, foot, toe] = rig::LEFT_FOOT_IK_NODES;
        let left = FootIkBone::new(skeleton, thigh, leg, foot, toe)?;
        let [thigh, leg, foot, toe] = rig::RIGHT_FOOT_IK_NODES;
        let right = FootIkBone::new(skeleton, thigh, leg, foot, toe)?;
        let foot_ik = FootIk::new(hips, left, right);
        let look_at = LookAtBone::new(skeleton, head);

        let mut player = AnimationPlayer::new(&model, hips);
        player.play(clips.idle, 0.0, true, false);

        log::info!(
            "[角色] 建立完成: 节点 {} 个, 摇摆链 {} 条 (骨骼 {} 根), 碰撞球 {} 个",
            model.skeleton.len(),
            chains.len(),
            chains.iter().map(|c| c.bones.len()).sum::<usize>(),
            collider_groups.iter().map(|g| g.bones.len()).sum::<usize>()
        );

        Ok(Self {
            model,
            player,
            clips,
            state: CharacterState::Idle,
            next_state: CharacterState::Idle,
            position,
            angle: Vec3::ZERO,
            transform,
            velocity: Vec3::ZERO,
            delta_move: Vec3::ZERO,
            ground_normal: Vec3::Y,
            desired_direction: Vec3::ZERO,
            on_ground: false,
            apply_foot_ik: false,
            combo: false,
            hits: Vec::new(),
            chains,
            collider_groups,
            foot_ik,
            look_at,
            trail: StaffTrail::default(),
            left_hand,
        })
    }

    /// 最近一次接地检测的接触
    #[inline]
    pub fn hits(&self) -> &[HitResult] {
        &self.hits
    }

    /// 每帧入口
    #[inline]
    pub fn update(&mut self, elapsed_time: f32, input: &InputState, env: &CharacterEnv) {
        self.update_with_listener(elapsed_time, input, env, &mut ());
    }

    /// 每帧入口，状态切换通知给 listener
    pub fn update_with_listener(
        &mut self,
        elapsed_time: f32,
        input: &InputState,
        env: &CharacterEnv,
        listener: &mut dyn StateListener,
    ) {
        self.player.update(&mut self.model, elapsed_time);

        self.update_state_machine(elapsed_time, input, env, listener);

        self.update_velocity(elapsed_time, env.config);
        self.update_position(elapsed_time, env.stage, env.config);

        self.update_transform();
        self.trail.record();

        let elapsed_frame = convert_to_game_frame(elapsed_time);
        self.look_at
            .update(&mut self.model.skeleton, &self.transform, env.look_targets, elapsed_frame);
        self.foot_ik.update(
            &mut self.model.skeleton,
            env.stage,
            self.position,
            env.config.radius,
            self.apply_foot_ik,
        );

        self.update_physics_bones(elapsed_time, env.config);

        if env.config.debug_log {
            log::debug!(
                "[角色] {:?} 位置 {:?} 速度 {:?} 接地 {}",
                self.state,
                self.position,
                self.velocity,
                self.on_ground
            );
        }
    }

    /// 由位置与角度重建世界矩阵，更新全部节点与武器
    pub fn update_transform(&mut self) {
        let rotation = Mat4::from_euler(EulerRot::YXZ, self.angle.y, self.angle.x, self.angle.z);
        self.transform = Mat4::from_translation(self.position) * rotation;
        self.model.update_transform(self.transform);

        let hand = self.model.skeleton.node(self.left_hand).world_transform;
        self.trail.update_transform(&hand, self.state.is_combo());
    }

    /// 模拟全部摇摆链
    fn update_physics_bones(&mut self, elapsed_time: f32, config: &SandboxConfig) {
        let force = config.physics_bone_force(elapsed_time);
        for chain in &mut self.chains {
            let colliders = &self.collider_groups[chain.colliders].bones;
            compute_physics_bones(
                &mut self.model.skeleton,
                &mut chain.bones,
                colliders,
                force,
                config.max_physics_bone_velocity,
            );
        }
    }

    /// 播放动画（循环播放同一动画时保持不变）
    pub(crate) fn play(&mut self, clip: usize, blend_seconds: f32, looping: bool, root_motion: bool) {
        if !(looping && self.player.index() == Some(clip)) {
            log::debug!("[角色] 播放动画: {}", self.model.animation(clip).name);
        }
        self.player.play(clip, blend_seconds, looping, root_motion);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::Mesh;
    use crate::skeleton::NodePose;
    use glam::Vec2;

    /// 两个三角形组成的四边形舞台
    pub(crate) fn quad_stage(corners: [Vec3; 4]) -> Model {
        let mut stage = Model::new();
        let node = stage.skeleton.add_node("stage", None, NodePose::default()).unwrap();
        stage
            .add_mesh(Mesh::new(node, corners.to_vec(), vec![0, 1, 2, 0, 2, 3]).unwrap())
            .unwrap();
        stage.update_transform(Mat4::IDENTITY);
        stage
    }

    /// y = 0 的 100x100 地面
    pub(crate) fn floor() -> Model {
        quad_stage([
            Vec3::new(-50.0, 0.0, -50.0),
            Vec3::new(-50.0, 0.0, 50.0),
            Vec3::new(50.0, 0.0, 50.0),
            Vec3::new(50.0, 0.0, -50.0),
        ])
    }

    /// 站在地面上的人偶（避开地面三角形的对角线）
    pub(crate) fn character_on_floor() -> Character {
        let model = mannequin::build_mannequin().unwrap();
        Character::new(model, Vec3::new(2.0, 0.0, -3.0)).unwrap()
    }

    #[test]
    fn test_new_rejects_incomplete_model() {
        assert!(Character::new(Model::new(), Vec3::ZERO).is_err());
    }

    #[test]
    fn test_setup_builds_every_chain() {
        let character = character_on_floor();
        assert_eq!(character.chains.len(), rig::PHYSICS_CHAINS.len());
        assert_eq!(character.collider_groups.len(), rig::COLLIDER_GROUPS.len());
        assert_eq!(character.chains[0].bones.len(), 7);
        assert_eq!(character.state(), CharacterState::Idle);
        assert_eq!(character.player.index(), Some(character.clips.idle));

        // 建立时已按出生位置计算世界矩阵
        let hips = character.model.require_node(rig::HIPS_NODE).unwrap();
        let hips_position = character.model.skeleton.node(hips).world_position();
        assert!(hips_position.abs_diff_eq(Vec3::new(2.0, mannequin::HIPS_HEIGHT, -3.0), 1e-5));
    }

    #[test]
    fn test_full_frame_stays_finite_and_hair_hangs() {
        let stage = floor();
        let config = SandboxConfig::default();
        let targets = [Vec3::new(2.0, 1.6, -1.0)];
        let env = CharacterEnv { stage: &stage, look_targets: &targets, config: &config };
        let mut character = character_on_floor();
        let mut input = InputState::default();

        for frame in 0..240 {
            let keys = if frame == 100 { InputKeys::ATTACK } else { InputKeys::empty() };
            let axis = if (30..80).contains(&frame) { Vec2::new(0.0, 1.0) } else { Vec2::ZERO };
            input.update(axis, keys);
            character.update(1.0 / 60.0, &input, &env);
        }

        for node in character.model.skeleton.nodes() {
            assert!(!node.world_transform.is_nan(), "{}", node.name);
        }
        assert!(character.on_ground);

        // 发梢低于发根
        let chain = &character.chains[0];
        let root = chain.bones[0].world_position();
        let tip = chain.bones[chain.bones.len() - 1].world_position();
        assert!(tip.y < root.y);
    }

    #[test]
    fn test_staff_only_visible_during_combo() {
        let stage = floor();
        let config = SandboxConfig::default();
        let env = CharacterEnv { stage: &stage, look_targets: &[], config: &config };
        let mut character = character_on_floor();
        let mut input = InputState::default();

        input.update(Vec2::ZERO, InputKeys::empty());
        character.update(1.0 / 60.0, &input, &env);
        let hidden = character.trail.world_transform.x_axis.truncate().length();
        assert!(hidden < 1e-6);

        input.update(Vec2::ZERO, InputKeys::ATTACK);
        character.update(1.0 / 60.0, &input, &env);
        input.update(Vec2::ZERO, InputKeys::empty());
        character.update(1.0 / 60.0, &input, &env);
        assert!(character.state().is_combo());
        let shown = character.trail.world_transform.x_axis.truncate().length();
        assert!((shown - 0.9).abs() < 1e-4);
    }
}
