//! 物理
//!
//! - config: 沙盒可调参数（全局默认值 + 场景副本）
//! - physics_bone: 摇摆骨骼链求解与碰撞骨骼

pub mod config;
mod physics_bone;

pub use config::{get_config, reset_config, set_config, SandboxConfig};
pub use physics_bone::{
    compute_collision_bones, compute_physics_bones, setup_collision_bones, setup_physics_bones, CollisionBone,
    PhysicsBone,
};
