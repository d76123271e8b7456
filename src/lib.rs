//! 角色控制运行时
//!
//! 模块划分：
//! - skeleton: 节点层级、世界变换传播、两骨 IK、注视与足部 IK
//! - animation: 关键帧轨道、动画剪辑、播放器与根运动提取
//! - model: 节点 + 网格 + 动画的模型服务
//! - collision: 球/射线与三角形、模型的相交检测
//! - physics: 可调参数与摇摆骨骼（头发、裙子）求解
//! - character: 输入、状态机、移动与接地积分
//! - debug_draw: 调试图元与调试面板接口
//! - scene: 每帧入口（update / render / draw_debug_ui）

pub mod animation;
pub mod character;
pub mod collision;
pub mod debug_draw;
pub mod error;
pub mod model;
pub mod physics;
pub mod scene;
pub mod skeleton;

pub use error::{AvatarError, Result};

/// 每秒游戏帧数（调参常量以 60fps 帧为单位）
pub const GAME_FRAME_RATE: f32 = 60.0;

/// 秒转换为游戏帧
#[inline]
pub fn convert_to_game_frame(seconds: f32) -> f32 {
    seconds * GAME_FRAME_RATE
}
