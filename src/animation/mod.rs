//! 动画系统
//!
//! - track: 关键帧通道与节点轨道
//! - clip: 动画剪辑（多个节点轨道 + 长度）
//! - player: 播放游标、循环、交叉淡入
//! - root_motion: 根运动提取与轴烘焙

mod clip;
mod player;
mod root_motion;
mod track;

pub use clip::AnimationClip;
pub use player::AnimationPlayer;
pub use root_motion::{compute_root_motion, pin_axes, BakeAxes, RootMotion};
pub use track::{Channel, Interpolate, Keyframe, MotionTrack, NodeTrack};
