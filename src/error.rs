//! 错误类型
//!
//! 只有初始化阶段（按名称查找节点/动画、构建网格）会返回错误，
//! 每帧更新路径不产生错误。

use thiserror::Error;

/// 引擎错误
#[derive(Debug, Error)]
pub enum AvatarError {
    /// 按名称查找节点失败（骨架数据不完整）
    #[error("节点未找到: {0}")]
    NodeNotFound(String),

    /// 按名称查找动画失败
    #[error("动画未找到: {0}")]
    AnimationNotFound(String),

    /// 网格数据非法（索引越界或不是三角形列表）
    #[error("网格数据无效: {0}")]
    InvalidMesh(String),

    /// 姿势缓冲区长度与节点数量不一致
    #[error("姿势缓冲区长度不匹配: 期望 {expected}, 实际 {actual}")]
    InvalidPoseBuffer { expected: usize, actual: usize },
}

/// 引擎统一 Result 类型
pub type Result<T> = std::result::Result<T, AvatarError>;
