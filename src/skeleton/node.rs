//! 骨架节点
//!
//! 每个节点保存本地 TRS 与三级矩阵：
//! - local_transform: 相对父节点
//! - global_transform: 模型空间（不含模型摆放）
//! - world_transform: 世界空间 = 模型世界矩阵 * global_transform

use glam::{Mat4, Quat, Vec3};

use super::NodePose;

/// 骨架节点
#[derive(Clone, Debug)]
pub struct SkeletonNode {
    // ========================================
    // 静态数据（初始化后不变）
    // ========================================

    /// 节点名称
    pub name: String,

    /// 父节点索引（None 表示根节点）
    pub parent: Option<usize>,

    /// 子节点索引列表
    pub children: Vec<usize>,

    /// 初始（绑定）姿势，动画没有对应通道时使用
    pub rest_pose: NodePose,

    // ========================================
    // 动态数据（每帧更新）
    // ========================================

    /// 本地平移
    pub position: Vec3,

    /// 本地旋转
    pub rotation: Quat,

    /// 本地缩放
    pub scale: Vec3,

    /// 本地变换矩阵 (local_to_parent)
    pub local_transform: Mat4,

    /// 模型空间变换矩阵
    pub global_transform: Mat4,

    /// 世界变换矩阵
    pub world_transform: Mat4,
}

impl SkeletonNode {
    /// 创建新节点
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            rest_pose: NodePose::default(),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            local_transform: Mat4::IDENTITY,
            global_transform: Mat4::IDENTITY,
            world_transform: Mat4::IDENTITY,
        }
    }

    // ========================================
    // 访问器
    // ========================================

    /// 是否为根节点
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// 世界位置
    #[inline]
    pub fn world_position(&self) -> Vec3 {
        self.world_transform.w_axis.truncate()
    }

    /// 当前本地姿势
    #[inline]
    pub fn pose(&self) -> NodePose {
        NodePose {
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
        }
    }

    /// 写入本地姿势（不重新计算矩阵）
    #[inline]
    pub fn set_pose(&mut self, pose: &NodePose) {
        self.position = pose.position;
        self.rotation = pose.rotation;
        self.scale = pose.scale;
    }

    // ========================================
    // 变换计算
    // ========================================

    /// 计算本地变换 (T * R * S)
    #[inline]
    pub fn compute_local_transform(&mut self) {
        self.local_transform =
            Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position);
    }

    /// 仅由旋转和平移构成的本地矩阵（程序化骨骼修正使用）
    #[inline]
    pub fn rotation_translation(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }
}

impl Default for SkeletonNode {
    fn default() -> Self {
        Self::new(String::new())
    }
}
