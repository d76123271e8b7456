//! 骨架系统
//!
//! 核心设计思想：
//! - SkeletonNode: 单个节点（名称、父子索引、本地 TRS、本地/全局/世界矩阵）
//! - Skeleton: 以索引寻址的节点数组，负责世界变换传播
//! - TwoBoneIk / LookAtBone / FootIk: 在动画姿势之上叠加的程序化修正

mod foot_ik;
mod look_at;
mod node;
mod node_set;
mod two_bone_ik;

pub use foot_ik::{FootIk, FootIkBone};
pub use look_at::LookAtBone;
pub use node::SkeletonNode;
pub use node_set::Skeleton;
pub use two_bone_ik::{solve_two_bone_ik, TwoBoneIk};

use glam::{Mat4, Quat, Vec3};

// ============================================================================
// 公共类型定义
// ============================================================================

/// 节点本地姿势
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodePose {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for NodePose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl NodePose {
    /// 仅平移的姿势
    #[inline]
    pub fn from_position(position: Vec3) -> Self {
        Self { position, ..Self::default() }
    }

    /// 平移 + 旋转的姿势
    #[inline]
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation, scale: Vec3::ONE }
    }

    /// 转换为 4x4 矩阵 (T * R * S)
    #[inline]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// 从矩阵分解
    #[inline]
    pub fn from_matrix(m: Mat4) -> Self {
        let (scale, rotation, position) = m.to_scale_rotation_translation();
        Self { position, rotation, scale }
    }

    /// 两个姿势之间混合（缩放/平移线性插值，旋转球面插值）
    #[inline]
    pub fn blend(&self, other: &NodePose, rate: f32) -> NodePose {
        NodePose {
            position: self.position.lerp(other.position, rate),
            rotation: self.rotation.slerp(other.rotation, rate),
            scale: self.scale.lerp(other.scale, rate),
        }
    }
}
