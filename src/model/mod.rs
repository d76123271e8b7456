//! 模型服务
//!
//! 持有节点层级、网格与动画剪辑，提供：
//! - 按名称/索引查找节点与动画
//! - 动画采样（全部节点或单个节点，时间超界时夹到剪辑边界）
//! - 姿势读写与世界矩阵更新

mod mesh;

pub use mesh::Mesh;

use glam::Mat4;

use crate::animation::AnimationClip;
use crate::skeleton::{NodePose, Skeleton};
use crate::{AvatarError, Result};

/// 模型
#[derive(Clone, Debug, Default)]
pub struct Model {
    /// 节点层级
    pub skeleton: Skeleton,
    meshes: Vec<Mesh>,
    animations: Vec<AnimationClip>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================
    // 节点
    // ========================================

    /// 按名称查找节点索引
    #[inline]
    pub fn node_index(&self, name: &str) -> Option<usize> {
        self.skeleton.find(name)
    }

    /// 按名称查找节点索引，找不到时返回错误
    #[inline]
    pub fn require_node(&self, name: &str) -> Result<usize> {
        self.skeleton.require(name)
    }

    // ========================================
    // 网格
    // ========================================

    /// 添加网格，返回其索引
    pub fn add_mesh(&mut self, mesh: Mesh) -> Result<usize> {
        if mesh.node >= self.skeleton.len() {
            return Err(AvatarError::InvalidMesh(format!(
                "网格绑定的节点 #{} 不存在",
                mesh.node
            )));
        }
        self.meshes.push(mesh);
        Ok(self.meshes.len() - 1)
    }

    #[inline]
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// 网格所属节点的世界矩阵
    #[inline]
    pub fn mesh_world_transform(&self, mesh: &Mesh) -> Mat4 {
        self.skeleton.node(mesh.node).world_transform
    }

    // ========================================
    // 动画
    // ========================================

    /// 添加动画剪辑，返回其索引
    pub fn add_animation(&mut self, clip: AnimationClip) -> usize {
        self.animations.push(clip);
        self.animations.len() - 1
    }

    #[inline]
    pub fn animations(&self) -> &[AnimationClip] {
        &self.animations
    }

    #[inline]
    pub fn animation(&self, index: usize) -> &AnimationClip {
        &self.animations[index]
    }

    /// 按名称查找动画索引
    pub fn animation_index(&self, name: &str) -> Option<usize> {
        self.animations.iter().position(|a| a.name == name)
    }

    /// 按名称查找动画索引，找不到时返回错误
    pub fn require_animation(&self, name: &str) -> Result<usize> {
        self.animation_index(name)
            .ok_or_else(|| AvatarError::AnimationNotFound(name.to_string()))
    }

    /// 采样全部节点的本地姿势
    ///
    /// 缓冲长度与节点数不一致时先以绑定姿势重建；
    /// 没有动画通道的节点保留缓冲中的原值。
    pub fn compute_animation(&self, animation: usize, seconds: f32, poses: &mut Vec<NodePose>) {
        if poses.len() != self.skeleton.len() {
            poses.clear();
            poses.extend(self.skeleton.nodes().iter().map(|n| n.rest_pose));
        }
        self.animations[animation].sample(seconds, poses);
    }

    /// 采样单个节点的本地姿势（无通道的分量取绑定姿势）
    pub fn compute_node_animation(&self, animation: usize, node: usize, seconds: f32) -> NodePose {
        let base = self.skeleton.node(node).rest_pose;
        self.animations[animation].sample_node(node, base, seconds)
    }

    // ========================================
    // 姿势与变换
    // ========================================

    /// 读取当前所有节点的本地姿势
    #[inline]
    pub fn get_node_poses(&self, poses: &mut Vec<NodePose>) {
        self.skeleton.get_poses(poses);
    }

    /// 写入所有节点的本地姿势（不重新计算矩阵）
    #[inline]
    pub fn set_node_poses(&mut self, poses: &[NodePose]) {
        self.skeleton.set_poses(poses);
    }

    /// 以模型世界矩阵重新计算全部节点
    #[inline]
    pub fn update_transform(&mut self, world_transform: Mat4) {
        self.skeleton.update_transform(world_transform);
    }
}
