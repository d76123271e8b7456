//! 节点集合 - 以索引寻址的骨架层级
//!
//! 节点按添加顺序存储，父节点总是先于子节点添加，
//! 因此按索引顺序遍历即为自顶向下的拓扑顺序。

use glam::Mat4;

use super::{NodePose, SkeletonNode};
use crate::{AvatarError, Result};

/// 骨架
#[derive(Clone, Debug)]
pub struct Skeleton {
    /// 节点列表
    nodes: Vec<SkeletonNode>,
    /// 模型世界矩阵（根节点的父空间）
    world_transform: Mat4,
}

impl Skeleton {
    /// 创建空骨架
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            world_transform: Mat4::IDENTITY,
        }
    }

    /// 添加节点，返回其索引
    ///
    /// 父节点必须已存在，保证层级无环。
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        parent: Option<usize>,
        pose: NodePose,
    ) -> Result<usize> {
        let name = name.into();
        if let Some(p) = parent {
            if p >= self.nodes.len() {
                return Err(AvatarError::NodeNotFound(format!("{} 的父节点 #{}", name, p)));
            }
        }

        let index = self.nodes.len();
        let mut node = SkeletonNode::new(name);
        node.parent = parent;
        node.rest_pose = pose;
        node.set_pose(&pose);
        self.nodes.push(node);

        if let Some(p) = parent {
            self.nodes[p].children.push(index);
        }

        // 初始矩阵
        self.update_node_transform(index);
        Ok(index)
    }

    // ========================================
    // 访问器
    // ========================================

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn nodes(&self) -> &[SkeletonNode] {
        &self.nodes
    }

    #[inline]
    pub fn node(&self, index: usize) -> &SkeletonNode {
        &self.nodes[index]
    }

    #[inline]
    pub fn node_mut(&mut self, index: usize) -> &mut SkeletonNode {
        &mut self.nodes[index]
    }

    /// 模型世界矩阵
    #[inline]
    pub fn world_transform(&self) -> Mat4 {
        self.world_transform
    }

    /// 按名称查找节点
    pub fn find(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.name == name)
    }

    /// 按名称查找节点，找不到时返回错误
    pub fn require(&self, name: &str) -> Result<usize> {
        self.find(name)
            .ok_or_else(|| AvatarError::NodeNotFound(name.to_string()))
    }

    /// 父节点世界矩阵（根节点返回模型世界矩阵）
    #[inline]
    pub fn parent_world_transform(&self, index: usize) -> Mat4 {
        match self.nodes[index].parent {
            Some(p) => self.nodes[p].world_transform,
            None => self.world_transform,
        }
    }

    /// 父节点模型空间矩阵（根节点返回单位矩阵）
    #[inline]
    pub fn parent_global_transform(&self, index: usize) -> Mat4 {
        match self.nodes[index].parent {
            Some(p) => self.nodes[p].global_transform,
            None => Mat4::IDENTITY,
        }
    }

    // ========================================
    // 姿势读写
    // ========================================

    /// 读取所有节点的本地姿势
    pub fn get_poses(&self, poses: &mut Vec<NodePose>) {
        poses.clear();
        poses.extend(self.nodes.iter().map(|n| n.pose()));
    }

    /// 写入所有节点的本地姿势（不重新计算矩阵）
    pub fn set_poses(&mut self, poses: &[NodePose]) {
        if poses.len() != self.nodes.len() {
            log::warn!(
                "[骨架] 姿势数量不匹配: 节点 {} 个, 姿势 {} 个，按较短者写入",
                self.nodes.len(),
                poses.len()
            );
        }
        for (node, pose) in self.nodes.iter_mut().zip(poses) {
            node.set_pose(pose);
        }
    }

    // ========================================
    // 变换计算
    // ========================================

    /// 以新的模型世界矩阵重新计算全部节点
    pub fn update_transform(&mut self, world_transform: Mat4) {
        self.world_transform = world_transform;
        for i in 0..self.nodes.len() {
            self.update_node_transform(i);
        }
    }

    fn update_node_transform(&mut self, index: usize) {
        self.nodes[index].compute_local_transform();
        let parent_global = self.parent_global_transform(index);
        let node = &mut self.nodes[index];
        node.global_transform = parent_global * node.local_transform;
        node.world_transform = self.world_transform * node.global_transform;
    }

    /// 重新计算指定节点及其所有子孙的世界矩阵
    ///
    /// world = parent.world * (T * R)，修改本地旋转/平移后必须在读取
    /// 该节点或其子孙的世界矩阵之前调用。
    pub fn compute_world_transform(&mut self, index: usize) {
        let local = self.nodes[index].rotation_translation();
        let parent_world = self.parent_world_transform(index);
        let parent_global = self.parent_global_transform(index);

        let node = &mut self.nodes[index];
        node.world_transform = parent_world * local;
        node.global_transform = parent_global * local;

        for k in 0..self.nodes[index].children.len() {
            let child = self.nodes[index].children[k];
            self.compute_world_transform(child);
        }
    }
}

impl Default for Skeleton {
    fn default() -> Self {
        Self::new()
    }
}
