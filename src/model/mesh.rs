//! 网格 - 绑定到节点的三角形列表

use glam::Vec3;

use crate::{AvatarError, Result};

/// 静态三角形网格
///
/// 顶点位于所属节点的本地空间，世界矩阵取节点的 world_transform。
#[derive(Clone, Debug)]
pub struct Mesh {
    /// 所属节点索引
    pub node: usize,
    /// 顶点位置
    vertices: Vec<Vec3>,
    /// 三角形索引（每 3 个一组）
    indices: Vec<u32>,
}

impl Mesh {
    /// 创建网格，校验索引缓冲
    pub fn new(node: usize, vertices: Vec<Vec3>, indices: Vec<u32>) -> Result<Self> {
        if indices.len() % 3 != 0 {
            return Err(AvatarError::InvalidMesh(format!(
                "索引数量 {} 不是 3 的倍数",
                indices.len()
            )));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(AvatarError::InvalidMesh(format!(
                "索引 {} 超出顶点数量 {}",
                bad,
                vertices.len()
            )));
        }
        Ok(Self { node, vertices, indices })
    }

    #[inline]
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// 三角形数量
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// 遍历所有三角形的本地顶点
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(move |tri| {
            [
                self.vertices[tri[0] as usize],
                self.vertices[tri[1] as usize],
                self.vertices[tri[2] as usize],
            ]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_validates_indices() {
        let vertices = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        assert!(Mesh::new(0, vertices.clone(), vec![0, 1, 2]).is_ok());
        assert!(matches!(
            Mesh::new(0, vertices.clone(), vec![0, 1]),
            Err(AvatarError::InvalidMesh(_))
        ));
        assert!(matches!(
            Mesh::new(0, vertices, vec![0, 1, 3]),
            Err(AvatarError::InvalidMesh(_))
        ));
    }

    #[test]
    fn test_triangles_iterates_in_order() {
        let vertices = vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z];
        let mesh = Mesh::new(0, vertices, vec![0, 1, 2, 2, 1, 3]).unwrap();
        let triangles: Vec<_> = mesh.triangles().collect();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(triangles[1], [Vec3::Y, Vec3::X, Vec3::Z]);
    }
}
