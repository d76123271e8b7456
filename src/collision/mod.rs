//! 碰撞检测
//!
//! 纯函数，无状态：
//! - 球与三角形、射线与三角形
//! - 球与模型（逐次松弛，接触后推进查询中心）
//! - 线段与模型（取世界空间最近交点）

mod model;
mod triangle;

pub use model::{clamp_camera_eye, ray_intersect_model, sphere_intersect_model};
pub use triangle::{ray_intersect_triangle, sphere_intersect_triangle};

use glam::Vec3;

/// 接触结果（世界空间）
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitResult {
    /// 接触位置
    pub position: Vec3,
    /// 表面法线
    pub normal: Vec3,
}

impl Default for HitResult {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            normal: Vec3::Y,
        }
    }
}
