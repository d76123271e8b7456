//! 调试绘制与调试面板接口
//!
//! 运行时不依赖任何渲染后端：`render` 只产出图元列表，
//! 面板通过 [`DebugUi`] 由宿主（imgui 等）实现。

use glam::{Mat4, Vec3, Vec4};

use crate::character::TrailVertex;

pub const COLOR_GREEN: Vec4 = Vec4::new(0.0, 1.0, 0.0, 1.0);
pub const COLOR_BLUE: Vec4 = Vec4::new(0.0, 0.0, 1.0, 1.0);
pub const COLOR_CYAN: Vec4 = Vec4::new(0.0, 1.0, 1.0, 1.0);

/// 调试图元
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DebugPrimitive {
    /// 坐标轴（矩阵含缩放）
    Axis { transform: Mat4 },
    /// 沿 Z 延伸 `length` 的骨骼
    Bone { transform: Mat4, length: f32 },
    /// 线框球
    Sphere { center: Vec3, radius: f32, color: Vec4 },
}

/// 一帧的调试绘制结果
#[derive(Debug, Clone, Default)]
pub struct DebugDraw {
    pub primitives: Vec<DebugPrimitive>,
    /// 拖尾三角形带
    pub trail: Vec<TrailVertex>,
}

impl DebugDraw {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn draw_axis(&mut self, transform: Mat4) {
        self.primitives.push(DebugPrimitive::Axis { transform });
    }

    #[inline]
    pub fn draw_bone(&mut self, transform: Mat4, length: f32) {
        self.primitives.push(DebugPrimitive::Bone { transform, length });
    }

    #[inline]
    pub fn draw_sphere(&mut self, center: Vec3, radius: f32, color: Vec4) {
        self.primitives.push(DebugPrimitive::Sphere { center, radius, color });
    }

    /// 指定颜色的球
    pub fn spheres(&self, color: Vec4) -> impl Iterator<Item = (Vec3, f32)> + '_ {
        self.primitives.iter().filter_map(move |p| match *p {
            DebugPrimitive::Sphere { center, radius, color: c } if c == color => Some((center, radius)),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty() && self.trail.is_empty()
    }
}

/// 调试面板
///
/// 控件返回值表示本帧是否被修改。
pub trait DebugUi {
    /// 折叠标题，返回是否展开
    fn header(&mut self, label: &str) -> bool;
    fn drag_float(&mut self, label: &str, value: &mut f32, speed: f32, min: f32, max: f32) -> bool;
    fn drag_float3(&mut self, label: &str, value: &mut Vec3, speed: f32) -> bool;
    fn checkbox(&mut self, label: &str, value: &mut bool) -> bool;
    fn text(&mut self, text: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spheres_filter_by_color() {
        let mut draw = DebugDraw::new();
        assert!(draw.is_empty());
        draw.draw_axis(Mat4::IDENTITY);
        draw.draw_sphere(Vec3::X, 0.1, COLOR_GREEN);
        draw.draw_sphere(Vec3::Y, 0.2, COLOR_BLUE);
        let blue: Vec<_> = draw.spheres(COLOR_BLUE).collect();
        assert_eq!(blue, vec![(Vec3::Y, 0.2)]);
        assert_eq!(draw.spheres(COLOR_CYAN).count(), 0);
    }
}
