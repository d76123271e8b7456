//! 武器（法杖）挂点与拖尾
//!
//! 法杖跟随左手，只在连招中显示。每帧把法杖根部与尖端的世界位置压入环形历史，
//! 渲染时用 Catmull-Rom 插值成三角形带。

use glam::{Mat4, Vec3, Vec4};

/// 历史长度
pub const TRAIL_LENGTH: usize = 128;
/// 拖尾颜色（alpha 为起始值，沿拖尾递减）
pub const TRAIL_COLOR: Vec4 = Vec4::new(0.6, 1.0, 1.0, 0.7);

/// 法杖相对左手的偏移
const STAFF_OFFSET: Vec3 = Vec3::new(-0.057, 0.026, 0.026);
/// 法杖绕 X 的旋转（度）
const STAFF_PITCH_DEGREES: f32 = -76.0;
/// 显示时的缩放
const STAFF_VISIBLE_SCALE: f32 = 0.9;
/// 拖尾根部、尖端在法杖空间中的 Z
const TRAIL_ROOT_OFFSET: f32 = 0.6;
const TRAIL_TIP_OFFSET: f32 = 0.9;

/// 拖尾顶点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailVertex {
    pub position: Vec3,
    pub color: Vec4,
}

/// 法杖与拖尾
#[derive(Debug, Clone)]
pub struct StaffTrail {
    /// 法杖世界矩阵
    pub world_transform: Mat4,
    roots: [Vec3; TRAIL_LENGTH],
    tips: [Vec3; TRAIL_LENGTH],
}

impl Default for StaffTrail {
    fn default() -> Self {
        Self {
            world_transform: Mat4::ZERO,
            roots: [Vec3::ZERO; TRAIL_LENGTH],
            tips: [Vec3::ZERO; TRAIL_LENGTH],
        }
    }
}

impl StaffTrail {
    /// 由左手世界矩阵求法杖世界矩阵，隐藏时缩放为 0
    pub fn update_transform(&mut self, hand_world: &Mat4, visible: bool) {
        let scale = if visible { STAFF_VISIBLE_SCALE } else { 0.0 };
        self.world_transform = *hand_world
            * Mat4::from_translation(STAFF_OFFSET)
            * Mat4::from_rotation_x(STAFF_PITCH_DEGREES.to_radians())
            * Mat4::from_scale(Vec3::splat(scale));
    }

    /// 历史后移一格，并记录当前根部与尖端
    pub fn record(&mut self) {
        self.roots.copy_within(0..TRAIL_LENGTH - 1, 1);
        self.tips.copy_within(0..TRAIL_LENGTH - 1, 1);
        self.roots[0] = self.world_transform.transform_point3(Vec3::new(0.0, 0.0, TRAIL_ROOT_OFFSET));
        self.tips[0] = self.world_transform.transform_point3(Vec3::new(0.0, 0.0, TRAIL_TIP_OFFSET));
    }

    #[inline]
    pub fn roots(&self) -> &[Vec3] {
        &self.roots
    }

    #[inline]
    pub fn tips(&self) -> &[Vec3] {
        &self.tips
    }

    /// 生成三角形带顶点（根部、尖端交替）
    ///
    /// 每段历史细分为 `division` 份，共取 `polygon_count` 段；
    /// 段数不超过历史所能提供的四点窗口数。
    pub fn strip(&self, division: usize, polygon_count: usize) -> Vec<TrailVertex> {
        let polygon_count = polygon_count.min(TRAIL_LENGTH - 3);
        if division < 2 || polygon_count == 0 {
            return Vec::new();
        }

        let mut color = TRAIL_COLOR;
        let subtract = color.w / (polygon_count * (division - 1)) as f32;
        let mut vertices = Vec::with_capacity(polygon_count * (division - 1) * 2);
        for i in 0..polygon_count {
            let r = &self.roots[i..i + 4];
            let t = &self.tips[i..i + 4];
            for j in 1..division {
                let s = j as f32 / division as f32;
                vertices.push(TrailVertex {
                    position: catmull_rom(r[0], r[1], r[2], r[3], s),
                    color,
                });
                vertices.push(TrailVertex {
                    position: catmull_rom(t[0], t[1], t[2], t[3], s),
                    color,
                });
                color.w -= subtract;
            }
        }
        vertices
    }

    /// 按帧时间决定细分与段数后生成三角形带
    pub fn strip_for_frame(&self, elapsed_frame: f32) -> Vec<TrailVertex> {
        if elapsed_frame <= 0.0 {
            return Vec::new();
        }
        let division = (10.0 / elapsed_frame) as usize;
        let polygon_count = ((8.0 / elapsed_frame) as i64 - 3).max(0) as usize;
        self.strip(division, polygon_count)
    }
}

/// Catmull-Rom 样条，在 p1 与 p2 之间插值
pub fn catmull_rom(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((2.0 * p1)
        + (p2 - p0) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3)
}
