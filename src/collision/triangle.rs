//! 三角形相交检测

use glam::Vec3;

use super::HitResult;

/// 射线与三角形平行判定阈值
const PARALLEL_EPSILON: f32 = 1e-7;

/// 球与三角形相交
///
/// 法线按 (B - A) x (C - B) 的右手定则。球心在平面负侧或距平面超过半径时不相交。
/// 投影在三角形内部时沿面法线推出 `radius - distance`；否则对三条边求最近点，
/// 沿最近点到球心的方向推出。返回推出后的球心与面法线。退化三角形不相交。
pub fn sphere_intersect_triangle(center: Vec3, radius: f32, a: Vec3, b: Vec3, c: Vec3) -> Option<HitResult> {
    let vertices = [a, b, c];
    let edges = [b - a, c - b, a - c];

    let normal = edges[0].cross(edges[1]).normalize_or_zero();
    if normal == Vec3::ZERO {
        return None;
    }

    // 球心到平面的有符号距离
    let distance = normal.dot(center) - normal.dot(a);
    if distance > radius || distance < 0.0 {
        return None;
    }

    // 边叉积与法线同向则在内侧
    let mut vecs = [Vec3::ZERO; 3];
    let mut outside = false;
    for i in 0..3 {
        vecs[i] = center - vertices[i];
        outside |= normal.dot(edges[i].cross(vecs[i])) < 0.0;
    }

    if !outside {
        return Some(HitResult {
            position: center + normal * (radius - distance),
            normal,
        });
    }

    // 边与球
    let radius_sq = radius * radius;
    for i in 0..3 {
        let mut vec = vecs[i];
        let t = vec.dot(edges[i]);
        if t > 0.0 {
            let edge_length_sq = edges[i].length_squared();
            if t >= edge_length_sq {
                vec -= edges[i];
            } else {
                vec -= edges[i] * (t / edge_length_sq);
            }
        }

        let length_sq = vec.length_squared();
        if length_sq <= radius_sq {
            let depth = radius - length_sq.sqrt();
            return Some(HitResult {
                position: center + vec.normalize_or_zero() * depth,
                normal,
            });
        }
    }
    None
}

/// 射线与三角形相交（双面，Möller–Trumbore）
///
/// `direction` 需为单位向量，返回沿射线的距离（>= 0）。
pub fn ray_intersect_triangle(origin: Vec3, direction: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    let edge1 = b - a;
    let edge2 = c - a;

    let p = direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < PARALLEL_EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;

    let s = origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    if t < 0.0 {
        return None;
    }
    Some(t)
}
