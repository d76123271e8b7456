//! 球/线段与模型网格的相交检测

use glam::Vec3;

use super::{ray_intersect_triangle, sphere_intersect_triangle, HitResult};
use crate::model::Model;

/// 球与模型相交，接触按发现顺序写入 `hits`
///
/// 每次接触后查询球心移动到推出位置再继续检测（逐次松弛），
/// 因此结果依赖三角形顺序，调用方对所有接触取平均。
/// 网格世界矩阵为等比缩放时在网格本地空间检测，否则逐三角形变换到世界空间。
pub fn sphere_intersect_model(center: Vec3, radius: f32, model: &Model, hits: &mut Vec<HitResult>) -> bool {
    hits.clear();
    let mut center = center;

    for mesh in model.meshes() {
        let world = model.mesh_world_transform(mesh);
        let length_sq_x = world.x_axis.truncate().length_squared();
        let length_sq_y = world.y_axis.truncate().length_squared();
        let length_sq_z = world.z_axis.truncate().length_squared();

        if length_sq_x == length_sq_y && length_sq_y == length_sq_z && length_sq_x > 0.0 {
            // 本地空间检测，本地球心在同一网格内不随接触推进
            let inverse_world = world.inverse();
            let local_center = inverse_world.transform_point3(center);
            let local_radius = radius / length_sq_x.sqrt();

            for [a, b, c] in mesh.triangles() {
                if let Some(local) = sphere_intersect_triangle(local_center, local_radius, a, b, c) {
                    let hit = HitResult {
                        position: world.transform_point3(local.position),
                        normal: world.transform_vector3(local.normal).normalize_or_zero(),
                    };
                    hits.push(hit);
                    center = hit.position;
                }
            }
        } else {
            // 世界空间检测
            for [a, b, c] in mesh.triangles() {
                let (a, b, c) = (
                    world.transform_point3(a),
                    world.transform_point3(b),
                    world.transform_point3(c),
                );
                if let Some(hit) = sphere_intersect_triangle(center, radius, a, b, c) {
                    hits.push(hit);
                    center = hit.position;
                }
            }
        }
    }

    log::trace!("[碰撞] 球与模型接触 {} 个", hits.len());
    !hits.is_empty()
}

/// 线段与模型相交，返回离起点最近（世界空间距离）的接触
///
/// 法线由命中三角形的绕序求出，不使用顶点法线。
pub fn ray_intersect_model(start: Vec3, end: Vec3, model: &Model) -> Option<HitResult> {
    let world_ray = end - start;
    let world_length = world_ray.length();
    if world_length <= f32::EPSILON {
        return None;
    }

    let mut nearest_length = world_length;
    let mut result = None;

    for mesh in model.meshes() {
        let world = model.mesh_world_transform(mesh);
        let inverse_world = world.inverse();
        let local_start = inverse_world.transform_point3(start);
        let local_direction = inverse_world.transform_vector3(world_ray).normalize_or_zero();
        if local_direction == Vec3::ZERO {
            continue;
        }

        for [a, b, c] in mesh.triangles() {
            let Some(distance) = ray_intersect_triangle(local_start, local_direction, a, b, c) else {
                continue;
            };

            let world_hit = world.transform_point3(local_start + local_direction * distance);
            let hit_length = (world_hit - start).length();
            if hit_length < nearest_length {
                nearest_length = hit_length;
                let local_normal = (b - a).cross(c - b);
                result = Some(HitResult {
                    position: world_hit,
                    normal: world.transform_vector3(local_normal).normalize_or_zero(),
                });
            }
        }
    }
    result
}

/// 摄像机视线被舞台遮挡时，把视点拉到遮挡点
pub fn clamp_camera_eye(focus: Vec3, eye: Vec3, stage: &Model) -> Vec3 {
    match ray_intersect_model(focus, eye, stage) {
        Some(hit) => hit.position,
        None => eye,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Mesh;
    use crate::skeleton::NodePose;
    use glam::{Mat4, Quat};

    /// 单节点模型，节点姿势可设缩放
    fn stage(pose: NodePose, vertices: Vec<Vec3>, indices: Vec<u32>) -> Model {
        let mut model = Model::new();
        let node = model.skeleton.add_node("stage", None, pose).unwrap();
        model.add_mesh(Mesh::new(node, vertices, indices).unwrap()).unwrap();
        model.update_transform(Mat4::IDENTITY);
        model
    }

    fn floor(pose: NodePose) -> Model {
        let vertices = vec![
            Vec3::new(-5.0, 0.0, -5.0),
            Vec3::new(-5.0, 0.0, 5.0),
            Vec3::new(5.0, 0.0, 5.0),
            Vec3::new(5.0, 0.0, -5.0),
        ];
        stage(pose, vertices, vec![0, 1, 2, 0, 2, 3])
    }

    #[test]
    fn test_ray_returns_nearest_not_first() {
        // 先列出远处的三角形（y = 0），再列出近处的（y = 1）
        let vertices = vec![
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(0.0, 1.0, 1.0),
            Vec3::new(1.0, 1.0, -1.0),
        ];
        let model = stage(NodePose::default(), vertices, vec![0, 1, 2, 3, 4, 5]);

        let hit = ray_intersect_model(Vec3::new(0.0, 3.0, 0.0), Vec3::new(0.0, -3.0, 0.0), &model).expect("hit");
        assert!(hit.position.abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-5));
        assert!(hit.normal.abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn test_ray_respects_segment_length_and_transform() {
        let pose = NodePose {
            position: Vec3::new(0.0, 2.0, 0.0),
            rotation: Quat::IDENTITY,
            scale: Vec3::new(2.0, 1.0, 2.0),
        };
        let model = floor(pose);

        // 线段未到达地面
        assert!(ray_intersect_model(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, 3.0, 0.0), &model).is_none());

        // 非等比缩放的网格：x = 8 仍在 10x10 地面范围内
        let hit = ray_intersect_model(Vec3::new(8.0, 5.0, 0.0), Vec3::new(8.0, 0.0, 0.0), &model).expect("hit");
        assert!(hit.position.abs_diff_eq(Vec3::new(8.0, 2.0, 0.0), 1e-4));
        assert!(hit.normal.abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn test_sphere_on_uniformly_scaled_floor() {
        let pose = NodePose {
            position: Vec3::new(0.0, 1.0, 0.0),
            rotation: Quat::IDENTITY,
            scale: Vec3::splat(2.0),
        };
        let model = floor(pose);
        let mut hits = Vec::new();

        assert!(sphere_intersect_model(Vec3::new(0.5, 1.2, 0.3), 0.4, &model, &mut hits));
        // 同一点落在两个三角形的公共边上时可能产生两次接触，最后结果都在半径处
        let last = hits.last().expect("hit");
        assert!((last.position.y - 1.4).abs() < 1e-4);
        assert!(last.normal.abs_diff_eq(Vec3::Y, 1e-5));

        assert!(!sphere_intersect_model(Vec3::new(0.5, 1.5, 0.3), 0.4, &model, &mut hits));
        assert!(hits.is_empty());
    }

    #[test]
    fn test_sphere_on_non_uniform_floor_uses_world_space() {
        let pose = NodePose {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::new(3.0, 1.0, 1.0),
        };
        let model = floor(pose);
        let mut hits = Vec::new();

        // x = 12 只有在缩放后的地面内
        assert!(sphere_intersect_model(Vec3::new(12.0, 0.1, 0.0), 0.3, &model, &mut hits));
        assert!((hits[0].position.y - 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_clamp_camera_eye_behind_wall() {
        // z = -2 处的墙
        let vertices = vec![
            Vec3::new(-5.0, -5.0, -2.0),
            Vec3::new(5.0, -5.0, -2.0),
            Vec3::new(5.0, 5.0, -2.0),
            Vec3::new(-5.0, 5.0, -2.0),
        ];
        let model = stage(NodePose::default(), vertices, vec![0, 1, 2, 0, 2, 3]);

        let focus = Vec3::new(0.0, 1.0, 0.0);
        let eye = clamp_camera_eye(focus, Vec3::new(0.0, 1.0, -5.0), &model);
        assert!(eye.abs_diff_eq(Vec3::new(0.0, 1.0, -2.0), 1e-5));

        let free = clamp_camera_eye(focus, Vec3::new(0.0, 1.0, 1.5), &model);
        assert_eq!(free, Vec3::new(0.0, 1.0, 1.5));
    }
}
