//! 注视骨骼（头部朝向目标）

use glam::{Mat4, Quat, Vec3};

use super::Skeleton;

/// 注视目标搜索半径
const LOOK_RANGE: f32 = 5.0;
/// 无目标时看向前方的距离
const DEFAULT_LOOK_DISTANCE: f32 = 100.0;
/// 每游戏帧向目标靠近的比例
const LOOK_SMOOTHING: f32 = 0.2;

/// 注视骨骼
#[derive(Clone, Debug)]
pub struct LookAtBone {
    /// 节点索引
    pub node: usize,
    /// 节点本地空间中的“正面”方向
    pub forward: Vec3,
    /// 平滑后的世界注视点
    pub target: Vec3,
}

impl LookAtBone {
    /// 以当前世界矩阵下模型的 +Z 作为正面方向
    pub fn new(skeleton: &Skeleton, node: usize) -> Self {
        let world = skeleton.node(node).world_transform;
        let forward = world.inverse().transform_vector3(Vec3::Z).normalize_or_zero();
        let target = world.w_axis.truncate() + skeleton.world_transform().z_axis.truncate() * DEFAULT_LOOK_DISTANCE;
        Self { node, forward, target }
    }

    /// 选出注视点：前方半径内最近的目标，否则为正前方远处
    pub fn select_target(&self, skeleton: &Skeleton, root_transform: &Mat4, candidates: &[Vec3]) -> Vec3 {
        let root_forward = root_transform.z_axis.truncate();
        let head_position = skeleton.node(self.node).world_position();

        let mut target = head_position + root_forward * DEFAULT_LOOK_DISTANCE;
        let mut min_length = LOOK_RANGE;
        for &candidate in candidates {
            let vec = candidate - head_position;
            let length = vec.length();
            if length < min_length && root_forward.dot(vec.normalize_or_zero()) > 0.0 {
                min_length = length;
                target = candidate;
            }
        }
        target
    }

    /// 平滑注视点并在本地空间旋转节点，随后更新其子孙世界矩阵
    pub fn update(
        &mut self,
        skeleton: &mut Skeleton,
        root_transform: &Mat4,
        candidates: &[Vec3],
        elapsed_frame: f32,
    ) {
        let goal = self.select_target(skeleton, root_transform, candidates);
        self.target = self.target.lerp(goal, (elapsed_frame * LOOK_SMOOTHING).min(1.0));

        let inverse_world = skeleton.node(self.node).world_transform.inverse();
        let local_direction = inverse_world.transform_point3(self.target).normalize_or_zero();

        let axis = self.forward.cross(local_direction);
        if axis.length_squared() <= f32::EPSILON * f32::EPSILON {
            return;
        }
        let dot = self.forward.dot(local_direction);
        if dot <= 0.0 {
            return;
        }
        let angle = dot.clamp(-1.0, 1.0).acos();
        if angle > 0.0 {
            let node = skeleton.node_mut(self.node);
            node.rotation = (node.rotation * Quat::from_axis_angle(axis.normalize(), angle)).normalize();
            skeleton.compute_world_transform(self.node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::NodePose;

    fn head() -> (Skeleton, LookAtBone) {
        let mut skeleton = Skeleton::new();
        let neck = skeleton
            .add_node("neck", None, NodePose::from_position(Vec3::new(0.0, 1.5, 0.0)))
            .unwrap();
        let head = skeleton
            .add_node("head", Some(neck), NodePose::from_position(Vec3::new(0.0, 0.1, 0.0)))
            .unwrap();
        skeleton.update_transform(Mat4::IDENTITY);
        let bone = LookAtBone::new(&skeleton, head);
        (skeleton, bone)
    }

    #[test]
    fn test_head_turns_toward_target_in_front() {
        let (mut skeleton, mut bone) = head();
        let ball = Vec3::new(1.0, 2.0, 2.0);

        // 平滑系数为 1 时一帧到位
        bone.update(&mut skeleton, &Mat4::IDENTITY, &[ball], 5.0);

        let head = skeleton.node(bone.node);
        let facing = head.world_transform.z_axis.truncate().normalize();
        let expected = (ball - head.world_position()).normalize();
        assert!(facing.abs_diff_eq(expected, 1e-4));
    }

    #[test]
    fn test_target_behind_is_ignored() {
        let (mut skeleton, mut bone) = head();
        let behind = Vec3::new(0.0, 1.6, -2.0);

        let selected = bone.select_target(&skeleton, &Mat4::IDENTITY, &[behind]);
        assert!(selected.z > 50.0);

        let before = skeleton.node(bone.node).rotation;
        bone.update(&mut skeleton, &Mat4::IDENTITY, &[behind], 1.0);
        assert!(skeleton.node(bone.node).rotation.abs_diff_eq(before, 1e-6));
    }

    #[test]
    fn test_nearest_candidate_wins() {
        let (skeleton, bone) = head();
        let far = Vec3::new(0.0, 1.6, 4.0);
        let near = Vec3::new(0.5, 1.6, 1.0);
        let out_of_range = Vec3::new(0.0, 1.6, 9.0);
        let selected = bone.select_target(&skeleton, &Mat4::IDENTITY, &[far, out_of_range, near]);
        assert_eq!(selected, near);
    }
}
