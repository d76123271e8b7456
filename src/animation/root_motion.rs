//! 根运动提取
//!
//! 在剪辑开头、上一时刻、当前时刻三处采样根运动节点，
//! 把本地位移转换到父节点的模型空间，得到角色本帧位移。

use bitflags::bitflags;
use glam::{Mat4, Vec3};

use crate::model::Model;

bitflags! {
    /// 要从位移中去除（烘焙）的轴
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BakeAxes: u8 {
        const X = 1 << 0;
        const Y = 1 << 1;
        const Z = 1 << 2;
    }
}

/// 根运动结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMotion {
    /// 模型空间位移
    pub translation: Vec3,
    /// 根运动节点本帧的本地位置
    pub node_position: Vec3,
}

/// 计算根运动
///
/// `old_seconds > new_seconds` 视为本帧发生了循环，位移为
/// (末尾 - 上一时刻) + (当前 - 开头)。
///
/// 指定了烘焙轴时，位移的这些分量置零，节点位置在模型空间中这些分量固定为 0；
/// 未指定时节点位置固定为第 0 帧的值。
pub fn compute_root_motion(
    model: &Model,
    node: usize,
    animation: usize,
    old_seconds: f32,
    new_seconds: f32,
    bake: BakeAxes,
) -> RootMotion {
    let begin_pose = model.compute_node_animation(animation, node, 0.0);
    let old_pose = model.compute_node_animation(animation, node, old_seconds);
    let new_pose = model.compute_node_animation(animation, node, new_seconds);

    let local_translation = if old_seconds > new_seconds {
        let length = model.animation(animation).seconds_length;
        let end_pose = model.compute_node_animation(animation, node, length);
        (end_pose.position - old_pose.position) + (new_pose.position - begin_pose.position)
    } else {
        new_pose.position - old_pose.position
    };

    let parent_global = model.skeleton.parent_global_transform(node);
    let mut translation = parent_global.transform_vector3(local_translation);

    if bake.is_empty() {
        return RootMotion {
            translation,
            node_position: begin_pose.position,
        };
    }

    translation = zero_axes(translation, bake);
    RootMotion {
        translation,
        node_position: pin_axes(&parent_global, new_pose.position, bake),
    }
}

/// 把本地位置转到模型空间，指定分量置零后转回本地空间
pub fn pin_axes(parent_global: &Mat4, local_position: Vec3, axes: BakeAxes) -> Vec3 {
    let global_position = zero_axes(parent_global.transform_point3(local_position), axes);
    parent_global.inverse().transform_point3(global_position)
}

#[inline]
fn zero_axes(mut v: Vec3, axes: BakeAxes) -> Vec3 {
    if axes.contains(BakeAxes::X) {
        v.x = 0.0;
    }
    if axes.contains(BakeAxes::Y) {
        v.y = 0.0;
    }
    if axes.contains(BakeAxes::Z) {
        v.z = 0.0;
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimationClip, NodeTrack};
    use crate::skeleton::NodePose;
    use glam::Quat;

    const LENGTH: f32 = 1.0;

    /// root(可旋转) → hips，hips 在 1 秒内沿本地 Z 前进 2，Y 上下起伏
    fn walker(root_rotation: Quat) -> (Model, usize) {
        let mut model = Model::new();
        let root = model
            .skeleton
            .add_node("root", None, NodePose::from_position_rotation(Vec3::ZERO, root_rotation))
            .unwrap();
        let hips = model
            .skeleton
            .add_node("hips", Some(root), NodePose::from_position(Vec3::new(0.0, 1.0, 0.0)))
            .unwrap();

        let mut track = NodeTrack::new(hips);
        for i in 0..=4 {
            let t = i as f32 * 0.25;
            let bob = if i % 2 == 0 { 1.0 } else { 1.1 };
            track.translation.insert(t * LENGTH, Vec3::new(0.0, bob, 2.0 * t));
        }
        let mut clip = AnimationClip::new("Walk", LENGTH);
        clip.add_track(track);
        model.add_animation(clip);
        model.update_transform(Mat4::IDENTITY);
        (model, hips)
    }

    #[test]
    fn test_loop_wrap_equals_sum_of_both_sides() {
        for root_rotation in [Quat::IDENTITY, Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)] {
            let (model, hips) = walker(root_rotation);
            let (old, new) = (LENGTH - 0.1, 0.15);

            let wrapped = compute_root_motion(&model, hips, 0, old, new, BakeAxes::empty());
            let before = compute_root_motion(&model, hips, 0, old, LENGTH, BakeAxes::empty());
            let after = compute_root_motion(&model, hips, 0, 0.0, new, BakeAxes::empty());

            let sum = before.translation + after.translation;
            assert!(wrapped.translation.abs_diff_eq(sum, 1e-5));

            // 朴素差值会向后跳
            let naive = root_rotation * Vec3::new(0.0, 0.0, 2.0 * (new - old));
            assert!(!wrapped.translation.abs_diff_eq(naive, 1e-2));
            assert!(wrapped.translation.length() > 0.0);
        }
    }

    #[test]
    fn test_translation_is_in_parent_global_space() {
        let (model, hips) = walker(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        let motion = compute_root_motion(&model, hips, 0, 0.0, 0.5, BakeAxes::empty());
        // 本地 +Z 前进 1，父节点绕 Y 转 90 度后为 +X
        assert!(motion.translation.abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn test_baked_y_is_pinned_every_frame() {
        let (model, hips) = walker(Quat::IDENTITY);
        let parent_global = model.skeleton.parent_global_transform(hips);

        let dt = 1.0 / 60.0;
        let mut old = 0.0;
        let mut seconds = 0.0;
        for _ in 0..240 {
            let motion = compute_root_motion(&model, hips, 0, old, seconds, BakeAxes::Y);
            let global = parent_global.transform_point3(motion.node_position);
            assert!(global.y.abs() < 1e-6);
            assert_eq!(motion.translation.y, 0.0);

            old = seconds;
            seconds += dt;
            if seconds >= LENGTH {
                seconds -= LENGTH;
            }
        }
    }

    #[test]
    fn test_unbaked_reproduces_authored_vertical_motion() {
        let (model, hips) = walker(Quat::IDENTITY);
        let start = model.compute_node_animation(0, hips, 0.0).position;

        let dt = 1.0 / 60.0;
        let mut accumulated = Vec3::ZERO;
        let mut old = 0.0;
        for frame in 1..=50 {
            let seconds = frame as f32 * dt;
            let motion = compute_root_motion(&model, hips, 0, old, seconds, BakeAxes::empty());
            accumulated += motion.translation;
            // 节点固定在第 0 帧
            assert!(motion.node_position.abs_diff_eq(start, 1e-6));

            let authored = model.compute_node_animation(0, hips, seconds).position - start;
            assert!((accumulated.y - authored.y).abs() < 1e-4);
            old = seconds;
        }
    }

    #[test]
    fn test_pin_axes_keeps_other_components() {
        let pinned = pin_axes(&Mat4::IDENTITY, Vec3::new(1.0, 2.0, 3.0), BakeAxes::X | BakeAxes::Z);
        assert_eq!(pinned, Vec3::new(0.0, 2.0, 0.0));
    }
}
