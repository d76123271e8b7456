//! 两骨解析 IK
//!
//! 单次解析求解（非迭代）：
//! 1. 根骨骼转向目标
//! 2. 目标可达时用海伦公式求三角形高，得到根骨骼的弯曲角，沿极向量方向弯曲
//! 3. 中间骨骼转向目标

use glam::{Quat, Vec3};

use super::Skeleton;
use crate::Result;

/// 叉积长度平方低于该值视为共线，不旋转
const AXIS_EPSILON_SQ: f32 = 1e-12;

/// 两骨 IK 链（根 / 中间 / 末端）
#[derive(Clone, Copy, Debug)]
pub struct TwoBoneIk {
    pub root: usize,
    pub mid: usize,
    pub tip: usize,
}

impl TwoBoneIk {
    /// 按节点名称创建
    pub fn new(skeleton: &Skeleton, root: &str, mid: &str, tip: &str) -> Result<Self> {
        Ok(Self {
            root: skeleton.require(root)?,
            mid: skeleton.require(mid)?,
            tip: skeleton.require(tip)?,
        })
    }

    /// 求解，使末端到达目标位置
    #[inline]
    pub fn solve(&self, skeleton: &mut Skeleton, target: Vec3, pole: Vec3) {
        solve_two_bone_ik(skeleton, self.root, self.mid, self.tip, target, pole);
    }
}

/// 两骨 IK 求解
///
/// 三个节点的世界矩阵必须是最新的。求解后根骨骼及其子孙的世界矩阵已重新计算。
pub fn solve_two_bone_ik(
    skeleton: &mut Skeleton,
    root: usize,
    mid: usize,
    tip: usize,
    target: Vec3,
    pole: Vec3,
) {
    let root_position = skeleton.node(root).world_position();
    let mid_position = skeleton.node(mid).world_position();
    let tip_position = skeleton.node(tip).world_position();

    let root_mid_length = (mid_position - root_position).length();
    let mid_tip_length = (tip_position - mid_position).length();
    let root_target_length = (target - root_position).length();

    let root_mid_direction = (mid_position - root_position).normalize_or_zero();
    let root_target_direction = (target - root_position).normalize_or_zero();

    // 根骨骼转向目标
    rotate_bone(skeleton, root, root_mid_direction, root_target_direction);

    // 目标在两骨长度之和以内时，弯曲根骨骼使末端恰好到达目标
    if root_target_length < root_mid_length + mid_tip_length
        && root_mid_length > f32::EPSILON
        && root_target_length > f32::EPSILON
    {
        // 海伦公式求三角形面积
        let s = (root_mid_length + mid_tip_length + root_target_length) * 0.5;
        let square = (s
            * (s - root_mid_length)
            * (s - mid_tip_length)
            * (s - root_target_length))
            .max(0.0)
            .sqrt();

        // 以根→中间为底边的高
        let root_mid_height = 2.0 * square / root_mid_length;
        let angle = (root_mid_height / root_target_length).clamp(-1.0, 1.0).asin();

        if angle > f32::EPSILON {
            // 转向后根→中间方向与根→目标方向一致，弯曲轴取其与极向量方向的叉积
            let root_pole_direction = (pole - root_position).normalize_or_zero();
            let world_axis = root_target_direction.cross(root_pole_direction);
            if world_axis.length_squared() > AXIS_EPSILON_SQ {
                let inverse_parent = skeleton.parent_world_transform(root).inverse();
                let local_axis = inverse_parent.transform_vector3(world_axis).normalize_or_zero();
                if local_axis != Vec3::ZERO {
                    let node = skeleton.node_mut(root);
                    node.rotation = (Quat::from_axis_angle(local_axis, angle) * node.rotation).normalize();
                }
            }
        }
    }
    skeleton.compute_world_transform(root);

    // 中间骨骼转向目标
    let mid_position = skeleton.node(mid).world_position();
    let tip_position = skeleton.node(tip).world_position();
    let mid_tip_direction = (tip_position - mid_position).normalize_or_zero();
    let mid_target_direction = (target - mid_position).normalize_or_zero();

    rotate_bone(skeleton, mid, mid_tip_direction, mid_target_direction);
    skeleton.compute_world_transform(mid);
}

/// 以最短弧把 from 方向转到 to 方向（世界空间），结果写入本地旋转
fn rotate_bone(skeleton: &mut Skeleton, bone: usize, from: Vec3, to: Vec3) {
    let world_axis = from.cross(to);
    if world_axis.length_squared() < AXIS_EPSILON_SQ {
        return;
    }

    // 转换到父空间
    let inverse_parent = skeleton.parent_world_transform(bone).inverse();
    let local_axis = inverse_parent.transform_vector3(world_axis).normalize_or_zero();
    if local_axis == Vec3::ZERO {
        return;
    }

    // 浮点误差可能使点积超出 [-1, 1]
    let angle = from.dot(to).clamp(-1.0, 1.0).acos();

    let node = skeleton.node_mut(bone);
    node.rotation = (Quat::from_axis_angle(local_axis, angle) * node.rotation).normalize();
}
