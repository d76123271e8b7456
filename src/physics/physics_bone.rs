//! 摇摆骨骼（头发、裙子）
//!
//! 链条第 0 根骨骼由动画驱动，之后每对（骨骼, 子骨骼）：
//! 1. 用上一帧位置差估计子骨骼速度，限幅、衰减后加上外力
//! 2. 推进子骨骼位置，并被碰撞球依次推出
//! 3. 以父节点当前世界矩阵重建骨骼的初始姿势，计算初始方向到目标方向的旋转
//! 4. 更新子骨骼世界矩阵并写回节点

use glam::{Mat4, Quat, Vec3};

use crate::skeleton::Skeleton;
use crate::Result;

/// 速度衰减
const VELOCITY_DAMPING: f32 = 0.9;
/// 本地旋转向初始旋转回拉的比例
const ROTATION_RESTORE: f32 = 0.1;
/// 小于该角度不旋转
const ANGLE_EPSILON: f32 = 0.001;

/// 摇摆骨骼
#[derive(Debug, Clone)]
pub struct PhysicsBone {
    /// 节点索引
    pub node: usize,
    /// 碰撞半径
    pub collision_radius: f32,
    /// 本地位置（相对父节点）
    pub local_position: Vec3,
    /// 模拟后的本地旋转
    pub local_rotation: Quat,
    /// 初始本地旋转
    pub default_local_rotation: Quat,
    /// 初始本地矩阵
    pub default_local_transform: Mat4,
    /// 模拟后的世界矩阵
    pub world_transform: Mat4,
    /// 上一帧世界位置
    pub old_world_position: Vec3,
}

impl PhysicsBone {
    /// 以节点当前姿势作为初始姿势
    pub fn new(skeleton: &Skeleton, node: usize, collision_radius: f32) -> Self {
        let n = skeleton.node(node);
        Self {
            node,
            collision_radius,
            local_position: n.position,
            local_rotation: n.rotation,
            default_local_rotation: n.rotation,
            default_local_transform: n.local_transform,
            world_transform: n.world_transform,
            old_world_position: n.world_position(),
        }
    }

    /// 世界位置
    #[inline]
    pub fn world_position(&self) -> Vec3 {
        self.world_transform.w_axis.truncate()
    }
}

/// 碰撞骨骼：挂在动画骨架上的球，只作为摇摆骨骼的障碍物
#[derive(Debug, Clone, Copy)]
pub struct CollisionBone {
    /// 节点索引
    pub node: usize,
    /// 节点本地空间偏移
    pub offset: Vec3,
    /// 半径
    pub radius: f32,
}

impl CollisionBone {
    /// 球心世界位置
    #[inline]
    pub fn world_position(&self, skeleton: &Skeleton) -> Vec3 {
        skeleton.node(self.node).world_transform.transform_point3(self.offset)
    }
}

/// 按 (节点名, 半径) 表创建摇摆骨骼链
pub fn setup_physics_bones(skeleton: &Skeleton, params: &[(&str, f32)]) -> Result<Vec<PhysicsBone>> {
    params
        .iter()
        .map(|&(name, radius)| Ok(PhysicsBone::new(skeleton, skeleton.require(name)?, radius)))
        .collect()
}

/// 按 (节点名, 半径, 偏移) 表创建碰撞骨骼
pub fn setup_collision_bones(skeleton: &Skeleton, params: &[(&str, f32, Vec3)]) -> Result<Vec<CollisionBone>> {
    params
        .iter()
        .map(|&(name, radius, offset)| {
            Ok(CollisionBone {
                node: skeleton.require(name)?,
                offset,
                radius,
            })
        })
        .collect()
}

/// 把位置依次推出每个碰撞球（先到先推，后面的球可能再次移动已推出的位置）
pub fn compute_collision_bones(skeleton: &Skeleton, colliders: &[CollisionBone], position: Vec3, radius: f32) -> Vec3 {
    let mut position = position;
    for collider in colliders {
        let center = collider.world_position(skeleton);
        let vec = position - center;
        let range = collider.radius + radius;
        if vec.length_squared() < range * range {
            let direction = vec.normalize_or_zero();
            if direction != Vec3::ZERO {
                position = center + direction * range;
            }
        }
    }
    position
}

/// 模拟一条摇摆骨骼链，结果写回骨架节点
///
/// `force` 为已乘以时间的外力，`max_velocity` 为每步最大位移。长度小于 2 的链不做任何事。
pub fn compute_physics_bones(
    skeleton: &mut Skeleton,
    bones: &mut [PhysicsBone],
    colliders: &[CollisionBone],
    force: Vec3,
    max_velocity: f32,
) {
    if bones.len() < 2 {
        return;
    }

    // 根骨骼跟随动画
    bones[0].world_transform = skeleton.node(bones[0].node).world_transform;

    for i in 1..bones.len() {
        let (head, tail) = bones.split_at_mut(i);
        let bone = &mut head[i - 1];
        let child = &mut tail[0];

        // 速度 = 上一帧位移（限幅、衰减）+ 外力
        let child_position = child.world_position();
        let mut velocity = child_position - child.old_world_position;
        child.old_world_position = child_position;
        if velocity.length_squared() > max_velocity * max_velocity {
            velocity = velocity.normalize_or_zero() * max_velocity;
        }
        velocity = velocity * VELOCITY_DAMPING + force;

        let target = compute_collision_bones(skeleton, colliders, child_position + velocity, child.collision_radius);

        // 以父节点当前世界矩阵重建初始姿势
        let parent_world = skeleton.parent_world_transform(bone.node);
        let default_world = parent_world * bone.default_local_transform;

        let target_direction = (target - bone.world_position()).normalize_or_zero();
        let default_direction = default_world.transform_vector3(child.local_position).normalize_or_zero();
        let angle = default_direction.dot(target_direction).clamp(-1.0, 1.0).acos();

        if angle.abs() > ANGLE_EPSILON {
            let world_axis = default_direction.cross(target_direction).normalize_or_zero();
            let local_axis = default_world.inverse().transform_vector3(world_axis).normalize_or_zero();
            if local_axis != Vec3::ZERO {
                let rotation = Quat::from_axis_angle(local_axis, angle);
                bone.world_transform = default_world * Mat4::from_quat(rotation);

                // 相对父节点的本地旋转，向初始旋转回拉
                bone.local_rotation = (bone.default_local_rotation * rotation)
                    .normalize()
                    .slerp(bone.default_local_rotation, ROTATION_RESTORE);
            }
        } else {
            bone.world_transform = parent_world * Mat4::from_rotation_translation(bone.local_rotation, bone.local_position);
        }

        child.world_transform =
            bone.world_transform * Mat4::from_rotation_translation(child.local_rotation, child.local_position);

        // 写回节点
        let node = skeleton.node_mut(bone.node);
        node.world_transform = bone.world_transform;
        node.rotation = bone.local_rotation;
        skeleton.node_mut(child.node).world_transform = child.world_transform;
    }
}
