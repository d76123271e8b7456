//! 程序化人偶
//!
//! 不依赖资源文件的完整角色：节点名与 rig 表一致，包含全部摇摆链、
//! 碰撞球挂点、足部 IK 骨骼，以及角色使用的全部动画。
//! 用于沙盒与测试。

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};

use super::rig::ClipSet;
use crate::animation::{AnimationClip, NodeTrack};
use crate::model::Model;
use crate::skeleton::{NodePose, Skeleton};
use crate::Result;

/// 腰部静止高度
pub const HIPS_HEIGHT: f32 = 0.95;
/// 大腿、小腿长度
const LEG_LENGTH: f32 = 0.45;

/// 构建人偶模型
pub fn build_mannequin() -> Result<Model> {
    let mut model = Model::new();
    build_skeleton(&mut model.skeleton)?;
    for clip in build_clips(&model)? {
        model.add_animation(clip);
    }
    log::info!(
        "[人偶] 构建完成: 节点 {} 个, 动画 {} 个",
        model.skeleton.len(),
        model.animations().len()
    );
    Ok(model)
}

// ============================================================================
// 骨架
// ============================================================================

fn build_skeleton(s: &mut Skeleton) -> Result<()> {
    let reference = s.add_node("Character1_Reference", None, NodePose::default())?;
    let hips = s.add_node(
        "Character1_Hips",
        Some(reference),
        NodePose::from_position(Vec3::new(0.0, HIPS_HEIGHT, 0.0)),
    )?;

    // 腿：小腿绕 X 旋转 90 度，本地 +Y 朝前作为极向量方向
    for (side, x) in [("Left", 0.1f32), ("Right", -0.1f32)] {
        let thigh = s.add_node(
            format!("Character1_{side}UpLeg"),
            Some(hips),
            NodePose::from_position(Vec3::new(x, 0.0, 0.0)),
        )?;
        let leg = s.add_node(
            format!("Character1_{side}Leg"),
            Some(thigh),
            NodePose::from_position_rotation(Vec3::new(0.0, -LEG_LENGTH, 0.0), Quat::from_rotation_x(FRAC_PI_2)),
        )?;
        let foot = s.add_node(
            format!("Character1_{side}Foot"),
            Some(leg),
            NodePose::from_position_rotation(Vec3::new(0.0, 0.0, LEG_LENGTH), Quat::from_rotation_x(-FRAC_PI_2)),
        )?;
        s.add_node(
            format!("Character1_{side}ToeBase"),
            Some(foot),
            NodePose::from_position(Vec3::new(0.0, -0.05, 0.1)),
        )?;
    }

    // 上半身
    let spine = s.add_node("Character1_Spine", Some(hips), NodePose::from_position(Vec3::new(0.0, 0.1, 0.0)))?;
    let spine1 = s.add_node("Character1_Spine1", Some(spine), NodePose::from_position(Vec3::new(0.0, 0.15, 0.0)))?;
    let spine2 = s.add_node("Character1_Spine2", Some(spine1), NodePose::from_position(Vec3::new(0.0, 0.15, 0.0)))?;
    let neck = s.add_node("Character1_Neck", Some(spine2), NodePose::from_position(Vec3::new(0.0, 0.15, 0.0)))?;
    let head = s.add_node("Character1_Head", Some(neck), NodePose::from_position(Vec3::new(0.0, 0.1, 0.0)))?;

    for (side, x) in [("Left", 1.0f32), ("Right", -1.0f32)] {
        let shoulder = s.add_node(
            format!("Character1_{side}Shoulder"),
            Some(spine2),
            NodePose::from_position(Vec3::new(0.05 * x, 0.12, 0.0)),
        )?;
        let arm = s.add_node(
            format!("Character1_{side}Arm"),
            Some(shoulder),
            NodePose::from_position(Vec3::new(0.1 * x, 0.0, 0.0)),
        )?;
        let fore_arm = s.add_node(
            format!("Character1_{side}ForeArm"),
            Some(arm),
            NodePose::from_position(Vec3::new(0.25 * x, 0.0, 0.0)),
        )?;
        s.add_node(
            format!("Character1_{side}Hand"),
            Some(fore_arm),
            NodePose::from_position(Vec3::new(0.22 * x, 0.0, 0.0)),
        )?;
    }

    // 头发：头顶后方垂下七节
    for (side, x) in [("L", 0.1f32), ("R", -0.1f32)] {
        let mut parent = head;
        for i in 0..7 {
            let offset = if i == 0 { Vec3::new(x, 0.1, -0.15) } else { Vec3::new(0.0, -0.1, 0.0) };
            parent = s.add_node(format!("J_{side}_HairTail_{i:02}"), Some(parent), NodePose::from_position(offset))?;
        }
    }

    // 裙子：腰部前后各三节
    for (side, x) in [("L", 0.1f32), ("R", -0.1f32)] {
        for (part, z) in [("Skirt", 0.1f32), ("SkirtBack", -0.1f32)] {
            let mut parent = hips;
            for i in 0..3 {
                let offset = if i == 0 {
                    Vec3::new(x, -0.05, z)
                } else {
                    Vec3::new(0.0, -0.1, z * 0.2)
                };
                parent = s.add_node(format!("J_{side}_{part}_{i:02}"), Some(parent), NodePose::from_position(offset))?;
            }
        }
    }
    Ok(())
}

// ============================================================================
// 动画
// ============================================================================

/// 轨道构建
fn track(node: usize, translations: &[(f32, Vec3)], rotations: &[(f32, Quat)]) -> NodeTrack {
    let mut track = NodeTrack::new(node);
    for &(seconds, value) in translations {
        track.translation.insert(seconds, value);
    }
    for &(seconds, value) in rotations {
        track.rotation.insert(seconds, value);
    }
    track
}

#[inline]
fn hips_at(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(x, HIPS_HEIGHT + y, z)
}

/// 腿前后摆动
fn leg_swing(model: &Model, clip: &mut AnimationClip, length: f32, amplitude: f32) -> Result<()> {
    for (name, sign) in [("Character1_LeftUpLeg", 1.0f32), ("Character1_RightUpLeg", -1.0f32)] {
        let node = model.require_node(name)?;
        let a = amplitude * sign;
        clip.add_track(track(
            node,
            &[],
            &[
                (0.0, Quat::from_rotation_x(a)),
                (length * 0.5, Quat::from_rotation_x(-a)),
                (length, Quat::from_rotation_x(a)),
            ],
        ));
    }
    Ok(())
}

fn build_clips(model: &Model) -> Result<Vec<AnimationClip>> {
    let hips = model.require_node("Character1_Hips")?;
    let spine = model.require_node("Character1_Spine")?;
    let left_arm = model.require_node("Character1_LeftArm")?;
    let mut clips = Vec::new();

    // 待机：呼吸起伏
    let mut idle = AnimationClip::new(ClipSet::IDLE, 2.0);
    idle.add_track(track(
        hips,
        &[(0.0, hips_at(0.0, 0.0, 0.0)), (1.0, hips_at(0.0, -0.02, 0.0)), (2.0, hips_at(0.0, 0.0, 0.0))],
        &[],
    ));
    clips.push(idle);

    // 原地跑
    let mut run = AnimationClip::new(ClipSet::RUN, 0.8);
    run.add_track(track(
        hips,
        &[
            (0.0, hips_at(0.0, -0.05, 0.0)),
            (0.2, hips_at(0.0, 0.0, 0.0)),
            (0.4, hips_at(0.0, -0.05, 0.0)),
            (0.6, hips_at(0.0, 0.0, 0.0)),
            (0.8, hips_at(0.0, -0.05, 0.0)),
        ],
        &[],
    ));
    leg_swing(model, &mut run, 0.8, 0.6)?;
    clips.push(run);

    // 连招：腰部向前推进（根运动），左臂挥动
    let [c1, c2, c3, c4] = ClipSet::COMBO;
    for (name, length, advance) in [(c1, 0.8f32, 0.3f32), (c2, 0.8, 0.3), (c3, 1.0, 0.5), (c4, 1.0, 0.6)] {
        let mut clip = AnimationClip::new(name, length);
        clip.add_track(track(
            hips,
            &[
                (0.0, hips_at(0.0, 0.0, 0.0)),
                (length * 0.4, hips_at(0.0, -0.05, advance * 0.8)),
                (length, hips_at(0.0, 0.0, advance)),
            ],
            &[],
        ));
        clip.add_track(track(
            left_arm,
            &[],
            &[
                (0.0, Quat::from_rotation_z(1.2)),
                (length * 0.4, Quat::from_rotation_y(-1.4)),
                (length, Quat::from_rotation_z(-0.3)),
            ],
        ));
        clip.add_track(track(
            spine,
            &[],
            &[(0.0, Quat::IDENTITY), (length * 0.4, Quat::from_rotation_y(-0.4)), (length, Quat::IDENTITY)],
        ));
        clips.push(clip);
    }

    // 着地：跑动着地向前滑行，原地着地只下蹲
    for (name, length, dip, advance) in [
        (ClipSet::RUN_LANDING_FAST, 0.5f32, 0.2f32, 0.5f32),
        (ClipSet::RUN_LANDING, 0.4, 0.1, 0.4),
        (ClipSet::IDLE_LAND_FAST, 0.5, 0.2, 0.0),
        (ClipSet::IDLE_LAND, 0.4, 0.1, 0.0),
    ] {
        let mut clip = AnimationClip::new(name, length);
        clip.add_track(track(
            hips,
            &[
                (0.0, hips_at(0.0, 0.0, 0.0)),
                (length * 0.3, hips_at(0.0, -dip, advance * 0.5)),
                (length, hips_at(0.0, 0.0, advance)),
            ],
            &[],
        ));
        clips.push(clip);
    }

    // 空中：每个阶段一个固定姿势，循环播放
    for (name, knee) in [
        (ClipSet::JUMP_TAKE_OFF, 0.2f32),
        (ClipSet::JUMP_GOES_UP2, 0.4),
        (ClipSet::JUMP_GOES_UP, 0.5),
        (ClipSet::JUMP_GOES_DOWN2, 0.1),
        (ClipSet::JUMP_GOES_DOWN, 0.2),
        (ClipSet::JUMP_PEAK, 0.6),
    ] {
        let mut clip = AnimationClip::new(name, 0.5);
        leg_swing(model, &mut clip, 0.5, knee)?;
        clips.push(clip);
    }

    Ok(clips)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::rig::{COLLIDER_GROUPS, HEAD_NODE, LEFT_FOOT_IK_NODES, PHYSICS_CHAINS, RIGHT_FOOT_IK_NODES};
    use glam::Mat4;

    #[test]
    fn test_mannequin_has_every_rig_node_and_clip() {
        let model = build_mannequin().unwrap();
        for chain in &PHYSICS_CHAINS {
            for (name, _) in chain.bones {
                assert!(model.node_index(name).is_some(), "{}", name);
            }
        }
        for group in &COLLIDER_GROUPS {
            for (name, _, _) in group.bones {
                assert!(model.node_index(name).is_some(), "{}", name);
            }
        }
        for name in LEFT_FOOT_IK_NODES.iter().chain(&RIGHT_FOOT_IK_NODES).chain([&HEAD_NODE]) {
            assert!(model.node_index(name).is_some(), "{}", name);
        }
        assert!(ClipSet::resolve(&model).is_ok());
    }

    #[test]
    fn test_feet_touch_the_ground_at_rest() {
        let mut model = build_mannequin().unwrap();
        model.update_transform(Mat4::IDENTITY);
        let foot = model.require_node("Character1_LeftFoot").unwrap();
        let y = model.skeleton.node(foot).world_position().y;
        assert!((y - (HIPS_HEIGHT - 2.0 * LEG_LENGTH)).abs() < 1e-5);
    }

    #[test]
    fn test_combo_clips_outlast_their_shift_frames() {
        let model = build_mannequin().unwrap();
        let clips = ClipSet::resolve(&model).unwrap();
        for (index, shift) in clips.combo.iter().zip([15.0f32, 17.0, 35.0]) {
            assert!(model.animation(*index).seconds_length * 60.0 > shift);
        }
    }
}
