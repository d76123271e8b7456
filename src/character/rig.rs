//! 角色骨架描述：节点名、摇摆链、碰撞球与动画名
//!
//! 六条摇摆链共用同一套建立代码，只由这里的表区分。

use glam::Vec3;

use crate::model::Model;
use crate::Result;

// ============================================================================
// 节点名
// ============================================================================

/// 根运动节点，同时也是足部 IK 调整高度的腰部节点
pub const HIPS_NODE: &str = "Character1_Hips";
pub const HEAD_NODE: &str = "Character1_Head";
/// 武器挂点
pub const LEFT_HAND_NODE: &str = "Character1_LeftHand";

/// 足部 IK 节点（大腿, 小腿, 脚, 脚尖）
pub const LEFT_FOOT_IK_NODES: [&str; 4] = [
    "Character1_LeftUpLeg",
    "Character1_LeftLeg",
    "Character1_LeftFoot",
    "Character1_LeftToeBase",
];
pub const RIGHT_FOOT_IK_NODES: [&str; 4] = [
    "Character1_RightUpLeg",
    "Character1_RightLeg",
    "Character1_RightFoot",
    "Character1_RightToeBase",
];

// ============================================================================
// 碰撞球组与摇摆链
// ============================================================================

/// 碰撞球组
#[derive(Debug, Clone, Copy)]
pub struct ColliderGroupDesc {
    pub name: &'static str,
    /// (节点名, 半径, 节点本地偏移)
    pub bones: &'static [(&'static str, f32, Vec3)],
}

/// 摇摆链
#[derive(Debug, Clone, Copy)]
pub struct PhysicsChainDesc {
    pub name: &'static str,
    /// (节点名, 碰撞半径)，第 0 根由动画驱动
    pub bones: &'static [(&'static str, f32)],
    /// 使用的碰撞球组（`COLLIDER_GROUPS` 的下标）
    pub colliders: usize,
}

pub const UPPER_BODY: usize = 0;
pub const LEFT_LEG: usize = 1;
pub const RIGHT_LEG: usize = 2;

pub const COLLIDER_GROUPS: [ColliderGroupDesc; 3] = [
    ColliderGroupDesc {
        name: "UpperBody",
        bones: &[
            ("Character1_Hips", 0.10, Vec3::new(0.00, 0.0, 0.0)),
            ("Character1_Spine2", 0.10, Vec3::new(0.00, 0.0, 0.0)),
            ("Character1_Neck", 0.07, Vec3::new(0.00, 0.0, 0.0)),
            ("Character1_Head", 0.12, Vec3::new(-0.10, 0.0, 0.0)),
            ("Character1_LeftShoulder", 0.06, Vec3::new(-0.10, 0.0, 0.0)),
            ("Character1_LeftArm", 0.06, Vec3::new(-0.17, 0.0, 0.0)),
            ("Character1_LeftForeArm", 0.06, Vec3::new(-0.05, 0.0, 0.0)),
            ("Character1_LeftHand", 0.10, Vec3::new(-0.05, 0.0, 0.0)),
            ("Character1_RightShoulder", 0.06, Vec3::new(-0.10, 0.0, 0.0)),
            ("Character1_RightArm", 0.06, Vec3::new(-0.17, 0.0, 0.0)),
            ("Character1_RightForeArm", 0.06, Vec3::new(-0.05, 0.0, 0.0)),
            ("Character1_RightHand", 0.10, Vec3::new(-0.05, 0.0, 0.0)),
        ],
    },
    ColliderGroupDesc {
        name: "LeftLeg",
        bones: &[
            ("Character1_Hips", 0.10, Vec3::new(0.10, 0.0, 0.0)),
            ("Character1_Hips", 0.12, Vec3::new(0.15, 0.0, 0.0)),
            ("Character1_LeftUpLeg", 0.08, Vec3::new(-0.08, 0.0, 0.0)),
        ],
    },
    ColliderGroupDesc {
        name: "RightLeg",
        bones: &[
            ("Character1_Hips", 0.10, Vec3::new(0.10, 0.0, 0.0)),
            ("Character1_Hips", 0.12, Vec3::new(0.15, 0.0, 0.0)),
            ("Character1_RightUpLeg", 0.08, Vec3::new(-0.08, 0.0, 0.0)),
        ],
    },
];

pub const PHYSICS_CHAINS: [PhysicsChainDesc; 6] = [
    PhysicsChainDesc {
        name: "LeftHairTail",
        bones: &[
            ("J_L_HairTail_00", 0.08),
            ("J_L_HairTail_01", 0.08),
            ("J_L_HairTail_02", 0.08),
            ("J_L_HairTail_03", 0.08),
            ("J_L_HairTail_04", 0.08),
            ("J_L_HairTail_05", 0.08),
            ("J_L_HairTail_06", 0.08),
        ],
        colliders: UPPER_BODY,
    },
    PhysicsChainDesc {
        name: "RightHairTail",
        bones: &[
            ("J_R_HairTail_00", 0.08),
            ("J_R_HairTail_01", 0.08),
            ("J_R_HairTail_02", 0.08),
            ("J_R_HairTail_03", 0.08),
            ("J_R_HairTail_04", 0.08),
            ("J_R_HairTail_05", 0.08),
            ("J_R_HairTail_06", 0.08),
        ],
        colliders: UPPER_BODY,
    },
    PhysicsChainDesc {
        name: "LeftSkirtFront",
        bones: &[("J_L_Skirt_00", 0.03), ("J_L_Skirt_01", 0.03), ("J_L_Skirt_02", 0.02)],
        colliders: LEFT_LEG,
    },
    PhysicsChainDesc {
        name: "LeftSkirtBack",
        bones: &[("J_L_SkirtBack_00", 0.02), ("J_L_SkirtBack_01", 0.02), ("J_L_SkirtBack_02", 0.02)],
        colliders: LEFT_LEG,
    },
    PhysicsChainDesc {
        name: "RightSkirtFront",
        bones: &[("J_R_Skirt_00", 0.03), ("J_R_Skirt_01", 0.03), ("J_R_Skirt_02", 0.02)],
        colliders: RIGHT_LEG,
    },
    PhysicsChainDesc {
        name: "RightSkirtBack",
        bones: &[("J_R_SkirtBack_00", 0.02), ("J_R_SkirtBack_01", 0.02), ("J_R_SkirtBack_02", 0.02)],
        colliders: RIGHT_LEG,
    },
];

// ============================================================================
// 动画
// ============================================================================

/// 角色使用的全部动画索引，建立时按名称解析
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipSet {
    pub idle: usize,
    pub run: usize,
    pub combo: [usize; 4],
    pub run_landing_fast: usize,
    pub run_landing: usize,
    pub idle_land_fast: usize,
    pub idle_land: usize,
    pub jump_take_off: usize,
    pub jump_goes_up2: usize,
    pub jump_goes_up: usize,
    pub jump_goes_down2: usize,
    pub jump_goes_down: usize,
    pub jump_peak: usize,
}

impl ClipSet {
    pub const IDLE: &'static str = "Idle";
    pub const RUN: &'static str = "RunForwardInPlace";
    pub const COMBO: [&'static str; 4] = ["Combo1", "Combo2", "Combo3", "Combo4"];
    pub const RUN_LANDING_FAST: &'static str = "RunForwardLandingFast";
    pub const RUN_LANDING: &'static str = "RunForwardLanding";
    pub const IDLE_LAND_FAST: &'static str = "IdleLandFast";
    pub const IDLE_LAND: &'static str = "IdleLand";
    pub const JUMP_TAKE_OFF: &'static str = "JumpTakeOff";
    pub const JUMP_GOES_UP2: &'static str = "JumpGoesUp2";
    pub const JUMP_GOES_UP: &'static str = "JumpGoesUp";
    pub const JUMP_GOES_DOWN2: &'static str = "JumpGoesDown2";
    pub const JUMP_GOES_DOWN: &'static str = "JumpGoesDown";
    pub const JUMP_PEAK: &'static str = "JumpPeak";

    /// 按名称解析，缺少任何一个都返回错误
    pub fn resolve(model: &Model) -> Result<Self> {
        let [c1, c2, c3, c4] = Self::COMBO;
        Ok(Self {
            idle: model.require_animation(Self::IDLE)?,
            run: model.require_animation(Self::RUN)?,
            combo: [
                model.require_animation(c1)?,
                model.require_animation(c2)?,
                model.require_animation(c3)?,
                model.require_animation(c4)?,
            ],
            run_landing_fast: model.require_animation(Self::RUN_LANDING_FAST)?,
            run_landing: model.require_animation(Self::RUN_LANDING)?,
            idle_land_fast: model.require_animation(Self::IDLE_LAND_FAST)?,
            idle_land: model.require_animation(Self::IDLE_LAND)?,
            jump_take_off: model.require_animation(Self::JUMP_TAKE_OFF)?,
            jump_goes_up2: model.require_animation(Self::JUMP_GOES_UP2)?,
            jump_goes_up: model.require_animation(Self::JUMP_GOES_UP)?,
            jump_goes_down2: model.require_animation(Self::JUMP_GOES_DOWN2)?,
            jump_goes_down: model.require_animation(Self::JUMP_GOES_DOWN)?,
            jump_peak: model.require_animation(Self::JUMP_PEAK)?,
        })
    }
}
