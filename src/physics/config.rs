//! 沙盒可调参数
//!
//! 所有参数扁平化，直接在代码中修改默认值即可。
//! 全局实例只提供默认值，场景构建时复制一份，调试面板直接改场景中的副本。

use glam::Vec3;
use once_cell::sync::Lazy;
use std::sync::RwLock;

/// 沙盒配置（扁平化，不嵌套）
#[derive(Debug, Clone, PartialEq)]
pub struct SandboxConfig {
    // ========== 世界 ==========
    /// 重力加速度（每 60fps 帧），默认 0.2
    pub gravity: f32,
    /// 时间缩放，默认 1.0
    pub time_scale: f32,
    /// 场力（风等），作用于摇摆骨骼，默认 (0, 0, 0)
    pub field_force: Vec3,

    // ========== 角色 ==========
    /// 碰撞球半径，默认 0.4
    pub radius: f32,
    /// 摩擦（每 60fps 帧），默认 0.5
    pub friction: f32,
    /// 加速度（每 60fps 帧），默认 1.0
    pub acceleration: f32,
    /// 起跳速度，默认 5.0
    pub jump_speed: f32,
    /// 最大移动速度，默认 6.0
    pub move_speed: f32,
    /// 转身速度（弧度/秒），默认 720 度
    pub turn_speed: f32,
    /// 可站立的最大坡度（度），默认 45
    pub slope_limit: f32,
    /// 空中操控系数，默认 0.5
    pub air_control: f32,
    /// 接地时向下探测的距离，默认 0.1
    pub ground_adjust: f32,

    // ========== 摇摆骨骼 ==========
    /// 每步最大位移，默认 0.05
    pub max_physics_bone_velocity: f32,

    // ========== 调试 ==========
    /// 是否输出每帧调试日志，默认 false
    pub debug_log: bool,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            // ====== 世界 ======
            gravity: 0.2,
            time_scale: 1.0,
            field_force: Vec3::ZERO,

            // ====== 角色 ======
            radius: 0.4,
            friction: 0.5,
            acceleration: 1.0,
            jump_speed: 5.0,
            move_speed: 6.0,
            turn_speed: 720.0_f32.to_radians(),
            // 超过该角度的斜面视为墙
            slope_limit: 45.0,
            air_control: 0.5,
            ground_adjust: 0.1,

            // ====== 摇摆骨骼 ======
            // 限制单步位移，防止瞬移时头发被甩飞
            max_physics_bone_velocity: 0.05,

            // ====== 调试 ======
            debug_log: false,
        }
    }
}

impl SandboxConfig {
    /// 摇摆骨骼本帧受到的外力（场力 + 重力）* 时间
    #[inline]
    pub fn physics_bone_force(&self, elapsed_time: f32) -> Vec3 {
        (self.field_force + Vec3::new(0.0, -self.gravity, 0.0)) * elapsed_time
    }
}

/// 全局配置实例
static SANDBOX_CONFIG: Lazy<RwLock<SandboxConfig>> = Lazy::new(|| RwLock::new(SandboxConfig::default()));

/// 获取当前配置（只读）
pub fn get_config() -> SandboxConfig {
    SANDBOX_CONFIG.read().unwrap_or_else(|e| e.into_inner()).clone()
}

/// 手动设置配置（用于运行时调试）
pub fn set_config(config: SandboxConfig) {
    *SANDBOX_CONFIG.write().unwrap_or_else(|e| e.into_inner()) = config;
}

/// 重置为默认配置
pub fn reset_config() {
    *SANDBOX_CONFIG.write().unwrap_or_else(|e| e.into_inner()) = SandboxConfig::default();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tuning() {
        let config = SandboxConfig::default();
        assert!((config.turn_speed - 720.0_f32.to_radians()).abs() < 1e-6);
        assert_eq!(config.slope_limit, 45.0);
        assert!(!config.debug_log);
    }

    #[test]
    fn test_physics_bone_force() {
        let config = SandboxConfig {
            field_force: Vec3::new(0.3, 0.0, 0.0),
            ..SandboxConfig::default()
        };
        let force = config.physics_bone_force(0.5);
        assert!(force.abs_diff_eq(Vec3::new(0.15, -0.1, 0.0), 1e-6));
    }

    #[test]
    fn test_global_config_roundtrip() {
        let mut config = get_config();
        config.time_scale = 0.5;
        set_config(config.clone());
        assert_eq!(get_config().time_scale, 0.5);
        reset_config();
        assert_eq!(get_config(), SandboxConfig::default());
    }
}
