//! 输入快照
//!
//! 由外部输入层每帧生成一次，状态机与移动只读取这里的值，
//! 因此可以用脚本回放输入。

use bitflags::bitflags;
use glam::{Vec2, Vec3};

bitflags! {
    /// 按键位
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InputKeys: u32 {
        const JUMP = 1 << 0;
        const ATTACK = 1 << 1;
    }
}

/// 每帧输入状态
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputState {
    /// 左摇杆 X（右为正）
    pub axis_x: f32,
    /// 左摇杆 Y（前为正）
    pub axis_y: f32,
    /// 摇杆长度，不超过 1
    pub axis_length: f32,
    pub key_new: InputKeys,
    pub key_old: InputKeys,
    /// 本帧按下
    pub key_down: InputKeys,
    /// 本帧松开
    pub key_up: InputKeys,
    /// 摄像机前方（世界空间）
    pub camera_front: Vec3,
    /// 摄像机右方（世界空间）
    pub camera_right: Vec3,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            axis_x: 0.0,
            axis_y: 0.0,
            axis_length: 0.0,
            key_new: InputKeys::empty(),
            key_old: InputKeys::empty(),
            key_down: InputKeys::empty(),
            key_up: InputKeys::empty(),
            camera_front: Vec3::Z,
            camera_right: Vec3::X,
        }
    }
}

impl InputState {
    /// 写入本帧摇杆与按键，求出按下/松开的边沿
    pub fn update(&mut self, axis: Vec2, keys: InputKeys) {
        let mut axis = axis;
        let mut length = axis.length();
        if length > 1.0 {
            axis /= length;
            length = 1.0;
        }
        self.axis_x = axis.x;
        self.axis_y = axis.y;
        self.axis_length = length;

        self.key_old = self.key_new;
        self.key_new = keys;
        self.key_down = !self.key_old & self.key_new;
        self.key_up = !self.key_new & self.key_old;
    }

    /// 设置摄像机基向量
    #[inline]
    pub fn set_camera(&mut self, front: Vec3, right: Vec3) {
        self.camera_front = front;
        self.camera_right = right;
    }

    #[inline]
    pub fn is_down(&self, key: InputKeys) -> bool {
        self.key_down.contains(key)
    }
}
