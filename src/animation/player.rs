//! 动画播放器
//!
//! 管理播放游标、循环与交叉淡入，并在采样后提取根运动。

use glam::Vec3;

use super::root_motion::{compute_root_motion, pin_axes, BakeAxes};
use crate::model::Model;
use crate::skeleton::NodePose;

/// 动画播放器
#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    /// 当前动画索引
    index: Option<usize>,
    /// 当前时刻（秒）
    seconds: f32,
    /// 上一次采样时刻（秒）
    old_seconds: f32,
    /// 已淡入时间
    blend_seconds: f32,
    /// 淡入总时长（0 表示不混合）
    blend_seconds_length: f32,
    looping: bool,
    changed: bool,
    playing: bool,
    root_motion: bool,
    /// 根运动节点
    root_motion_node: usize,
    /// 从位移中去除的轴
    bake: BakeAxes,
    /// 本帧根运动位移（模型空间）
    root_motion_translation: Vec3,
    poses: Vec<NodePose>,
    cache_poses: Vec<NodePose>,
}

impl AnimationPlayer {
    /// 以模型当前姿势初始化，根运动只烘焙 Y 轴
    pub fn new(model: &Model, root_motion_node: usize) -> Self {
        let mut poses = Vec::new();
        model.get_node_poses(&mut poses);
        let cache_poses = poses.clone();
        Self {
            index: None,
            seconds: 0.0,
            old_seconds: 0.0,
            blend_seconds: 0.0,
            blend_seconds_length: 0.0,
            looping: false,
            changed: false,
            playing: false,
            root_motion: false,
            root_motion_node,
            bake: BakeAxes::Y,
            root_motion_translation: Vec3::ZERO,
            poses,
            cache_poses,
        }
    }

    /// 设置烘焙轴
    pub fn with_bake(mut self, bake: BakeAxes) -> Self {
        self.bake = bake;
        self
    }

    // ========================================
    // 访问器
    // ========================================

    #[inline]
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    #[inline]
    pub fn seconds(&self) -> f32 {
        self.seconds
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    #[inline]
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    #[inline]
    pub fn is_blending(&self) -> bool {
        self.blend_seconds_length > 0.0
    }

    #[inline]
    pub fn root_motion_enabled(&self) -> bool {
        self.root_motion
    }

    #[inline]
    pub fn root_motion_translation(&self) -> Vec3 {
        self.root_motion_translation
    }

    // ========================================
    // 播放控制
    // ========================================

    /// 播放动画
    ///
    /// 请求循环播放正在播放的同一动画时不做任何事。
    /// 否则游标归零，并从当前姿势开始淡入。
    pub fn play(&mut self, index: usize, blend_seconds: f32, looping: bool, root_motion: bool) {
        if looping && self.index == Some(index) {
            return;
        }
        self.index = Some(index);
        self.seconds = 0.0;
        self.old_seconds = 0.0;
        self.looping = looping;
        self.blend_seconds = 0.0;
        self.blend_seconds_length = blend_seconds;
        self.changed = true;
        self.root_motion = root_motion;
        self.playing = true;
    }

    /// 采样、提取根运动、推进游标、混合，并写入模型姿势
    pub fn update(&mut self, model: &mut Model, elapsed_time: f32) {
        if let Some(index) = self.index {
            // 切换动画时缓存当前姿势
            if self.changed {
                self.changed = false;
                model.get_node_poses(&mut self.cache_poses);
            }

            model.compute_animation(index, self.seconds, &mut self.poses);

            if self.root_motion {
                let node = self.root_motion_node;
                let motion = compute_root_motion(model, node, index, self.old_seconds, self.seconds, self.bake);
                self.root_motion_translation = motion.translation;

                // 角色接管的轴固定在原点，其余轴保留动画
                let parent_global = model.skeleton.parent_global_transform(node);
                let position = self.poses[node].position;
                self.poses[node].position = pin_axes(&parent_global, position, self.bake.complement());
            } else {
                self.root_motion_translation = Vec3::ZERO;
            }

            // 推进游标
            let length = model.animation(index).seconds_length;
            self.old_seconds = self.seconds;
            self.seconds += elapsed_time;
            if self.seconds >= length {
                if self.looping && length > 0.0 {
                    self.seconds = self.seconds.rem_euclid(length);
                } else {
                    self.seconds = length;
                    self.playing = false;
                }
            }

            // 交叉淡入
            if self.blend_seconds_length > 0.0 {
                let rate = (self.blend_seconds / self.blend_seconds_length).clamp(0.0, 1.0);
                for (pose, cache) in self.poses.iter_mut().zip(&self.cache_poses) {
                    *pose = cache.blend(pose, rate);
                }
                self.blend_seconds += elapsed_time;
                if self.blend_seconds >= self.blend_seconds_length {
                    self.blend_seconds_length = 0.0;
                }
            }
        }

        model.set_node_poses(&self.poses);
    }
}
