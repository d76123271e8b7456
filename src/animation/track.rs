//! 动画轨道
//!
//! 存储单个节点的平移/旋转/缩放关键帧，并提供查找和插值功能。
//! 时间以秒为单位，超出首尾关键帧时取边界值。

use glam::{Quat, Vec3};

use crate::skeleton::NodePose;

/// 关键帧
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe<T> {
    /// 时间（秒）
    pub seconds: f32,
    /// 值
    pub value: T,
}

/// 关键帧之间的插值方式
pub trait Interpolate: Copy {
    fn interpolate(from: Self, to: Self, amount: f32) -> Self;
}

impl Interpolate for Vec3 {
    #[inline]
    fn interpolate(from: Self, to: Self, amount: f32) -> Self {
        from.lerp(to, amount)
    }
}

impl Interpolate for Quat {
    #[inline]
    fn interpolate(from: Self, to: Self, amount: f32) -> Self {
        from.slerp(to, amount)
    }
}

/// 动画轨道 trait
pub trait MotionTrack {
    type Frame;

    /// 查找最近的前后关键帧索引
    fn search_closest(&self, seconds: f32) -> (Option<usize>, Option<usize>);

    /// 求值指定时间，无关键帧时返回 None
    fn seek(&self, seconds: f32) -> Option<Self::Frame>;

    /// 关键帧数量
    fn len(&self) -> usize;

    /// 是否为空
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 最后一个关键帧的时间
    fn max_seconds(&self) -> f32;
}

/// 单一分量的关键帧序列（按时间升序）
#[derive(Debug, Clone)]
pub struct Channel<T> {
    keyframes: Vec<Keyframe<T>>,
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self { keyframes: Vec::new() }
    }
}

impl<T: Interpolate> Channel<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入关键帧，同一时间已存在时覆盖并返回旧值
    pub fn insert(&mut self, seconds: f32, value: T) -> Option<T> {
        let index = self.keyframes.partition_point(|k| k.seconds < seconds);
        match self.keyframes.get_mut(index) {
            Some(existing) if existing.seconds == seconds => {
                Some(std::mem::replace(&mut existing.value, value))
            }
            _ => {
                self.keyframes.insert(index, Keyframe { seconds, value });
                None
            }
        }
    }

    #[inline]
    pub fn keyframes(&self) -> &[Keyframe<T>] {
        &self.keyframes
    }
}

impl<T: Interpolate> MotionTrack for Channel<T> {
    type Frame = T;

    fn search_closest(&self, seconds: f32) -> (Option<usize>, Option<usize>) {
        // 第一个时间大于 seconds 的关键帧
        let next = self.keyframes.partition_point(|k| k.seconds <= seconds);
        let prev = next.checked_sub(1);
        let next = (next < self.keyframes.len()).then_some(next);
        (prev, next)
    }

    fn seek(&self, seconds: f32) -> Option<T> {
        match self.search_closest(seconds) {
            (Some(prev), Some(next)) => {
                let prev = &self.keyframes[prev];
                let next = &self.keyframes[next];
                let interval = next.seconds - prev.seconds;
                let amount = if interval > 0.0 {
                    ((seconds - prev.seconds) / interval).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                Some(T::interpolate(prev.value, next.value, amount))
            }
            // 只有前帧或只有后帧时取边界值
            (Some(prev), None) => Some(self.keyframes[prev].value),
            (None, Some(next)) => Some(self.keyframes[next].value),
            (None, None) => None,
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.keyframes.len()
    }

    fn max_seconds(&self) -> f32 {
        self.keyframes.last().map(|k| k.seconds).unwrap_or(0.0)
    }
}

/// 节点动画轨道
#[derive(Debug, Clone, Default)]
pub struct NodeTrack {
    /// 目标节点索引
    pub node: usize,
    pub translation: Channel<Vec3>,
    pub rotation: Channel<Quat>,
    pub scale: Channel<Vec3>,
}

impl NodeTrack {
    pub fn new(node: usize) -> Self {
        Self { node, ..Self::default() }
    }

    /// 最后一个关键帧的时间
    pub fn max_seconds(&self) -> f32 {
        self.translation
            .max_seconds()
            .max(self.rotation.max_seconds())
            .max(self.scale.max_seconds())
    }

    /// 在 base 之上采样，没有关键帧的分量保留 base 的值
    pub fn sample(&self, base: NodePose, seconds: f32) -> NodePose {
        NodePose {
            position: self.translation.seek(seconds).unwrap_or(base.position),
            rotation: self.rotation.seek(seconds).map(|q| q.normalize()).unwrap_or(base.rotation),
            scale: self.scale.seek(seconds).unwrap_or(base.scale),
        }
    }
}
