//! 动画剪辑

use super::NodeTrack;
use crate::skeleton::NodePose;

/// 动画剪辑（运行时使用）
#[derive(Debug, Clone)]
pub struct AnimationClip {
    /// 名称
    pub name: String,
    /// 长度（秒）
    pub seconds_length: f32,
    tracks: Vec<NodeTrack>,
}

impl AnimationClip {
    /// 创建空剪辑；添加轨道时长度至少延长到最后一个关键帧
    pub fn new(name: impl Into<String>, seconds_length: f32) -> Self {
        Self {
            name: name.into(),
            seconds_length: seconds_length.max(0.0),
            tracks: Vec::new(),
        }
    }

    /// 添加节点轨道
    pub fn add_track(&mut self, track: NodeTrack) {
        self.seconds_length = self.seconds_length.max(track.max_seconds());
        self.tracks.push(track);
    }

    #[inline]
    pub fn tracks(&self) -> &[NodeTrack] {
        &self.tracks
    }

    /// 指定节点的轨道
    pub fn track(&self, node: usize) -> Option<&NodeTrack> {
        self.tracks.iter().find(|t| t.node == node)
    }

    /// 是否包含指定节点的轨道
    #[inline]
    pub fn contains_track(&self, node: usize) -> bool {
        self.track(node).is_some()
    }

    #[inline]
    fn clamp_seconds(&self, seconds: f32) -> f32 {
        seconds.clamp(0.0, self.seconds_length)
    }

    /// 采样单个节点，没有轨道时返回 base
    pub fn sample_node(&self, node: usize, base: NodePose, seconds: f32) -> NodePose {
        let seconds = self.clamp_seconds(seconds);
        match self.track(node) {
            Some(track) => track.sample(base, seconds),
            None => base,
        }
    }

    /// 采样所有轨道写入姿势缓冲（缓冲以节点索引寻址）
    pub fn sample(&self, seconds: f32, poses: &mut [NodePose]) {
        let seconds = self.clamp_seconds(seconds);
        for track in &self.tracks {
            if let Some(pose) = poses.get_mut(track.node) {
                *pose = track.sample(*pose, seconds);
            }
        }
    }
}
