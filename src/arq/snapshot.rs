//! 只读快照
//!
//! 渲染器每个 tick 读取一次；快照与状态机完全解耦，修改快照不会影响协议状态。

use super::packet::{Ack, Packet};
use super::stats::ArqStats;
use super::window::Window;
use crate::sim::SimTime;
use serde::Serialize;

/// 一条超时记录的进度（用于进度环显示）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeoutView {
    pub seq: u64,
    pub progress: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// 虚拟时间（不含暂停）
    pub now: SimTime,
    pub channel_length: f64,
    pub packets: Vec<Packet>,
    pub acks: Vec<Ack>,
    pub window: Window,
    pub timeouts: Vec<TimeoutView>,
    /// 当前显示丢包标记的分组序号
    pub lost_packet_marks: Vec<u64>,
    /// 当前显示丢失标记的 ACK 序号
    pub lost_ack_marks: Vec<u64>,
    pub last_ack: Option<u64>,
    pub completed_packets: u64,
    pub started: bool,
    pub paused: bool,
    pub is_complete: bool,
    pub stats: ArqStats,
}

impl Snapshot {
    pub fn timeout_progress(&self, seq: u64) -> Option<f64> {
        self.timeouts
            .iter()
            .find(|t| t.seq == seq)
            .map(|t| t.progress)
    }

    pub fn packet(&self, seq: u64) -> Option<&Packet> {
        self.packets.get(seq as usize)
    }
}
