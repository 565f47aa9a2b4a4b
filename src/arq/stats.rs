//! 统计信息
//!
//! 定义一次 ARQ 运行的统计数据结构。

use crate::sim::SimTime;
use serde::Serialize;

/// 运行统计
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArqStats {
    pub transmissions: u64,
    pub retransmissions: u64,
    pub packets_lost: u64,
    pub acks_sent: u64,
    pub acks_lost: u64,
    pub acks_delivered: u64,
    pub timeouts_fired: u64,
    pub completed_at: Option<SimTime>,
}
