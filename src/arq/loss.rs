//! 丢包判定（Loss Oracle）
//!
//! 判定只取决于配置的丢弃集合；每个单位在越过信道中点时询问一次。
//! 丢弃一旦被记录，对应序号就从集合中移除，同一序号不会被丢第二次。

use std::collections::BTreeSet;
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct LossOracle {
    midpoint: f64,
    packets: BTreeSet<u64>,
    acks: BTreeSet<u64>,
}

impl LossOracle {
    /// 超出 `0..total_packets` 的序号被忽略。
    pub fn new(
        midpoint: f64,
        total_packets: u64,
        packets: &BTreeSet<u64>,
        acks: &BTreeSet<u64>,
    ) -> Self {
        let in_range = |kind: &str, set: &BTreeSet<u64>| {
            set.iter()
                .copied()
                .filter(|&seq| {
                    let ok = seq < total_packets;
                    if !ok {
                        warn!(kind, seq, total_packets, "丢弃序号超出范围，已忽略");
                    }
                    ok
                })
                .collect::<BTreeSet<_>>()
        };
        Self {
            midpoint,
            packets: in_range("packet", packets),
            acks: in_range("ack", acks),
        }
    }

    pub fn midpoint(&self) -> f64 {
        self.midpoint
    }

    /// 分组是否应在当前位置被丢弃（位置已越过中点且序号仍在丢弃集合中）
    pub fn should_lose_packet(&self, seq: u64, position: f64) -> bool {
        position >= self.midpoint && self.packets.contains(&seq)
    }

    /// ACK 是否应在当前位置被丢弃（ACK 反向移动，位置不大于中点即越过）
    pub fn should_lose_ack(&self, seq: u64, position: f64) -> bool {
        position <= self.midpoint && self.acks.contains(&seq)
    }

    pub fn record_packet_drop(&mut self, seq: u64) {
        self.packets.remove(&seq);
    }

    pub fn record_ack_drop(&mut self, seq: u64) {
        self.acks.remove(&seq);
    }

    /// 分组本身或其 ACK 尚待丢弃
    pub fn is_loss_prone(&self, seq: u64) -> bool {
        self.packets.contains(&seq) || self.acks.contains(&seq)
    }

    #[cfg(test)]
    pub(crate) fn packet_loss_pending(&self, seq: u64) -> bool {
        self.packets.contains(&seq)
    }

    #[cfg(test)]
    pub(crate) fn ack_loss_pending(&self, seq: u64) -> bool {
        self.acks.contains(&seq)
    }

    /// 超时重传时撤销尚未发生的分组丢弃。
    pub fn retire_packet(&mut self, seq: u64) -> bool {
        self.packets.remove(&seq)
    }

    pub fn retire_ack(&mut self, seq: u64) -> bool {
        self.acks.remove(&seq)
    }

    #[cfg(test)]
    pub(crate) fn is_exhausted(&self) -> bool {
        self.packets.is_empty() && self.acks.is_empty()
    }
}
