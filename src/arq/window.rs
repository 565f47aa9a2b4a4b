//! 发送窗口
//!
//! 窗口不是实体，而是 `[base, base + size)` 的派生视图。

use super::packet::Packet;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub base: u64,
    pub size: u64,
}

impl Window {
    pub fn new(size: u64) -> Self {
        Self { base: 0, size }
    }

    /// 半开区间上界（不截断到分组总数）
    pub fn end(&self) -> u64 {
        self.base.saturating_add(self.size)
    }

    pub fn contains(&self, seq: u64) -> bool {
        seq >= self.base && seq < self.end()
    }

    /// 窗口内且不超过 `total` 的序号
    pub fn range(&self, total: u64) -> std::ops::Range<u64> {
        self.base.min(total)..self.end().min(total)
    }

    /// 越过从 `base` 开始的连续已确认前缀；遇到缺口即停。返回前进的步数。
    pub fn advance(&mut self, packets: &[Packet]) -> u64 {
        let old = self.base;
        while let Some(p) = packets.get(self.base as usize) {
            if !p.status.is_acked() {
                break;
            }
            self.base += 1;
        }
        self.base - old
    }
}
