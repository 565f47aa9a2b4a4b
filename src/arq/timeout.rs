//! 超时记录
//!
//! 每个等待 ACK 且可能丢失的分组对应一条记录；ACK 到达或超时触发时删除。

use crate::sim::SimTime;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeoutRecord {
    pub start: SimTime,
    pub duration: SimTime,
    /// 0..=1
    pub progress: f64,
}

impl TimeoutRecord {
    fn progress_at(&self, now: SimTime) -> f64 {
        if self.duration.0 == 0 {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.start);
        (elapsed.0 as f64 / self.duration.0 as f64).min(1.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TimeoutTable {
    records: BTreeMap<u64, TimeoutRecord>,
}

impl TimeoutTable {
    /// 为 `seq` 启动（或重启）一条超时记录
    pub fn arm(&mut self, seq: u64, now: SimTime, duration: SimTime) {
        self.records.insert(
            seq,
            TimeoutRecord {
                start: now,
                duration,
                progress: 0.0,
            },
        );
    }

    pub fn cancel(&mut self, seq: u64) -> Option<TimeoutRecord> {
        self.records.remove(&seq)
    }

    #[cfg(test)]
    pub(crate) fn get(&self, seq: u64) -> Option<&TimeoutRecord> {
        self.records.get(&seq)
    }

    pub fn contains(&self, seq: u64) -> bool {
        self.records.contains_key(&seq)
    }

    /// 刷新所有记录的进度，移除并按序号升序返回已到期的序号。
    pub fn expire(&mut self, now: SimTime) -> Vec<u64> {
        let mut fired = Vec::new();
        for (&seq, rec) in self.records.iter_mut() {
            rec.progress = rec.progress_at(now);
            if rec.progress >= 1.0 {
                fired.push(seq);
            }
        }
        for seq in &fired {
            self.records.remove(seq);
        }
        fired
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &TimeoutRecord)> {
        self.records.iter().map(|(&seq, rec)| (seq, rec))
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
