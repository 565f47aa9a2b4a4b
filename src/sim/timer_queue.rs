//! 延迟动作队列
//!
//! 按虚拟时间排序的最小堆。每个条目都带有调度时的 generation；
//! `bump_generation` 之后，旧 generation 的条目在出队时被静默丢弃，
//! 因此 reset/start 之前登记的延迟动作永远不会作用到新一轮运行上。

use super::scheduled_event::ScheduledEvent;
use super::time::SimTime;
use std::collections::BinaryHeap;
use std::fmt;
use tracing::trace;

pub struct TimerQueue<E> {
    next_seq: u64,
    generation: u64,
    q: BinaryHeap<ScheduledEvent<E>>,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self {
            next_seq: 0,
            generation: 0,
            q: BinaryHeap::new(),
        }
    }
}

impl<E> fmt::Debug for TimerQueue<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerQueue")
            .field("generation", &self.generation)
            .field("queued", &self.q.len())
            .field("live", &self.live_len())
            .finish()
    }
}

impl<E> TimerQueue<E> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 让此前调度的所有条目失效
    pub fn bump_generation(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        trace!(generation = self.generation, stale = self.q.len(), "generation 递增");
        self.generation
    }

    pub fn schedule(&mut self, at: SimTime, ev: E) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.q.push(ScheduledEvent {
            at,
            seq,
            generation: self.generation,
            ev,
        });
    }

    /// 弹出一个 `at <= now` 且属于当前 generation 的条目。
    pub fn pop_due(&mut self, now: SimTime) -> Option<(SimTime, E)> {
        while let Some(top) = self.q.peek() {
            if top.at > now {
                return None;
            }
            let item = self.q.pop()?;
            if item.generation != self.generation {
                trace!(seq = item.seq, generation = item.generation, "丢弃过期条目");
                continue;
            }
            return Some((item.at, item.ev));
        }
        None
    }

    /// 当前 generation 中尚未触发的条目数
    pub fn live_len(&self) -> usize {
        self.q
            .iter()
            .filter(|item| item.generation == self.generation)
            .count()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.live_len() == 0
    }

    #[cfg(test)]
    pub(crate) fn iter_live(&self) -> impl Iterator<Item = &E> {
        self.q
            .iter()
            .filter(move |item| item.generation == self.generation)
            .map(|item| &item.ev)
    }
}
