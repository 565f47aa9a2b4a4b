//! 虚拟时钟
//!
//! 宿主每次 tick 传入自己的单调时间；虚拟时钟只累计未暂停期间流逝的时间。
//! 同一个 `now` 连续传入两次，第二次的增量为零。

use super::time::SimTime;

#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    last_host: Option<SimTime>,
    now: SimTime,
    paused: bool,
}

impl VirtualClock {
    /// 当前虚拟时间
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// 用宿主时间推进虚拟时钟，返回本次推进量。
    ///
    /// 第一次调用只记录锚点；暂停期间只移动锚点，不推进虚拟时间。
    /// 宿主时间回退时增量按零处理。
    pub fn advance(&mut self, host_now: SimTime) -> SimTime {
        let delta = match self.last_host {
            Some(last) if !self.paused => host_now.saturating_sub(last),
            _ => SimTime::ZERO,
        };
        self.last_host = Some(match self.last_host {
            Some(last) => last.max(host_now),
            None => host_now,
        });
        self.now = self.now.saturating_add(delta);
        delta
    }
}
