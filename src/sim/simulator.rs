//! 仿真器
//!
//! 固定节拍的 tick 驱动器：扮演渲染器刷新循环的角色，按固定间隔推进宿主时间并回调世界。

use super::time::SimTime;
use super::world::World;
use tracing::{debug, info};

/// 60Hz 刷新周期（约 16.667ms）
pub const FRAME: SimTime = SimTime(16_666_667);

/// 固定节拍仿真器：维护宿主时间与已执行的 tick 数。
#[derive(Debug, Clone)]
pub struct Simulator {
    now: SimTime,
    tick: SimTime,
    ticks: u64,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(FRAME)
    }
}

impl Simulator {
    pub fn new(tick: SimTime) -> Self {
        Self {
            now: SimTime::ZERO,
            tick: tick.max(SimTime(1)),
            ticks: 0,
        }
    }

    /// 获取当前宿主时间
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn tick_interval(&self) -> SimTime {
        self.tick
    }

    /// 已执行的 tick 数
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// 以当前时间回调一次世界，然后把时间推进一个节拍。
    pub fn step(&mut self, world: &mut dyn World) {
        world.on_tick(self);
        self.ticks = self.ticks.saturating_add(1);
        self.now = self.now.saturating_add(self.tick);
    }

    /// 运行直到世界结束或到达 `until`；返回世界是否已结束。
    pub fn run_until(&mut self, until: SimTime, world: &mut dyn World) -> bool {
        while self.now <= until {
            if world.is_finished() {
                break;
            }
            self.step(world);
        }
        world.is_finished()
    }

    /// 运行直到世界结束，最多 `max_ticks` 个节拍。
    #[tracing::instrument(skip(self, world))]
    pub fn run(&mut self, world: &mut dyn World, max_ticks: u64) -> bool {
        info!("▶️  开始运行仿真");
        debug!(now = ?self.now, tick = ?self.tick, "初始状态");

        let start = self.ticks;
        while !world.is_finished() && self.ticks - start < max_ticks {
            self.step(world);
        }

        let finished = world.is_finished();
        info!(
            total_ticks = self.ticks - start,
            final_time = %self.now,
            finished,
            "✅ 仿真结束"
        );
        finished
    }
}
