//! 世界 trait
//!
//! 定义仿真世界接口。

use super::simulator::Simulator;

/// 仿真世界：由业务层实现（例如 ARQ 状态机 + 渲染器）。
pub trait World {
    /// 每个刷新周期调用一次；`sim.now()` 为宿主时间。
    fn on_tick(&mut self, sim: &Simulator);

    /// 返回 true 时 tick 循环停止。
    fn is_finished(&self) -> bool {
        false
    }
}
