//! 仿真核心模块
//!
//! 此模块包含 tick 驱动仿真的基础组件：仿真时间、虚拟时钟、延迟动作队列、世界和仿真器。

// 子模块声明
mod clock;
mod scheduled_event;
mod simulator;
mod time;
mod timer_queue;
mod world;

// 重新导出公共接口
pub use clock::VirtualClock;
pub use scheduled_event::ScheduledEvent;
pub use simulator::{FRAME, Simulator};
pub use time::SimTime;
pub use timer_queue::TimerQueue;
pub use world::World;
