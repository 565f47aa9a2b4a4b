//! ARQ 滑动窗口协议核心
//!
//! 发送端在有界窗口内向接收端发送编号分组，信道按配置在中点丢弃分组或 ACK，
//! 发送端依靠逐分组超时重传保证所有分组最终被确认。渲染只通过快照观察这里的状态。

mod config;
mod loss;
mod machine;
mod packet;
mod session;
mod snapshot;
mod stats;
mod timeout;
mod window;
mod world;

pub use config::{ArqConfig, ConfigError};
pub use loss::LossOracle;
pub use machine::{ArqMachine, Phase};
pub use packet::{Ack, Packet, PacketStatus};
pub use session::{ArqError, ArqSession, CompletionCallback};
pub use snapshot::{Snapshot, TimeoutView};
pub use stats::ArqStats;
pub use timeout::{TimeoutRecord, TimeoutTable};
pub use window::Window;
pub use world::ArqWorld;
