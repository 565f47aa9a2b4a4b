//! 可视化事件记录与渲染观察者
//!
//! 设计目标：
//! - **结构化**：用 JSON 事件而不是解析文本日志
//! - **只读**：渲染器只观察快照，不驱动协议逻辑
//! - **可回放**：按时间轴重放分组/ACK 的每一次状态转换

mod render;
mod types;

pub use render::{Renderer, TextRenderer};
pub use types::{VizEvent, VizEventKind, VizLogger};
