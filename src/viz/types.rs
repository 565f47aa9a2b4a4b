use crate::arq::ArqConfig;
use serde::{Deserialize, Serialize};

/// 可视化事件类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VizEventKind {
    /// 运行配置（总是第一条事件）
    Meta { config: ArqConfig },
    /// 分组首次发出
    Send,
    /// 超时触发的重传
    Retransmit { transmissions: u32 },
    /// 分组在中点被丢弃
    PacketLost { position: f64 },
    /// 分组到达接收端
    PacketReceived,
    /// 接收端发出 ACK
    AckSend,
    /// ACK 在中点被丢弃
    AckLost { position: f64 },
    /// ACK 到达发送端；`duplicate` 表示该分组此前已被确认
    AckReceived { duplicate: bool },
    /// 超时到期
    Timeout,
    /// 窗口前移
    WindowAdvance { base: u64, end: u64 },
    /// 所有分组均已确认
    Complete,
}

/// 一个可回放的事件（JSON）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VizEvent {
    /// 虚拟时间（纳秒，和 `SimTime.0` 同口径）
    pub t_ns: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
    #[serde(flatten)]
    pub kind: VizEventKind,
}

/// 一个简单的事件收集器（存内存，仿真结束写 JSON 文件）
#[derive(Debug, Default)]
pub struct VizLogger {
    pub events: Vec<VizEvent>,
}

impl VizLogger {
    pub fn push(&mut self, ev: VizEvent) {
        self.events.push(ev);
    }

    pub fn count(&self, pred: impl Fn(&VizEventKind) -> bool) -> usize {
        self.events.iter().filter(|ev| pred(&ev.kind)).count()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.events)
    }
}
