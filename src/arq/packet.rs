//! 分组与 ACK
//!
//! 分组在初始化时按序号创建，之后只由状态机修改，直到仿真结束都不会销毁；
//! ACK 在分组被接收后生成，到达发送端或在中点被丢弃时删除。

use serde::{Deserialize, Serialize};

/// 分组状态
///
/// ```text
/// Waiting --(窗口内且被释放)--> InTransit
/// InTransit --(越过中点且需丢弃)--> Lost
/// InTransit --(到达接收端)--> Received
/// Received --(ACK 到达发送端)--> Acked
/// Lost --(超时)--> Waiting --> InTransit   [重传]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketStatus {
    Waiting,
    InTransit,
    Lost,
    Received,
    Acked,
}

impl PacketStatus {
    pub fn is_acked(self) -> bool {
        matches!(self, PacketStatus::Acked)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    pub seq: u64,
    pub status: PacketStatus,
    /// 沿 发送端(0) → 接收端(channel_length) 轴的位置；仅在 InTransit 时有意义
    pub position: f64,
    /// 已发送次数（含首次发送）
    pub transmissions: u32,
}

impl Packet {
    pub fn new(seq: u64) -> Self {
        Self {
            seq,
            status: PacketStatus::Waiting,
            position: 0.0,
            transmissions: 0,
        }
    }

    pub fn is_retransmitted(&self) -> bool {
        self.transmissions > 1
    }
}

/// 在途 ACK：从接收端(channel_length) 向发送端(0) 移动。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    pub seq: u64,
    pub position: f64,
}
