//! ARQ 配置
//!
//! 一次运行开始时读取，运行期间不可变。

use crate::sim::SimTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// 配置错误：在 `configure()`/`start()` 时返回给调用方，不会创建任何部分状态。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("window size must be greater than 0")]
    ZeroWindow,
    #[error("total packets must be greater than 0")]
    ZeroPackets,
    #[error("timeout duration must be greater than 0 ms")]
    ZeroTimeout,
    #[error("transmission speed must be a positive finite number, got {0}")]
    InvalidSpeed(f64),
    #[error("channel length must be a positive finite number, got {0}")]
    InvalidChannelLength(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArqConfig {
    /// 发送窗口容量
    pub window_size: u64,
    /// 要发送的分组总数 N（序号 0..N-1）
    pub total_packets: u64,
    /// 超时时长（毫秒）
    pub timeout_ms: u64,
    /// 在信道中点被丢弃的分组序号
    pub lost_packets: BTreeSet<u64>,
    /// 在信道中点被丢弃的 ACK 序号
    pub lost_acks: BTreeSet<u64>,
    /// 每个 60Hz 帧前进的信道单位数
    pub transmission_speed: f64,
    /// 发送端到接收端的信道长度
    pub channel_length: f64,
    /// 错峰发送：窗口内每个偏移量对应的延迟（毫秒）
    pub release_gap_ms: u64,
    /// 接收端生成 ACK 的处理延迟（毫秒）
    pub ack_delay_ms: u64,
}

impl Default for ArqConfig {
    fn default() -> Self {
        Self {
            window_size: 5,
            total_packets: 10,
            timeout_ms: 3000,
            lost_packets: BTreeSet::new(),
            lost_acks: BTreeSet::new(),
            transmission_speed: 3.0,
            channel_length: 400.0,
            release_gap_ms: 200,
            ack_delay_ms: 200,
        }
    }
}

impl ArqConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if self.total_packets == 0 {
            return Err(ConfigError::ZeroPackets);
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if !self.transmission_speed.is_finite() || self.transmission_speed <= 0.0 {
            return Err(ConfigError::InvalidSpeed(self.transmission_speed));
        }
        if !self.channel_length.is_finite() || self.channel_length <= 0.0 {
            return Err(ConfigError::InvalidChannelLength(self.channel_length));
        }
        Ok(())
    }

    pub fn timeout(&self) -> SimTime {
        SimTime::from_millis(self.timeout_ms)
    }

    pub fn release_gap(&self) -> SimTime {
        SimTime::from_millis(self.release_gap_ms)
    }

    pub fn ack_delay(&self) -> SimTime {
        SimTime::from_millis(self.ack_delay_ms)
    }

    /// 丢包判定点
    pub fn midpoint(&self) -> f64 {
        self.channel_length / 2.0
    }
}
