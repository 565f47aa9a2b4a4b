//! 控制面
//!
//! 供 UI/渲染器调用的 configure/start/pause/resume/reset 接口，以及只读快照与一次性完成通知。

use super::config::{ArqConfig, ConfigError};
use super::machine::ArqMachine;
use super::snapshot::Snapshot;
use crate::sim::SimTime;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ArqError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("simulation has not been configured")]
    NotConfigured,
}

/// 完成回调：参数为完成时的虚拟时间
pub type CompletionCallback = Box<dyn FnMut(SimTime)>;

#[derive(Default)]
pub struct ArqSession {
    machine: Option<ArqMachine>,
    record_viz: bool,
    completion_pending: bool,
    on_complete: Option<CompletionCallback>,
}

impl ArqSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// 之后 configure 出的状态机都会记录可视化事件
    pub fn with_viz(mut self) -> Self {
        self.record_viz = true;
        self
    }

    pub fn set_on_complete(&mut self, cb: CompletionCallback) {
        self.on_complete = Some(cb);
    }

    /// 配置非法时返回错误，已有的状态机保持不变。
    pub fn configure(&mut self, cfg: ArqConfig) -> Result<(), ArqError> {
        let mut machine = ArqMachine::new(cfg)?;
        if self.record_viz {
            machine.enable_viz();
        }
        self.machine = Some(machine);
        self.completion_pending = false;
        info!("配置完成");
        Ok(())
    }

    fn machine_or_err(&mut self) -> Result<&mut ArqMachine, ArqError> {
        self.machine.as_mut().ok_or(ArqError::NotConfigured)
    }

    pub fn start(&mut self) -> Result<(), ArqError> {
        self.machine_or_err()?.start();
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), ArqError> {
        self.machine_or_err()?.pause();
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), ArqError> {
        self.machine_or_err()?.resume();
        Ok(())
    }

    /// 回到刚配置完、尚未开始的状态
    pub fn reset(&mut self) -> Result<(), ArqError> {
        self.machine_or_err()?.reset();
        self.completion_pending = false;
        Ok(())
    }

    /// 推进一次；若本次 tick 完成了整个传输，则触发回调并置位完成通知。
    pub fn tick(&mut self, now: SimTime) -> Result<(), ArqError> {
        let machine = self.machine.as_mut().ok_or(ArqError::NotConfigured)?;
        machine.tick(now);
        if machine.poll_completion() {
            let at = machine.now();
            self.completion_pending = true;
            if let Some(cb) = self.on_complete.as_mut() {
                cb(at);
            }
        }
        Ok(())
    }

    /// 完成通知：每轮运行只返回一次 true。
    pub fn poll_completion(&mut self) -> bool {
        std::mem::take(&mut self.completion_pending)
    }

    pub fn snapshot(&self) -> Result<Snapshot, ArqError> {
        self.machine
            .as_ref()
            .map(ArqMachine::snapshot)
            .ok_or(ArqError::NotConfigured)
    }

    pub fn is_complete(&self) -> bool {
        self.machine.as_ref().is_some_and(ArqMachine::is_complete)
    }

    pub fn machine(&self) -> Option<&ArqMachine> {
        self.machine.as_ref()
    }

    pub fn machine_mut(&mut self) -> Option<&mut ArqMachine> {
        self.machine.as_mut()
    }
}
