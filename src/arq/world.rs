//! 把 ARQ 会话接到 tick 驱动器上
//!
//! 每个节拍：推进会话 → 检查完成通知 → 按需把快照交给渲染器。

use super::session::ArqSession;
use crate::sim::{Simulator, World};
use crate::viz::{Renderer, TextRenderer};
use tracing::{info, warn};

pub struct ArqWorld<R: Renderer = TextRenderer> {
    pub session: ArqSession,
    pub renderer: Option<R>,
    /// 每隔多少个 tick 渲染一次（0 表示只在完成时渲染）
    pub render_every: u64,
    pub completions: u64,
}

impl<R: Renderer> ArqWorld<R> {
    pub fn new(session: ArqSession) -> Self {
        Self {
            session,
            renderer: None,
            render_every: 0,
            completions: 0,
        }
    }

    pub fn with_renderer(mut self, renderer: R, render_every: u64) -> Self {
        self.renderer = Some(renderer);
        self.render_every = render_every;
        self
    }
}

impl<R: Renderer> World for ArqWorld<R> {
    fn on_tick(&mut self, sim: &Simulator) {
        if let Err(e) = self.session.tick(sim.now()) {
            warn!(error = %e, "tick 失败");
            return;
        }

        let completed = self.session.poll_completion();
        if completed {
            self.completions += 1;
            info!(ticks = sim.ticks(), host_now = %sim.now(), "传输完成");
        }

        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        let due = self.render_every > 0 && sim.ticks() % self.render_every == 0;
        if due || completed {
            if let Ok(snap) = self.session.snapshot() {
                renderer.render(&snap);
            }
        }
    }

    fn is_finished(&self) -> bool {
        self.session.machine().is_none_or(|m| m.is_complete())
    }
}
