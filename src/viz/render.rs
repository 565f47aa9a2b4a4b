//! 渲染观察者
//!
//! 渲染器每个 tick 拿到一份只读快照；颜色、动画等展示细节全部留在渲染器一侧。

use crate::arq::{PacketStatus, Snapshot};
use std::fmt::Write;

pub trait Renderer {
    fn render(&mut self, snap: &Snapshot);
}

/// 纯文本渲染：每个分组一行，标出位置、窗口与超时进度。
#[derive(Debug)]
pub struct TextRenderer {
    /// 信道宽度（字符）
    pub width: usize,
    pub frames: Vec<String>,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            width: 40,
            frames: Vec::new(),
        }
    }
}

impl TextRenderer {
    fn column(width: usize, position: f64, channel_length: f64) -> usize {
        let ratio = (position / channel_length).clamp(0.0, 1.0);
        (ratio * (width - 1) as f64).round() as usize
    }

    pub fn draw(&self, snap: &Snapshot) -> String {
        let width = self.width.max(3);
        let mut out = String::new();
        let _ = writeln!(
            out,
            "t={} base={} window=[{}, {}) acked={}/{}{}{}",
            snap.now,
            snap.window.base,
            snap.window.base,
            snap.window.end(),
            snap.completed_packets,
            snap.packets.len(),
            if snap.paused { " [paused]" } else { "" },
            if snap.is_complete { " [complete]" } else { "" },
        );
        for p in &snap.packets {
            let mut lane = vec!['.'; width];
            lane[width / 2] = '|';
            match p.status {
                PacketStatus::InTransit | PacketStatus::Lost => {
                    let glyph = if p.status == PacketStatus::Lost { 'x' } else { '>' };
                    lane[Self::column(width, p.position, snap.channel_length)] = glyph;
                }
                _ => {}
            }
            for ack in snap.acks.iter().filter(|a| a.seq == p.seq) {
                lane[Self::column(width, ack.position, snap.channel_length)] = '<';
            }
            if snap.lost_ack_marks.contains(&p.seq) {
                lane[width / 2] = '#';
            }
            let lane: String = lane.into_iter().collect();
            let marker = if snap.window.contains(p.seq) { '*' } else { ' ' };
            let status = match p.status {
                PacketStatus::Waiting => "waiting",
                PacketStatus::InTransit => "in_transit",
                PacketStatus::Lost => "lost",
                PacketStatus::Received => "received",
                PacketStatus::Acked => "acked",
            };
            let _ = write!(
                out,
                "{marker}F{}{:<2} S[{lane}]R {status}",
                p.seq,
                if p.is_retransmitted() { "r" } else { "" },
            );
            if let Some(progress) = snap.timeout_progress(p.seq) {
                let _ = write!(out, " timeout={:.0}%", progress * 100.0);
            }
            out.push('\n');
        }
        out
    }
}

impl Renderer for TextRenderer {
    fn render(&mut self, snap: &Snapshot) {
        let frame = self.draw(snap);
        self.frames.push(frame);
    }
}
