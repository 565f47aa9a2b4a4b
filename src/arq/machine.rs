//! ARQ 滑动窗口状态机
//!
//! 拥有分组表、发送窗口、超时表与 ACK 记账；每次 `tick` 按以下顺序推进：
//! 1. 触发到期的延迟动作（错峰释放分组、生成 ACK）
//! 2. 处理到期超时（同步重传）
//! 3. 移动在途分组（中点丢弃 / 到达接收端）
//! 4. 移动在途 ACK（中点丢弃 / 到达发送端 → 确认、滑动窗口）
//!
//! 所有延迟动作都登记在带 generation 的 [`TimerQueue`] 中，`reset`/`start`
//! 之后旧动作在出队时被丢弃。

use std::collections::BTreeSet;

use tracing::{debug, info, trace};

use super::config::{ArqConfig, ConfigError};
use super::loss::LossOracle;
use super::packet::{Ack, Packet, PacketStatus};
use super::snapshot::{Snapshot, TimeoutView};
use super::stats::ArqStats;
use super::timeout::TimeoutTable;
use super::window::Window;
use crate::sim::{FRAME, SimTime, TimerQueue, VirtualClock};
use crate::viz::{VizEvent, VizEventKind, VizLogger};

/// 延迟动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    /// 错峰释放窗口内的分组
    Release { seq: u64 },
    /// 接收端处理完毕，生成 ACK
    CreateAck { seq: u64 },
}

/// 运行阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// 已配置，尚未 start
    Idle,
    Running,
    /// 所有分组均已确认；之后的 tick 不再改变任何状态
    Completed,
}

#[derive(Debug)]
pub struct ArqMachine {
    cfg: ArqConfig,
    packets: Vec<Packet>,
    acks: Vec<Ack>,
    window: Window,
    oracle: LossOracle,
    timeouts: TimeoutTable,
    deferred: TimerQueue<Deferred>,
    pending_release: BTreeSet<u64>,
    pending_acks: BTreeSet<u64>,
    received_acks: BTreeSet<u64>,
    lost_packet_marks: BTreeSet<u64>,
    lost_ack_marks: BTreeSet<u64>,
    last_ack: Option<u64>,
    completed: u64,
    clock: VirtualClock,
    phase: Phase,
    completion_signal: bool,
    stats: ArqStats,
    pub viz: Option<VizLogger>,
}

impl ArqMachine {
    /// 校验配置并构建 N 个 Waiting 分组，`base = 0`。
    pub fn new(cfg: ArqConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let mut m = Self {
            packets: Vec::new(),
            acks: Vec::new(),
            window: Window::new(cfg.window_size),
            oracle: LossOracle::default(),
            timeouts: TimeoutTable::default(),
            deferred: TimerQueue::default(),
            pending_release: BTreeSet::new(),
            pending_acks: BTreeSet::new(),
            received_acks: BTreeSet::new(),
            lost_packet_marks: BTreeSet::new(),
            lost_ack_marks: BTreeSet::new(),
            last_ack: None,
            completed: 0,
            clock: VirtualClock::default(),
            phase: Phase::Idle,
            completion_signal: false,
            stats: ArqStats::default(),
            viz: None,
            cfg,
        };
        m.rebuild();
        Ok(m)
    }

    /// 用新配置重新初始化；配置非法时保持原状态不变。
    pub fn initialize(&mut self, cfg: ArqConfig) -> Result<(), ConfigError> {
        cfg.validate()?;
        self.cfg = cfg;
        self.rebuild();
        Ok(())
    }

    fn rebuild(&mut self) {
        let total = self.cfg.total_packets;
        self.packets = (0..total).map(Packet::new).collect();
        self.acks.clear();
        self.window = Window::new(self.cfg.window_size);
        self.oracle = LossOracle::new(
            self.cfg.midpoint(),
            total,
            &self.cfg.lost_packets,
            &self.cfg.lost_acks,
        );
        self.timeouts.clear();
        self.deferred.bump_generation();
        self.pending_release.clear();
        self.pending_acks.clear();
        self.received_acks.clear();
        self.lost_packet_marks.clear();
        self.lost_ack_marks.clear();
        self.last_ack = None;
        self.completed = 0;
        self.clock = VirtualClock::default();
        self.phase = Phase::Idle;
        self.completion_signal = false;
        self.stats = ArqStats::default();
        if self.viz.is_some() {
            self.viz = Some(VizLogger::default());
            self.emit_viz_meta();
        }
        debug!(
            total_packets = total,
            window_size = self.cfg.window_size,
            generation = self.deferred.generation(),
            "状态机已初始化"
        );
    }

    /// 开启事件记录，并写入 meta 事件
    pub fn enable_viz(&mut self) {
        self.viz = Some(VizLogger::default());
        self.emit_viz_meta();
    }

    pub fn emit_viz_meta(&mut self) {
        let config = self.cfg.clone();
        self.viz_event(None, VizEventKind::Meta { config });
    }

    fn viz_event(&mut self, seq: Option<u64>, kind: VizEventKind) {
        if let Some(v) = self.viz.as_mut() {
            v.push(VizEvent {
                t_ns: self.clock.now().0,
                seq,
                kind,
            });
        }
    }

    /// 开始运行并释放初始窗口；重复调用无效果。
    pub fn start(&mut self) {
        if self.phase != Phase::Idle {
            debug!(phase = ?self.phase, "start 被忽略");
            return;
        }
        self.deferred.bump_generation();
        self.phase = Phase::Running;
        info!(
            total_packets = self.cfg.total_packets,
            window_size = self.cfg.window_size,
            timeout_ms = self.cfg.timeout_ms,
            "▶️  ARQ 开始发送"
        );
        self.send_eligible_packets();
    }

    pub fn pause(&mut self) {
        self.clock.pause();
        debug!(now = %self.clock.now(), "暂停");
    }

    pub fn resume(&mut self) {
        self.clock.resume();
        debug!(now = %self.clock.now(), "恢复");
    }

    /// 回到最近一次配置刚初始化完毕、尚未 start 的状态。
    pub fn reset(&mut self) {
        self.rebuild();
        info!("🔄 已重置");
    }

    /// 窗口内所有 Waiting 分组按与 `base` 的偏移错峰释放；偏移为 0 的分组立即发出。
    pub fn send_eligible_packets(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        let now = self.clock.now();
        let base = self.window.base;
        for seq in self.window.range(self.cfg.total_packets) {
            if self.packets[seq as usize].status != PacketStatus::Waiting
                || self.pending_release.contains(&seq)
            {
                continue;
            }
            let delay = self.cfg.release_gap().saturating_mul(seq - base);
            if delay == SimTime::ZERO {
                self.transmit(seq, now, false);
            } else {
                self.pending_release.insert(seq);
                self.deferred
                    .schedule(now.saturating_add(delay), Deferred::Release { seq });
                trace!(seq, release_at = %now.saturating_add(delay), "分组等待错峰释放");
            }
        }
    }

    /// 按宿主时间推进一步。暂停、未开始或已完成时不改变协议状态；
    /// 同一个 `now` 重复调用不会重复推进。
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn tick(&mut self, now: SimTime) {
        let delta = self.clock.advance(now);
        if self.phase != Phase::Running || delta == SimTime::ZERO {
            return;
        }
        let vnow = self.clock.now();

        self.fire_deferred(vnow);
        self.expire_timeouts(vnow);

        let distance = self.cfg.transmission_speed * (delta.0 as f64 / FRAME.0 as f64);
        self.move_packets(vnow, distance);
        self.move_acks(vnow, distance);

        #[cfg(debug_assertions)]
        self.check_invariants();
    }

    fn fire_deferred(&mut self, now: SimTime) {
        while let Some((at, ev)) = self.deferred.pop_due(now) {
            trace!(at = %at, ?ev, "触发延迟动作");
            match ev {
                Deferred::Release { seq } => {
                    self.pending_release.remove(&seq);
                    if self.packets[seq as usize].status == PacketStatus::Waiting {
                        self.transmit(seq, at, false);
                    }
                }
                Deferred::CreateAck { seq } => self.create_ack(seq),
            }
        }
    }

    /// 分组进入 InTransit；若仍可能丢失则启动超时。
    fn transmit(&mut self, seq: u64, now: SimTime, retransmission: bool) {
        let p = &mut self.packets[seq as usize];
        debug_assert_eq!(p.status, PacketStatus::Waiting);
        p.status = PacketStatus::InTransit;
        p.position = 0.0;
        p.transmissions = p.transmissions.saturating_add(1);
        let transmissions = p.transmissions;

        self.stats.transmissions += 1;
        if retransmission {
            self.stats.retransmissions += 1;
        }

        let armed = self.oracle.is_loss_prone(seq);
        if armed {
            self.timeouts.arm(seq, now, self.cfg.timeout());
        }
        debug!(seq, transmissions, armed, "分组发出");

        let kind = if retransmission {
            VizEventKind::Retransmit { transmissions }
        } else {
            VizEventKind::Send
        };
        self.viz_event(Some(seq), kind);
    }

    fn expire_timeouts(&mut self, now: SimTime) {
        for seq in self.timeouts.expire(now) {
            self.stats.timeouts_fired += 1;
            self.viz_event(Some(seq), VizEventKind::Timeout);
            self.retransmit(seq, now);
        }
    }

    /// 超时重传：无论当前是 Lost 还是 InTransit，都回到发送端重新发出。
    fn retransmit(&mut self, seq: u64, now: SimTime) {
        let p = &mut self.packets[seq as usize];
        if p.status == PacketStatus::Acked {
            return;
        }
        debug!(seq, from = ?p.status, "⏰ 超时，分组回到 Waiting");
        p.status = PacketStatus::Waiting;
        p.position = 0.0;

        self.lost_packet_marks.remove(&seq);
        self.lost_ack_marks.remove(&seq);

        // 尚未发生的分组丢弃不再生效；ACK 丢弃只在注定被丢的 ACK 已经生成或排队时保留
        self.oracle.retire_packet(seq);
        let ack_outstanding =
            self.pending_acks.contains(&seq) || self.acks.iter().any(|a| a.seq == seq);
        if !ack_outstanding {
            self.oracle.retire_ack(seq);
        }

        self.transmit(seq, now, true);
    }

    fn move_packets(&mut self, now: SimTime, distance: f64) {
        let mid = self.oracle.midpoint();
        let end = self.cfg.channel_length;
        for idx in 0..self.packets.len() {
            let p = &self.packets[idx];
            if p.status != PacketStatus::InTransit {
                continue;
            }
            let seq = p.seq;
            let old = p.position;
            let new = (old + distance).min(end);

            if old < mid && new >= mid && self.oracle.should_lose_packet(seq, new) {
                let p = &mut self.packets[idx];
                p.status = PacketStatus::Lost;
                p.position = mid;
                self.oracle.record_packet_drop(seq);
                self.lost_packet_marks.insert(seq);
                self.stats.packets_lost += 1;
                debug!(seq, "❌ 分组在中点丢失");
                self.viz_event(Some(seq), VizEventKind::PacketLost { position: mid });
                continue;
            }

            self.packets[idx].position = new;
            if new >= end {
                self.on_packet_arrival(seq, now);
            }
        }
    }

    fn on_packet_arrival(&mut self, seq: u64, now: SimTime) {
        self.packets[seq as usize].status = PacketStatus::Received;
        debug!(seq, "分组到达接收端");
        self.viz_event(Some(seq), VizEventKind::PacketReceived);

        if self.pending_acks.contains(&seq) || self.acks.iter().any(|a| a.seq == seq) {
            trace!(seq, "ACK 已存在，不重复生成");
            return;
        }
        self.pending_acks.insert(seq);
        self.deferred
            .schedule(now.saturating_add(self.cfg.ack_delay()), Deferred::CreateAck { seq });
    }

    fn create_ack(&mut self, seq: u64) {
        self.pending_acks.remove(&seq);
        if self.packets[seq as usize].status.is_acked() || self.acks.iter().any(|a| a.seq == seq)
        {
            return;
        }
        self.acks.push(Ack {
            seq,
            position: self.cfg.channel_length,
        });
        self.stats.acks_sent += 1;
        debug!(seq, "接收端发出 ACK");
        self.viz_event(Some(seq), VizEventKind::AckSend);
    }

    fn move_acks(&mut self, now: SimTime, distance: f64) {
        let mid = self.oracle.midpoint();
        let mut idx = 0;
        while idx < self.acks.len() {
            let Ack { seq, position: old } = self.acks[idx];
            let new = (old - distance).max(0.0);

            if old > mid && new <= mid && self.oracle.should_lose_ack(seq, new) {
                self.acks.remove(idx);
                self.oracle.record_ack_drop(seq);
                self.lost_ack_marks.insert(seq);
                self.stats.acks_lost += 1;
                debug!(seq, "❌ ACK 在中点丢失");
                self.viz_event(Some(seq), VizEventKind::AckLost { position: mid });
                continue;
            }

            if new <= 0.0 {
                self.acks.remove(idx);
                self.on_ack_arrival(seq, now);
                if self.phase == Phase::Completed {
                    return;
                }
                continue;
            }

            self.acks[idx].position = new;
            idx += 1;
        }
    }

    fn on_ack_arrival(&mut self, seq: u64, now: SimTime) {
        self.stats.acks_delivered += 1;
        self.last_ack = Some(seq);

        let p = &mut self.packets[seq as usize];
        if p.status.is_acked() {
            trace!(seq, "重复 ACK，忽略");
            self.viz_event(Some(seq), VizEventKind::AckReceived { duplicate: true });
            return;
        }
        p.status = PacketStatus::Acked;
        self.timeouts.cancel(seq);
        self.received_acks.insert(seq);
        self.completed += 1;
        debug!(seq, completed = self.completed, "✅ 收到 ACK");
        self.viz_event(Some(seq), VizEventKind::AckReceived { duplicate: false });

        if self.received_acks.len() as u64 == self.cfg.total_packets {
            self.complete(now);
            return;
        }
        self.advance_window();
    }

    /// 越过连续已确认前缀；窗口前移后发送新进入窗口的分组。
    fn advance_window(&mut self) {
        let moved = self.window.advance(&self.packets);
        if moved == 0 {
            return;
        }
        let (base, end) = (self.window.base, self.window.end());
        debug!(base, end, moved, "窗口前移");
        self.viz_event(None, VizEventKind::WindowAdvance { base, end });
        self.send_eligible_packets();
    }

    fn complete(&mut self, now: SimTime) {
        debug_assert_eq!(self.completed, self.cfg.total_packets);
        self.phase = Phase::Completed;
        self.window.base = self.cfg.total_packets;
        self.acks.clear();
        self.pending_acks.clear();
        self.pending_release.clear();
        self.timeouts.clear();
        self.deferred.bump_generation();
        self.completion_signal = true;
        self.stats.completed_at = Some(now);
        info!(
            completed_at = %now,
            retransmissions = self.stats.retransmissions,
            packets_lost = self.stats.packets_lost,
            acks_lost = self.stats.acks_lost,
            "🎉 所有分组均已确认"
        );
        self.viz_event(None, VizEventKind::Complete);
    }

    #[cfg(debug_assertions)]
    fn check_invariants(&self) {
        let mut live = BTreeSet::new();
        for ack in &self.acks {
            debug_assert!(live.insert(ack.seq), "duplicate live ACK for seq {}", ack.seq);
        }
        debug_assert!(self.window.base <= self.cfg.total_packets);
        debug_assert!(
            self.packets[..self.window.base as usize]
                .iter()
                .all(|p| p.status.is_acked()),
            "unacked packet below window base"
        );
        let acked = self.packets.iter().filter(|p| p.status.is_acked()).count() as u64;
        debug_assert_eq!(acked, self.completed);
    }

    /// 完成信号：每轮运行只返回一次 true。
    pub fn poll_completion(&mut self) -> bool {
        std::mem::take(&mut self.completion_signal)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            now: self.clock.now(),
            channel_length: self.cfg.channel_length,
            packets: self.packets.clone(),
            acks: self.acks.clone(),
            window: self.window,
            timeouts: self
                .timeouts
                .iter()
                .map(|(seq, rec)| TimeoutView {
                    seq,
                    progress: rec.progress,
                })
                .collect(),
            lost_packet_marks: self.lost_packet_marks.iter().copied().collect(),
            lost_ack_marks: self.lost_ack_marks.iter().copied().collect(),
            last_ack: self.last_ack,
            completed_packets: self.completed,
            started: self.phase != Phase::Idle,
            paused: self.clock.is_paused(),
            is_complete: self.is_complete(),
            stats: self.stats.clone(),
        }
    }

    pub fn config(&self) -> &ArqConfig {
        &self.cfg
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Completed
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    /// 当前虚拟时间
    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    pub fn base(&self) -> u64 {
        self.window.base
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    pub fn packet(&self, seq: u64) -> Option<&Packet> {
        self.packets.get(seq as usize)
    }

    pub fn acks(&self) -> &[Ack] {
        &self.acks
    }

    pub fn completed_packets(&self) -> u64 {
        self.completed
    }

    pub fn received_ack_seqs(&self) -> &BTreeSet<u64> {
        &self.received_acks
    }

    pub fn timeouts(&self) -> &TimeoutTable {
        &self.timeouts
    }

    pub fn stats(&self) -> &ArqStats {
        &self.stats
    }

    /// 尚未触发的延迟动作数（错峰释放 + ACK 生成）
    pub fn pending_events(&self) -> usize {
        self.deferred.live_len()
    }
}
