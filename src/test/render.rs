use super::{drive, frame_at};
use crate::arq::{Ack, ArqConfig, ArqMachine, Packet, PacketStatus};
use crate::viz::{Renderer, TextRenderer};

#[test]
fn draws_one_line_per_packet_plus_header() {
    let m = ArqMachine::new(ArqConfig {
        total_packets: 4,
        window_size: 2,
        ..Default::default()
    })
    .expect("valid config");
    let out = TextRenderer::default().draw(&m.snapshot());
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines.len(), 5);
    assert!(lines[0].contains("base=0 window=[0, 2) acked=0/4"));
    assert!(lines[1].starts_with("*F0"));
    assert!(lines[2].starts_with("*F1"));
    assert!(lines[3].starts_with(" F2"));
    assert!(lines[1].ends_with("waiting"));
}

#[test]
fn lost_packet_is_drawn_at_midpoint_with_timeout_progress() {
    let mut m = ArqMachine::new(ArqConfig {
        total_packets: 1,
        window_size: 1,
        timeout_ms: 1000,
        transmission_speed: 40.0,
        lost_packets: [0].into_iter().collect(),
        ..Default::default()
    })
    .expect("valid config");
    m.start();
    // 第 5 帧越过中点被丢弃，超时尚未到期
    for k in 0..=5 {
        m.tick(frame_at(k));
    }
    let r = TextRenderer {
        width: 21,
        ..Default::default()
    };
    let out = r.draw(&m.snapshot());
    let line = out.lines().nth(1).expect("packet line");

    assert!(line.contains("S[..........x..........]R lost"), "{line}");
    assert!(line.contains("timeout=8%"), "{line}");
}

#[test]
fn ack_and_lost_ack_marks_share_the_lane() {
    let mut m = ArqMachine::new(ArqConfig {
        total_packets: 1,
        window_size: 1,
        ..Default::default()
    })
    .expect("valid config");
    m.start();
    let mut snap = m.snapshot();
    snap.packets[0] = Packet {
        status: PacketStatus::Received,
        position: 400.0,
        ..snap.packets[0].clone()
    };
    snap.acks.push(Ack {
        seq: 0,
        position: 400.0,
    });
    snap.lost_ack_marks.push(0);

    let r = TextRenderer {
        width: 5,
        ..Default::default()
    };
    let out = r.draw(&snap);
    let line = out.lines().nth(1).expect("packet line");
    assert!(line.contains("S[..#.<]R received"), "{line}");
}

#[test]
fn retransmitted_packets_are_flagged() {
    let mut m = ArqMachine::new(ArqConfig {
        total_packets: 1,
        window_size: 1,
        timeout_ms: 100,
        transmission_speed: 40.0,
        lost_packets: [0].into_iter().collect(),
        ..Default::default()
    })
    .expect("valid config");
    m.start();
    drive(&mut m, 10_000, |_| {}).expect("completes");
    let out = TextRenderer::default().draw(&m.snapshot());
    assert!(out.lines().nth(1).is_some_and(|l| l.starts_with(" F0r")));
    assert!(out.lines().next().is_some_and(|l| l.ends_with("[complete]")));
}

#[test]
fn tiny_width_does_not_panic() {
    let mut m = ArqMachine::new(ArqConfig::default()).expect("valid config");
    m.start();
    m.tick(frame_at(0));
    m.tick(frame_at(10));
    let mut r = TextRenderer {
        width: 0,
        ..Default::default()
    };
    r.render(&m.snapshot());
    assert_eq!(r.frames.len(), 1);
    assert!(r.frames[0].contains("S[>|.]R") || r.frames[0].contains("S[.|.]R"));
}
