use crate::arq::{Packet, PacketStatus, Window};

fn packets(statuses: &[PacketStatus]) -> Vec<Packet> {
    statuses
        .iter()
        .enumerate()
        .map(|(i, &status)| Packet {
            status,
            ..Packet::new(i as u64)
        })
        .collect()
}

#[test]
fn window_range_is_half_open_and_truncated() {
    let mut w = Window::new(3);
    assert_eq!(w.range(10), 0..3);
    assert!(w.contains(2));
    assert!(!w.contains(3));

    w.base = 8;
    assert_eq!(w.end(), 11);
    assert_eq!(w.range(10), 8..10);
}

#[test]
fn advance_cascades_over_contiguous_acked_prefix() {
    use PacketStatus::*;
    let ps = packets(&[Acked, Acked, Acked, InTransit, Acked]);
    let mut w = Window::new(2);

    assert_eq!(w.advance(&ps), 3);
    assert_eq!(w.base, 3);
}

#[test]
fn advance_stops_at_gap() {
    use PacketStatus::*;
    let ps = packets(&[Received, Acked, Acked]);
    let mut w = Window::new(3);

    assert_eq!(w.advance(&ps), 0);
    assert_eq!(w.base, 0);
}

#[test]
fn advance_runs_off_the_end_when_all_acked() {
    use PacketStatus::*;
    let ps = packets(&[Acked, Acked]);
    let mut w = Window::new(5);

    assert_eq!(w.advance(&ps), 2);
    assert_eq!(w.base, 2);
    assert_eq!(w.range(2), 2..2);
}
