use crate::sim::{SimTime, VirtualClock};

#[test]
fn first_advance_only_anchors() {
    let mut clock = VirtualClock::default();
    assert_eq!(clock.advance(SimTime::from_millis(500)), SimTime::ZERO);
    assert_eq!(clock.now(), SimTime::ZERO);

    assert_eq!(clock.advance(SimTime::from_millis(510)), SimTime::from_millis(10));
    assert_eq!(clock.now(), SimTime::from_millis(10));
}

#[test]
fn repeated_host_time_yields_zero_delta() {
    let mut clock = VirtualClock::default();
    clock.advance(SimTime::ZERO);
    clock.advance(SimTime::from_millis(16));
    assert_eq!(clock.advance(SimTime::from_millis(16)), SimTime::ZERO);
    assert_eq!(clock.now(), SimTime::from_millis(16));
}

#[test]
fn paused_interval_is_excluded() {
    let mut clock = VirtualClock::default();
    clock.advance(SimTime::ZERO);
    clock.advance(SimTime::from_millis(100));

    clock.pause();
    assert_eq!(clock.advance(SimTime::from_millis(150)), SimTime::ZERO);
    assert_eq!(clock.advance(SimTime::from_millis(900)), SimTime::ZERO);
    assert_eq!(clock.now(), SimTime::from_millis(100));

    clock.resume();
    assert_eq!(clock.advance(SimTime::from_millis(920)), SimTime::from_millis(20));
    assert_eq!(clock.now(), SimTime::from_millis(120));
}

#[test]
fn host_time_going_backwards_does_not_rewind() {
    let mut clock = VirtualClock::default();
    clock.advance(SimTime::from_millis(100));
    clock.advance(SimTime::from_millis(200));
    assert_eq!(clock.advance(SimTime::from_millis(50)), SimTime::ZERO);
    assert_eq!(clock.advance(SimTime::from_millis(210)), SimTime::from_millis(10));
    assert_eq!(clock.now(), SimTime::from_millis(110));
}
