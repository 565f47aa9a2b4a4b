use super::frame_at;
use crate::arq::{ArqConfig, ArqError, ArqSession, ArqWorld, ConfigError, Phase};
use crate::sim::{SimTime, Simulator};
use crate::viz::TextRenderer;
use std::cell::RefCell;
use std::rc::Rc;

fn fast_config() -> ArqConfig {
    ArqConfig {
        total_packets: 3,
        window_size: 2,
        transmission_speed: 40.0,
        ..Default::default()
    }
}

fn run_to_completion(s: &mut ArqSession, from_frame: u64) -> Option<u64> {
    for k in from_frame..from_frame + 10_000 {
        s.tick(frame_at(k)).expect("configured");
        if s.is_complete() {
            return Some(k);
        }
    }
    None
}

#[test]
fn operations_before_configure_are_rejected() {
    let mut s = ArqSession::new();
    assert!(matches!(s.start(), Err(ArqError::NotConfigured)));
    assert!(matches!(s.tick(SimTime::ZERO), Err(ArqError::NotConfigured)));
    assert!(matches!(s.snapshot(), Err(ArqError::NotConfigured)));
    assert!(matches!(s.reset(), Err(ArqError::NotConfigured)));
    assert!(!s.is_complete());
}

#[test]
fn invalid_configure_creates_no_state() {
    let mut s = ArqSession::new();
    let err = s
        .configure(ArqConfig {
            total_packets: 0,
            ..Default::default()
        })
        .expect_err("zero packets rejected");
    assert!(matches!(err, ArqError::Config(ConfigError::ZeroPackets)));
    assert!(s.machine().is_none());
    assert_eq!(
        err.to_string(),
        "invalid configuration: total packets must be greater than 0"
    );
}

#[test]
fn invalid_reconfigure_keeps_previous_machine() {
    let mut s = ArqSession::new();
    s.configure(fast_config()).expect("valid");
    s.start().expect("configured");
    s.tick(frame_at(0)).expect("configured");
    s.tick(frame_at(3)).expect("configured");

    let err = s
        .configure(ArqConfig {
            transmission_speed: f64::NAN,
            ..Default::default()
        })
        .expect_err("nan speed rejected");
    assert!(matches!(err, ArqError::Config(ConfigError::InvalidSpeed(_))));
    let m = s.machine().expect("machine kept");
    assert_eq!(m.phase(), Phase::Running);
    assert_eq!(m.config().total_packets, 3);
}

#[test]
fn completion_callback_and_poll_fire_once() {
    let fired = Rc::new(RefCell::new(Vec::new()));
    let mut s = ArqSession::new();
    let sink = Rc::clone(&fired);
    s.set_on_complete(Box::new(move |at: SimTime| sink.borrow_mut().push(at)));
    s.configure(fast_config()).expect("valid");
    s.start().expect("configured");

    let done = run_to_completion(&mut s, 0).expect("completes");
    for k in done + 1..done + 50 {
        s.tick(frame_at(k)).expect("configured");
    }

    assert!(s.poll_completion());
    assert!(!s.poll_completion());
    let fired = fired.borrow();
    assert_eq!(fired.len(), 1);
    let snap = s.snapshot().expect("configured");
    assert_eq!(Some(fired[0]), snap.stats.completed_at);
}

#[test]
fn reset_allows_a_second_completion() {
    let count = Rc::new(RefCell::new(0u32));
    let mut s = ArqSession::new();
    let sink = Rc::clone(&count);
    s.set_on_complete(Box::new(move |_: SimTime| *sink.borrow_mut() += 1));
    s.configure(fast_config()).expect("valid");

    s.start().expect("configured");
    run_to_completion(&mut s, 0).expect("first run completes");
    assert!(s.poll_completion());

    s.reset().expect("configured");
    let snap = s.snapshot().expect("configured");
    assert!(!snap.started);
    assert!(!snap.is_complete);
    assert_eq!(snap.completed_packets, 0);
    assert!(!s.poll_completion());

    s.start().expect("configured");
    run_to_completion(&mut s, 0).expect("second run completes");
    assert!(s.poll_completion());
    assert_eq!(*count.borrow(), 2);
}

#[test]
fn snapshot_is_detached_from_machine() {
    let mut s = ArqSession::new();
    s.configure(fast_config()).expect("valid");
    s.start().expect("configured");

    let mut snap = s.snapshot().expect("configured");
    snap.packets.clear();
    snap.window.base = 99;
    let fresh = s.snapshot().expect("configured");
    assert_eq!(fresh.packets.len(), 3);
    assert_eq!(fresh.window.base, 0);
    assert!(fresh.started);
    assert!(fresh.packet(0).is_some_and(|p| p.transmissions == 1));
}

#[test]
fn pause_and_resume_through_session() {
    let mut s = ArqSession::new();
    s.configure(fast_config()).expect("valid");
    s.start().expect("configured");
    s.tick(frame_at(0)).expect("configured");
    s.tick(frame_at(2)).expect("configured");

    s.pause().expect("configured");
    let frozen = s.snapshot().expect("configured");
    assert!(frozen.paused);
    s.tick(frame_at(100)).expect("configured");
    assert_eq!(s.snapshot().expect("configured").now, frozen.now);

    s.resume().expect("configured");
    s.tick(frame_at(101)).expect("configured");
    let snap = s.snapshot().expect("configured");
    assert!(!snap.paused);
    assert!(snap.now > frozen.now);
}

#[test]
fn world_runs_session_to_completion_under_simulator() {
    let mut session = ArqSession::new();
    session.configure(fast_config()).expect("valid");
    session.start().expect("configured");

    let mut w = ArqWorld::new(session).with_renderer(TextRenderer::default(), 10);
    let mut sim = Simulator::default();
    assert!(sim.run(&mut w, 10_000));

    assert_eq!(w.completions, 1);
    assert!(w.session.is_complete());
    let frames = &w.renderer.as_ref().expect("renderer").frames;
    assert!(frames.len() >= 2);
    assert!(frames.last().is_some_and(|f| f.contains("[complete]")));
}

#[test]
fn world_without_machine_is_finished() {
    let mut w: ArqWorld = ArqWorld::new(ArqSession::new());
    let mut sim = Simulator::default();
    assert!(sim.run(&mut w, 10));
    assert_eq!(sim.ticks(), 0);
}
