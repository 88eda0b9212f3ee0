use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use sdwebdav::bus::{BusArbiter, BusLines, PassiveLines};
use sdwebdav::error::DavError;

const WINDOW: Duration = Duration::from_secs(20);

/// Lines that can be observed after being boxed into the arbiter.
#[derive(Clone, Default)]
struct ProbeLines {
    driven: Arc<AtomicBool>,
    takes: Arc<AtomicUsize>,
}

impl BusLines for ProbeLines {
    fn drive(&mut self) {
        self.driven.store(true, Ordering::SeqCst);
        self.takes.fetch_add(1, Ordering::SeqCst);
    }

    fn release(&mut self) {
        self.driven.store(false, Ordering::SeqCst);
    }
}

#[test]
fn test_fresh_arbiter_is_free() {
    let (mut arbiter, _signal) = BusArbiter::new(WINDOW, Box::new(PassiveLines::new()));

    assert!(!arbiter.is_held());
    assert_eq!(arbiter.blockout_deadline(), None);
    assert!(arbiter.can_take_bus());
}

#[test]
fn test_start_blockout_blocks_one_window() {
    let (mut arbiter, _signal) = BusArbiter::new(WINDOW, Box::new(PassiveLines::new()));
    let t0 = Instant::now();

    arbiter.start_blockout(t0);

    assert_eq!(arbiter.blockout_deadline(), Some(t0 + WINDOW));
    assert!(!arbiter.can_take_bus_at(t0));
    assert!(!arbiter.can_take_bus_at(t0 + Duration::from_secs(19)));
    assert!(arbiter.can_take_bus_at(t0 + WINDOW));
}

#[test]
fn test_take_while_blocked_fails_without_driving() {
    let lines = ProbeLines::default();
    let (mut arbiter, signal) = BusArbiter::new(WINDOW, Box::new(lines.clone()));
    let t0 = Instant::now();
    signal.edge_at(t0);

    let blocked = matches!(
        arbiter.take_bus_control_at(t0 + Duration::from_secs(1)),
        Err(DavError::BusUnavailable)
    );

    assert!(blocked);
    assert_eq!(lines.takes.load(Ordering::SeqCst), 0);
    assert!(!arbiter.is_held());
}

#[test]
fn test_guard_drives_and_releases_lines() {
    let lines = ProbeLines::default();
    let (mut arbiter, _signal) = BusArbiter::new(WINDOW, Box::new(lines.clone()));

    {
        let _guard = arbiter.take_bus_control().unwrap();
        assert!(lines.driven.load(Ordering::SeqCst));
    }

    assert!(!lines.driven.load(Ordering::SeqCst));
    assert!(!arbiter.is_held());
    assert!(arbiter.can_take_bus());
}

#[test]
fn test_edges_from_own_traffic_are_ignored() {
    let (mut arbiter, signal) = BusArbiter::new(WINDOW, Box::new(PassiveLines::new()));
    let t0 = Instant::now();

    {
        let _guard = arbiter.take_bus_control_at(t0).unwrap();
        signal.edge_at(t0 + Duration::from_millis(5));
        signal.edge_at(t0 + Duration::from_millis(9));
    }

    assert_eq!(arbiter.blockout_deadline(), None);
    assert!(arbiter.can_take_bus_at(t0 + Duration::from_millis(10)));
}

#[test]
fn test_edge_before_taking_still_counts() {
    let (mut arbiter, signal) = BusArbiter::new(WINDOW, Box::new(PassiveLines::new()));
    let t0 = Instant::now();
    let t1 = t0 + Duration::from_secs(30);

    // Queued before the take
    signal.edge_at(t0);
    {
        let _guard = arbiter.take_bus_control_at(t1).unwrap();
    }

    assert_eq!(arbiter.blockout_deadline(), Some(t0 + WINDOW));
}

#[test]
fn test_edge_after_release_blocks_again() {
    let (mut arbiter, signal) = BusArbiter::new(WINDOW, Box::new(PassiveLines::new()));
    let t0 = Instant::now();

    drop(arbiter.take_bus_control_at(t0).unwrap());
    let edge = t0 + Duration::from_secs(1);
    signal.edge_at(edge);

    assert!(!arbiter.can_take_bus_at(edge + Duration::from_secs(10)));
    assert!(arbiter.can_take_bus_at(edge + WINDOW));
}

#[test]
fn test_deadline_never_moves_backwards() {
    let (mut arbiter, signal) = BusArbiter::new(WINDOW, Box::new(PassiveLines::new()));
    let t0 = Instant::now();

    signal.edge_at(t0 + Duration::from_secs(10));
    signal.edge_at(t0);
    arbiter.can_take_bus_at(t0);

    assert_eq!(
        arbiter.blockout_deadline(),
        Some(t0 + Duration::from_secs(10) + WINDOW)
    );
}

#[test]
fn test_passive_lines_track_state() {
    let mut lines = PassiveLines::new();
    assert!(!lines.is_driven());

    lines.drive();
    assert!(lines.is_driven());

    lines.release();
    assert!(!lines.is_driven());
}
