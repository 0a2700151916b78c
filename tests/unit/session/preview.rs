use super::*;

const MS: Duration = Duration::from_millis(1);

#[test]
fn nothing_runs_before_quiet_period() {
    let t0 = Instant::now();
    let mut s = PreviewScheduler::new(300 * MS);
    assert_eq!(s.request(RequestId(1), "a", t0), None);
    assert!(s.poll(t0 + 299 * MS).is_none());
    assert_eq!(s.poll(t0 + 300 * MS), Some((RequestId(1), "a")));
    assert!(!s.is_pending());
    assert!(s.poll(t0 + 900 * MS).is_none());
}

#[test]
fn rapid_requests_coalesce_to_latest() {
    let t0 = Instant::now();
    let mut s = PreviewScheduler::new(300 * MS);
    s.request(RequestId(1), 1, t0);
    assert_eq!(s.request(RequestId(2), 2, t0 + 100 * MS), Some(RequestId(1)));
    assert_eq!(s.request(RequestId(3), 3, t0 + 200 * MS), Some(RequestId(2)));
    assert_eq!(s.coalesced(), 2);

    // Deadline restarted from the last request.
    assert!(s.poll(t0 + 400 * MS).is_none());
    assert_eq!(s.deadline(), Some(t0 + 500 * MS));
    assert_eq!(s.poll(t0 + 500 * MS), Some((RequestId(3), 3)));
}

#[test]
fn cancel_drops_pending() {
    let t0 = Instant::now();
    let mut s = PreviewScheduler::new(10 * MS);
    s.request(RequestId(7), (), t0);
    assert_eq!(s.pending_id(), Some(RequestId(7)));
    assert_eq!(s.cancel(), Some(RequestId(7)));
    assert!(s.poll(t0 + 20 * MS).is_none());
    assert_eq!(s.cancel(), None);
}

#[test]
fn zero_debounce_fires_immediately() {
    let t0 = Instant::now();
    let mut s = PreviewScheduler::new(Duration::ZERO);
    s.request(RequestId(1), 'x', t0);
    assert_eq!(s.poll(t0), Some((RequestId(1), 'x')));
}
