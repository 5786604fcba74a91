use super::*;

#[test]
fn progress_is_clamped_to_trigger_range() {
    let t = ScrollTrigger::new(1000.0, 2000.0);
    assert_eq!(t.progress(500.0).get(), 0.0);
    assert_eq!(t.progress(1500.0).get(), 0.5);
    assert_eq!(t.progress(2600.0).get(), 1.0);
}

#[test]
fn zero_length_trigger_is_a_step() {
    let t = ScrollTrigger::pinned(400.0, 0.0);
    assert_eq!(t.progress(399.0).get(), 0.0);
    assert_eq!(t.progress(400.0).get(), 1.0);
}

#[test]
fn edges_follow_scroll_direction() {
    let mut tr = ScrollTracker::new(ScrollTrigger::new(100.0, 200.0), TriggerPolicy::Reversible);
    assert_eq!(tr.update(50.0).edge, None);
    let u = tr.update(150.0);
    assert_eq!(u.edge, Some(TriggerEdge::Enter));
    assert_eq!(u.direction, ScrollDirection::Forward);
    assert_eq!(tr.update(250.0).edge, Some(TriggerEdge::Leave));
    assert_eq!(tr.update(180.0).edge, Some(TriggerEdge::EnterBack));
    let back = tr.update(20.0);
    assert_eq!(back.edge, Some(TriggerEdge::LeaveBack));
    assert_eq!(back.direction, ScrollDirection::Backward);
    assert!(!back.reset);
}

#[test]
fn reset_policy_flags_leave_back_only() {
    let mut tr = ScrollTracker::new(
        ScrollTrigger::new(100.0, 200.0),
        TriggerPolicy::ResetOnLeaveBack,
    );
    assert!(!tr.update(300.0).reset);
    assert!(!tr.update(150.0).reset);
    assert!(tr.update(10.0).reset);
    assert!(!tr.update(5.0).reset);
}

#[test]
fn fast_scroll_reports_outer_edge() {
    let mut tr = ScrollTracker::new(ScrollTrigger::new(100.0, 200.0), TriggerPolicy::Reversible);
    tr.update(0.0);
    assert_eq!(tr.update(900.0).edge, Some(TriggerEdge::Leave));
    assert_eq!(tr.update(0.0).edge, Some(TriggerEdge::LeaveBack));
}
