use super::*;

fn four_phase() -> PhaseTable {
    PhaseTable::new(vec![
        Phase::new("acceleration", 0.15, Ease::InQuad),
        Phase::new("cruising", 0.6, Ease::Linear),
        Phase::new("deceleration", 0.9, Ease::OutCubic),
        Phase::new("reveal", 1.0, Ease::OutBack),
    ])
    .unwrap()
}

#[test]
fn rejects_bad_thresholds() {
    assert!(PhaseTable::new(vec![]).is_err());
    assert!(
        PhaseTable::new(vec![
            Phase::new("a", 0.5, Ease::Linear),
            Phase::new("b", 0.5, Ease::Linear),
            Phase::new("c", 1.0, Ease::Linear),
        ])
        .is_err()
    );
    assert!(PhaseTable::new(vec![Phase::new("a", 0.9, Ease::Linear)]).is_err());
    assert!(PhaseTable::new(vec![Phase::new("a", 1.2, Ease::Linear)]).is_err());
    assert!(PhaseTable::new(vec![Phase::new("a", 0.0, Ease::Linear), Phase::new("b", 1.0, Ease::Linear)]).is_err());
}

#[test]
fn active_phase_is_first_threshold_at_or_above_progress() {
    let t = four_phase();
    assert_eq!(t.sample(0.0).name, "acceleration");
    assert_eq!(t.sample(0.15).name, "acceleration");
    assert_eq!(t.sample(0.150001).name, "cruising");
    assert_eq!(t.sample(0.95).name, "reveal");
    assert_eq!(t.sample(1.0).name, "reveal");
    assert_eq!(t.sample(5.0).name, "reveal");
}

#[test]
fn global_eased_is_continuous_at_boundaries() {
    let t = four_phase();
    for ph in t.phases() {
        let at = t.sample(ph.end);
        assert_eq!(at.global_eased, ph.end, "boundary {}", ph.name);
        let after = t.sample(ph.end + 1e-9);
        assert!((after.global_eased - ph.end).abs() < 1e-6, "{}", ph.name);
    }
    assert_eq!(t.sample(0.0).global_eased, 0.0);
    assert_eq!(t.sample(1.0).global_eased, 1.0);
}

#[test]
fn local_progress_is_renormalized() {
    let t = four_phase();
    let s = t.sample(0.375);
    assert_eq!(s.index, 1);
    assert!((s.local - 0.5).abs() < 1e-12);
    assert!((s.global_eased - 0.375).abs() < 1e-12);
}

#[test]
fn start_of_names() {
    let t = four_phase();
    assert_eq!(t.start_of("acceleration"), Some(0.0));
    assert_eq!(t.start_of("reveal"), Some(0.9));
    assert_eq!(t.start_of("missing"), None);
}

#[test]
fn static_tables_validate_on_demand() {
    static BAD: [Phase; 1] = [Phase::new("only", 0.5, Ease::Linear)];
    let t = PhaseTable::from_static(&BAD);
    assert!(PhaseTable::validate(t.phases()).is_err());
}

#[test]
fn tracker_reports_each_phase_once() {
    let mut tr = PhaseTracker::default();
    assert_eq!(tr.advance(0), 0..1);
    assert!(tr.advance(0).is_empty());
    assert_eq!(tr.advance(1), 1..2);
    tr.reset();
    assert_eq!(tr.current(), None);
    assert_eq!(tr.advance(2), 0..3);
}

#[test]
fn tracker_reports_skipped_phases() {
    let mut tr = PhaseTracker::default();
    tr.advance(0);
    let entered = tr.advance(3);
    assert_eq!(entered, 1..4);
    assert!(entered.contains(&2));
    assert!(tr.advance(1).is_empty());
    assert_eq!(tr.current(), Some(1));
}
