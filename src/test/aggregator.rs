use crate::events::{
    EventAggregator, FailureReason, HandoverEventKind, RrcListener, RrcNotification, RrcSide,
};
use crate::sim::SimTime;

fn note(at_ms: u64, side: RrcSide, kind: HandoverEventKind) -> RrcNotification {
    RrcNotification {
        at: SimTime::from_millis(at_ms),
        side,
        kind,
        node: 24,
        imsi: 3,
        cell_id: 5,
        rnti: 2,
        target_cell_id: matches!(kind, HandoverEventKind::Start).then_some(8),
    }
}

#[test]
fn only_ue_side_end_ok_increments_counter() {
    let mut agg = EventAggregator::new();
    let kinds = [
        (RrcSide::Ue, HandoverEventKind::ConnectionEstablished, 0),
        (RrcSide::Enb, HandoverEventKind::ConnectionEstablished, 0),
        (RrcSide::Enb, HandoverEventKind::Start, 0),
        (RrcSide::Ue, HandoverEventKind::Start, 0),
        (RrcSide::Enb, HandoverEventKind::EndOk, 0),
        (RrcSide::Ue, HandoverEventKind::EndOk, 1),
        (
            RrcSide::Enb,
            HandoverEventKind::Failure(FailureReason::NoPreamble),
            0,
        ),
        (
            RrcSide::Enb,
            HandoverEventKind::Failure(FailureReason::Joining),
            0,
        ),
        (RrcSide::Ue, HandoverEventKind::EndOk, 1),
    ];

    let mut expected = 0;
    let mut previous = 0;
    for (i, (side, kind, delta)) in kinds.into_iter().enumerate() {
        agg.on_notification(&note(i as u64 * 10, side, kind));
        expected += delta;
        assert_eq!(agg.completed_handovers(), expected, "after {kind:?} on {side:?}");
        assert!(agg.completed_handovers() >= previous);
        previous = agg.completed_handovers();
    }

    assert_eq!(agg.completed_handovers(), 2);
    let tallies = agg.tallies();
    assert_eq!(tallies.connections, 2);
    assert_eq!(tallies.handover_starts, 2);
    assert_eq!(tallies.enb_handover_end_ok, 1);
    assert_eq!(tallies.total_failures(), 2);
    assert_eq!(tallies.failures.get("HandoverFailureNoPreamble"), Some(&1));
}

#[test]
fn failures_never_touch_the_counter() {
    let mut agg = EventAggregator::new();
    for reason in [
        FailureReason::NoPreamble,
        FailureReason::MaxRach,
        FailureReason::Leaving,
        FailureReason::Joining,
    ] {
        agg.on_notification(&note(0, RrcSide::Enb, HandoverEventKind::Failure(reason)));
    }
    assert_eq!(agg.completed_handovers(), 0);
    assert_eq!(agg.tallies().total_failures(), 4);
}

#[test]
fn direct_end_ok_hook_counts_once_per_call() {
    let mut agg = EventAggregator::new();
    agg.on_handover_end_ok(1, 4);
    agg.on_handover_end_ok(2, 7);
    assert_eq!(agg.completed_handovers(), 2);
}

#[test]
fn trace_is_only_recorded_when_requested() {
    let mut quiet = EventAggregator::new();
    quiet.on_notification(&note(0, RrcSide::Ue, HandoverEventKind::EndOk));
    assert!(quiet.trace_lines().is_empty());

    let mut traced = EventAggregator::with_trace();
    traced.on_notification(&note(1500, RrcSide::Ue, HandoverEventKind::Start));
    traced.on_notification(&note(1520, RrcSide::Ue, HandoverEventKind::EndOk));
    traced.on_notification(&note(
        1520,
        RrcSide::Enb,
        HandoverEventKind::Failure(FailureReason::MaxRach),
    ));

    let lines = traced.take_trace();
    assert_eq!(
        lines,
        vec![
            "1.5s /NodeList/24/DeviceList/0/LteUeRrc/HandoverStart UE IMSI 3: starting handover from CellId 5 to CellId 8",
            "1.52s /NodeList/24/DeviceList/0/LteUeRrc/HandoverEndOk UE IMSI 3: completed handover to CellId 5",
            "1.52s /NodeList/24/DeviceList/0/LteEnbRrc/HandoverFailureMaxRach eNB CellId 5 IMSI 3 handover failure (RNTI 2)",
        ]
    );
    assert!(traced.trace_lines().is_empty());
}

#[test]
fn enb_trace_lines_use_cell_perspective() {
    let n = note(0, RrcSide::Enb, HandoverEventKind::ConnectionEstablished);
    assert_eq!(
        n.to_string(),
        "0s /NodeList/24/DeviceList/0/LteEnbRrc/ConnectionEstablished eNB CellId 5: UE IMSI 3 connected with RNTI 2"
    );
    let n = note(0, RrcSide::Enb, HandoverEventKind::Start);
    assert!(n.to_string().ends_with("eNB CellId 5: initiating handover of UE IMSI 3 to CellId 8"));
    let n = note(0, RrcSide::Enb, HandoverEventKind::EndOk);
    assert!(n.to_string().ends_with("eNB CellId 5: successful handover of UE IMSI 3"));
}
