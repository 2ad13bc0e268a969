use crate::config::ExperimentConfig;
use crate::handover::{
    A2A4_RSRQ_ALGORITHM, A3_RSRP_ALGORITHM, AttributeValue, HandoverPolicyConfig,
};
use crate::sim::SimTime;

#[test]
fn a3_selection_forwards_only_hysteresis_and_ttt() {
    let cfg = ExperimentConfig {
        use_a2a4: false,
        hysteresis: 3.5,
        time_to_trigger: 256,
        serving_cell_threshold: 12,
        neighbour_cell_offset: 4,
        ..ExperimentConfig::default()
    };
    let sel = cfg.handover_policy().select();

    assert_eq!(sel.algorithm, A3_RSRP_ALGORITHM);
    let names: Vec<&str> = sel.attribute_names().collect();
    assert_eq!(names, vec!["Hysteresis", "TimeToTrigger"]);
    assert_eq!(sel.attribute("Hysteresis"), Some(AttributeValue::Double(3.5)));
    assert_eq!(
        sel.attribute("TimeToTrigger"),
        Some(AttributeValue::Time(SimTime::from_millis(256)))
    );
    assert_eq!(sel.attribute("ServingCellThreshold"), None);
    assert_eq!(sel.attribute("NeighbourCellOffset"), None);
}

#[test]
fn a2a4_selection_forwards_only_threshold_and_offset() {
    let cfg = ExperimentConfig {
        use_a2a4: true,
        hysteresis: 9.0,
        time_to_trigger: 1024,
        ..ExperimentConfig::default()
    };
    let sel = cfg.handover_policy().select();

    assert_eq!(sel.algorithm, A2A4_RSRQ_ALGORITHM);
    let names: Vec<&str> = sel.attribute_names().collect();
    assert_eq!(names, vec!["ServingCellThreshold", "NeighbourCellOffset"]);
    assert_eq!(
        sel.attribute("ServingCellThreshold"),
        Some(AttributeValue::Uinteger(30))
    );
    assert_eq!(
        sel.attribute("NeighbourCellOffset"),
        Some(AttributeValue::Uinteger(2))
    );
    assert_eq!(sel.attribute("Hysteresis"), None);
    assert_eq!(sel.attribute("TimeToTrigger"), None);
}

#[test]
fn parameters_are_forwarded_verbatim() {
    // 物理上不合理的值也原样转发，由协议栈决定是否拒绝
    let policy = HandoverPolicyConfig::A3Rsrp {
        hysteresis_db: -40.0,
        time_to_trigger_ms: u16::MAX,
    };
    let sel = policy.select();
    assert_eq!(sel.attribute("Hysteresis"), Some(AttributeValue::Double(-40.0)));
    assert_eq!(
        sel.attribute("TimeToTrigger"),
        Some(AttributeValue::Time(SimTime::from_millis(65_535)))
    );
}

#[test]
fn policy_config_serializes_as_tagged_union() {
    let policy = HandoverPolicyConfig::A2A4Rsrq {
        serving_cell_threshold: 30,
        neighbour_cell_offset: 2,
    };
    let v = serde_json::to_value(policy).expect("serialize policy");
    assert_eq!(v["kind"], "a2_a4_rsrq");
    assert_eq!(v["serving_cell_threshold"], 30);
    assert!(v.get("hysteresis_db").is_none());

    let back: HandoverPolicyConfig = serde_json::from_value(v).expect("deserialize policy");
    assert_eq!(back, policy);
}
