use crate::config::TrafficConfig;
use crate::error::ConfigError;
use crate::sim::SimTime;
use crate::traffic::{Direction, Endpoint, TrafficPlan, TrafficPlanOpts};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashSet;

fn opts(terminals: usize, downlink: bool, uplink: bool) -> TrafficPlanOpts {
    TrafficPlanOpts {
        terminals,
        downlink,
        uplink,
        traffic: TrafficConfig::default(),
        duration: SimTime::from_secs(50),
    }
}

#[test]
fn ports_are_a_bijection_per_direction_and_do_not_overlap() {
    let n = 41;
    let plan = TrafficPlan::build(&opts(n, true, true), &mut StdRng::seed_from_u64(1))
        .expect("build plan");
    assert_eq!(plan.flows.len(), 2 * n);
    assert_eq!(plan.dl_ports, 10_000..10_041);
    assert_eq!(plan.ul_ports, 20_000..20_041);

    let dl: Vec<(u32, u16)> = plan
        .flows_in(Direction::Downlink)
        .map(|f| (f.terminal, f.destination_port))
        .collect();
    let ul: Vec<(u32, u16)> = plan
        .flows_in(Direction::Uplink)
        .map(|f| (f.terminal, f.destination_port))
        .collect();
    assert_eq!(dl.len(), n);
    assert_eq!(ul.len(), n);
    for (t, port) in &dl {
        assert_eq!(*port, 10_000 + *t as u16);
    }
    for (t, port) in &ul {
        assert_eq!(*port, 20_000 + *t as u16);
    }

    let dl_ports: HashSet<u16> = dl.iter().map(|(_, p)| *p).collect();
    let ul_ports: HashSet<u16> = ul.iter().map(|(_, p)| *p).collect();
    assert_eq!(dl_ports.len(), n);
    assert_eq!(ul_ports.len(), n);
    assert!(dl_ports.is_disjoint(&ul_ports));

    assert_eq!(plan.classify_port(10_040), Some(Direction::Downlink));
    assert_eq!(plan.classify_port(10_041), None);
    assert_eq!(plan.classify_port(20_000), Some(Direction::Uplink));
}

#[test]
fn endpoints_follow_direction() {
    let plan = TrafficPlan::build(&opts(2, true, true), &mut StdRng::seed_from_u64(1))
        .expect("build plan");
    for f in &plan.flows {
        let ue = Endpoint::Terminal { index: f.terminal };
        match f.direction {
            Direction::Downlink => {
                assert_eq!(f.source, Endpoint::RemoteHost);
                assert_eq!(f.destination, ue);
            }
            Direction::Uplink => {
                assert_eq!(f.source, ue);
                assert_eq!(f.destination, Endpoint::RemoteHost);
            }
        }
        assert_eq!(f.rate_bps, 10_000_000_000);
        assert_eq!(f.packet_bytes, 1400);
    }
}

#[test]
fn start_times_are_jittered_within_window_and_stop_at_duration() {
    let plan = TrafficPlan::build(&opts(200, true, true), &mut StdRng::seed_from_u64(9))
        .expect("build plan");
    let window = SimTime::from_millis(10);

    let mut distinct = HashSet::new();
    for f in &plan.flows {
        assert!(f.start <= window, "start {:?} outside jitter window", f.start);
        assert!(f.sink_start <= window);
        assert_eq!(f.stop, SimTime::from_secs(50));
        distinct.insert(f.start);
    }
    // 独立抽样：400 条流不会都落在同一时刻
    assert!(distinct.len() > 100);
}

#[test]
fn disabled_directions_produce_no_flows() {
    let mut rng = StdRng::seed_from_u64(1);
    let dl_only = TrafficPlan::build(&opts(5, true, false), &mut rng).expect("build plan");
    assert!(dl_only.flows.iter().all(|f| f.direction == Direction::Downlink));
    assert_eq!(dl_only.flows.len(), 5);

    let none = TrafficPlan::build(&opts(5, false, false), &mut rng).expect("build plan");
    assert!(none.flows.is_empty());
    // 端口区间仍然定义，用于归约时判定方向
    assert_eq!(none.dl_ports, 10_000..10_005);
}

#[test]
fn zero_jitter_starts_everything_at_zero() {
    let mut o = opts(3, true, true);
    o.traffic.start_jitter = SimTime::ZERO;
    let plan = TrafficPlan::build(&o, &mut StdRng::seed_from_u64(1)).expect("build plan");
    assert!(plan.flows.iter().all(|f| f.start == SimTime::ZERO && f.sink_start == SimTime::ZERO));
}

#[test]
fn overlapping_port_ranges_are_rejected() {
    let mut o = opts(100, true, true);
    o.traffic.ul_port = 10_050;
    let err = TrafficPlan::build(&o, &mut StdRng::seed_from_u64(1)).expect_err("overlap");
    assert!(matches!(err, ConfigError::PortOverlap { .. }));

    let mut o = opts(100, true, true);
    o.traffic.dl_port = 65_500;
    let err = TrafficPlan::build(&o, &mut StdRng::seed_from_u64(1)).expect_err("overflow");
    assert!(matches!(err, ConfigError::PortOverflow { base: 65_500, .. }));
}

#[test]
fn flow_is_active_between_both_starts_and_stop() {
    let plan = TrafficPlan::build(&opts(1, true, false), &mut StdRng::seed_from_u64(4))
        .expect("build plan");
    let f = &plan.flows[0];
    let begin = f.start.max(f.sink_start);
    assert!(f.is_active(begin));
    assert!(f.is_active(SimTime::from_secs(10)));
    assert!(!f.is_active(SimTime::from_secs(50)));
}
