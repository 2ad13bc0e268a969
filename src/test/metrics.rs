use crate::error::ConfigError;
use crate::metrics::{FiveTuple, FlowRecord, FlowStats, MetricsReducer};
use std::net::Ipv4Addr;

fn record(flow_id: u32, destination_port: u16, received_bytes: u64) -> FlowRecord {
    FlowRecord {
        flow_id,
        destination_port,
        received_bytes,
    }
}

fn two_terminal_records() -> Vec<FlowRecord> {
    vec![
        record(1, 10_000, 125_000),
        record(2, 10_001, 125_000),
        // 上行，不计入
        record(3, 20_000, 999),
    ]
}

#[test]
fn reduces_two_terminal_run() {
    let reducer = MetricsReducer::new(2, 10.0, 10_000).expect("port range");
    let m = reducer.reduce(&two_terminal_records(), 4);

    assert_eq!(m.total_dl_bytes, 250_000);
    assert!((m.total_downlink_throughput_mbps - 0.2).abs() < 1e-12);
    assert!((m.anoh - 0.2).abs() < 1e-12);
    let ratio = m.optimization_ratio.expect("handovers occurred");
    assert!((ratio - 1.0).abs() < 1e-9);
    assert_eq!(m.completed_handovers, 4);
}

#[test]
fn zero_handovers_leave_ratio_undefined() {
    let reducer = MetricsReducer::new(2, 10.0, 10_000).expect("port range");
    let m = reducer.reduce(&two_terminal_records(), 0);

    assert_eq!(m.anoh, 0.0);
    assert_eq!(m.optimization_ratio, None);
    assert!((m.total_downlink_throughput_mbps - 0.2).abs() < 1e-12);

    let out = m.to_string();
    assert!(out.ends_with("Optimization Ratio: N/A (no handovers occurred)"));
    assert!(!out.contains("inf"));
    assert!(!out.contains("NaN"));
}

#[test]
fn display_prints_three_lines_in_order() {
    let m = MetricsReducer::new(2, 10.0, 10_000)
        .expect("port range")
        .reduce(&two_terminal_records(), 4);
    let out = m.to_string();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "Total Downlink Throughput: 0.2 Mbps");
    assert_eq!(lines[1], "ANOH (Avg handovers per UE per second): 0.2");
    assert!(lines[2].starts_with("Optimization Ratio (Throughput/ANOH): "));
}

#[test]
fn degenerate_windows_report_zero() {
    let no_time = MetricsReducer::new(2, 0.0, 10_000)
        .expect("port range")
        .reduce(&two_terminal_records(), 3);
    assert_eq!(no_time.total_downlink_throughput_mbps, 0.0);
    assert_eq!(no_time.anoh, 0.0);
    assert_eq!(no_time.optimization_ratio, None);

    let no_terminals = MetricsReducer::new(0, 10.0, 10_000)
        .expect("port range")
        .reduce(&two_terminal_records(), 3);
    assert_eq!(no_terminals.total_dl_bytes, 0);
    assert_eq!(no_terminals.anoh, 0.0);
    assert_eq!(no_terminals.optimization_ratio, None);
}

#[test]
fn port_range_is_half_open() {
    let reducer = MetricsReducer::with_port_range(2, 1.0, 10_000..10_002);
    assert!(reducer.is_downlink(&record(1, 10_000, 1)));
    assert!(reducer.is_downlink(&record(1, 10_001, 1)));
    assert!(!reducer.is_downlink(&record(1, 10_002, 1)));
    assert!(!reducer.is_downlink(&record(1, 9_999, 1)));
    assert_eq!(
        reducer.downlink_bytes(&[record(1, 10_001, 7), record(2, 10_002, 100)]),
        7
    );
}

#[test]
fn flow_record_reads_destination_port_and_rx_bytes() {
    let stats = FlowStats {
        flow_id: 9,
        tuple: FiveTuple {
            source_address: Ipv4Addr::new(1, 0, 0, 2),
            destination_address: Ipv4Addr::new(7, 0, 0, 3),
            protocol: 6,
            source_port: 49_154,
            destination_port: 10_001,
        },
        tx_bytes: 2_800,
        rx_bytes: 1_400,
        tx_packets: 2,
        rx_packets: 1,
        lost_packets: 1,
    };
    assert_eq!(FlowRecord::from(&stats), record(9, 10_001, 1_400));
}

#[test]
fn metrics_serialize_missing_ratio_as_null() {
    let m = MetricsReducer::new(1, 1.0, 10_000)
        .expect("port range")
        .reduce(&[], 0);
    let v = serde_json::to_value(m).expect("serialize");
    assert!(v["optimization_ratio"].is_null());
    assert_eq!(v["total_dl_bytes"], 0);
}

#[test]
fn port_range_past_u16_is_an_error() {
    let err = MetricsReducer::new(10, 1.0, 65_530).expect_err("overflow");
    assert!(matches!(
        err,
        ConfigError::PortOverflow {
            base: 65_530,
            count: 10
        }
    ));

    let reducer = MetricsReducer::new(5, 1.0, 65_530).expect("fits");
    assert!(reducer.is_downlink(&record(1, 65_534, 1)));
    assert!(!reducer.is_downlink(&record(1, 65_535, 1)));
}
