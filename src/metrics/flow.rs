//! 流统计
//!
//! 由外部流监视器产生；本 crate 只读取一次。

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// 分类器五元组
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FiveTuple {
    pub source_address: Ipv4Addr,
    pub destination_address: Ipv4Addr,
    pub protocol: u8,
    pub source_port: u16,
    pub destination_port: u16,
}

/// 单条流的最终统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowStats {
    pub flow_id: u32,
    pub tuple: FiveTuple,
    pub tx_bytes: u64,
    pub rx_bytes: u64,
    pub tx_packets: u64,
    pub rx_packets: u64,
    pub lost_packets: u64,
}

/// 归约所需的最小视图
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowRecord {
    pub flow_id: u32,
    pub destination_port: u16,
    pub received_bytes: u64,
}

impl From<&FlowStats> for FlowRecord {
    fn from(s: &FlowStats) -> Self {
        Self {
            flow_id: s.flow_id,
            destination_port: s.tuple.destination_port,
            received_bytes: s.rx_bytes,
        }
    }
}
