//! 指标归约
//!
//! - 吞吐量 = 下行端口区间内各流接收字节之和 x 8 / (时长 x 1e6)，单位 Mbps
//! - ANOH = 完成的切换数 / (终端数 x 时长)；终端数或时长为 0 时取 0
//! - 优化比 = 吞吐量 / ANOH；ANOH 为 0 时不适用（None），不做除法

use super::flow::FlowRecord;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use tracing::info;

/// 一次运行的最终指标，只计算一次
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub total_dl_bytes: u64,
    pub total_downlink_throughput_mbps: f64,
    /// 每终端每秒平均切换次数
    pub anoh: f64,
    pub optimization_ratio: Option<f64>,
    pub completed_handovers: u64,
    pub terminals: usize,
    pub duration_secs: f64,
}

/// 归约参数：终端数、时长与下行端口区间
#[derive(Debug, Clone)]
pub struct MetricsReducer {
    terminals: usize,
    duration_secs: f64,
    dl_ports: Range<u16>,
}

impl MetricsReducer {
    /// 下行端口区间为 `[dl_port, dl_port + terminals)`；区间越过 u16 时报错，不做截断。
    pub fn new(terminals: usize, duration_secs: f64, dl_port: u16) -> Result<Self, ConfigError> {
        let end = usize::from(dl_port)
            .checked_add(terminals)
            .and_then(|end| u16::try_from(end).ok())
            .ok_or(ConfigError::PortOverflow {
                base: dl_port,
                count: terminals,
            })?;
        Ok(Self::with_port_range(terminals, duration_secs, dl_port..end))
    }

    pub fn with_port_range(terminals: usize, duration_secs: f64, dl_ports: Range<u16>) -> Self {
        Self {
            terminals,
            duration_secs,
            dl_ports,
        }
    }

    pub fn is_downlink(&self, record: &FlowRecord) -> bool {
        self.dl_ports.contains(&record.destination_port)
    }

    /// 下行流接收字节之和
    pub fn downlink_bytes<'a, I>(&self, records: I) -> u64
    where
        I: IntoIterator<Item = &'a FlowRecord>,
    {
        records
            .into_iter()
            .filter(|r| self.is_downlink(r))
            .map(|r| r.received_bytes)
            .fold(0_u64, u64::saturating_add)
    }

    #[tracing::instrument(skip(self, records), fields(terminals = self.terminals, duration_secs = self.duration_secs))]
    pub fn reduce<'a, I>(&self, records: I, completed_handovers: u64) -> RunMetrics
    where
        I: IntoIterator<Item = &'a FlowRecord>,
    {
        let total_dl_bytes = self.downlink_bytes(records);
        let has_window = self.duration_secs > 0.0;

        let total_downlink_throughput_mbps = if has_window {
            (total_dl_bytes as f64 * 8.0) / (self.duration_secs * 1e6)
        } else {
            0.0
        };

        let anoh = if self.terminals > 0 && has_window {
            completed_handovers as f64 / (self.terminals as f64 * self.duration_secs)
        } else {
            0.0
        };

        let optimization_ratio = (anoh > 0.0).then(|| total_downlink_throughput_mbps / anoh);

        info!(
            total_dl_bytes,
            throughput_mbps = total_downlink_throughput_mbps,
            anoh,
            optimization_ratio = ?optimization_ratio,
            "📊 指标归约完成"
        );

        RunMetrics {
            total_dl_bytes,
            total_downlink_throughput_mbps,
            anoh,
            optimization_ratio,
            completed_handovers,
            terminals: self.terminals,
            duration_secs: self.duration_secs,
        }
    }
}

/// 三行人类可读输出
impl fmt::Display for RunMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Total Downlink Throughput: {} Mbps",
            self.total_downlink_throughput_mbps
        )?;
        writeln!(f, "ANOH (Avg handovers per UE per second): {}", self.anoh)?;
        match self.optimization_ratio {
            Some(ratio) => write!(f, "Optimization Ratio (Throughput/ANOH): {ratio}"),
            None => write!(f, "Optimization Ratio: N/A (no handovers occurred)"),
        }
    }
}
