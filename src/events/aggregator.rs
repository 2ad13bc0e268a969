//! 事件聚合器
//!
//! 唯一影响指标的状态是 `completed_handovers`：只在终端侧 HandoverEndOk 时加 1。
//! 同一次切换会产生终端侧与基站侧两条 EndOk，只统计终端侧，避免重复计数。

use super::notification::{HandoverEventKind, RrcListener, RrcNotification, RrcSide};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// 按类别统计的观测计数（只用于日志，不参与指标计算）
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EventTallies {
    pub connections: u64,
    pub handover_starts: u64,
    pub enb_handover_end_ok: u64,
    pub failures: BTreeMap<&'static str, u64>,
}

impl EventTallies {
    pub fn total_failures(&self) -> u64 {
        self.failures.values().sum()
    }
}

#[derive(Debug, Default)]
pub struct EventAggregator {
    completed_handovers: u64,
    tallies: EventTallies,
    trace: Option<Vec<String>>,
}

impl EventAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 额外记录人类可读的事件日志
    pub fn with_trace() -> Self {
        Self {
            trace: Some(Vec::new()),
            ..Self::default()
        }
    }

    pub fn completed_handovers(&self) -> u64 {
        self.completed_handovers
    }

    pub fn tallies(&self) -> &EventTallies {
        &self.tallies
    }

    pub fn trace_lines(&self) -> &[String] {
        self.trace.as_deref().unwrap_or_default()
    }

    pub fn take_trace(&mut self) -> Vec<String> {
        self.trace.as_mut().map(std::mem::take).unwrap_or_default()
    }

    /// 一次完成的切换
    pub fn on_handover_end_ok(&mut self, imsi: u64, cell_id: u16) {
        self.completed_handovers += 1;
        debug!(
            imsi,
            cell_id,
            completed = self.completed_handovers,
            "✅ 切换完成"
        );
    }

    pub fn on_connection_established(&mut self, n: &RrcNotification) {
        self.tallies.connections += 1;
        debug!(imsi = n.imsi, cell_id = n.cell_id, rnti = n.rnti, side = ?n.side, "📶 RRC 连接建立");
    }

    pub fn on_handover_start(&mut self, n: &RrcNotification) {
        self.tallies.handover_starts += 1;
        debug!(
            imsi = n.imsi,
            from = n.cell_id,
            to = ?n.target_cell_id,
            side = ?n.side,
            "🔀 切换开始"
        );
    }

    /// 失败只记录，不中断运行
    pub fn on_handover_failure(&mut self, n: &RrcNotification) {
        *self
            .tallies
            .failures
            .entry(n.kind.trace_name())
            .or_default() += 1;
        info!(
            imsi = n.imsi,
            cell_id = n.cell_id,
            rnti = n.rnti,
            reason = n.kind.trace_name(),
            "⚠️ 切换失败"
        );
    }
}

impl RrcListener for EventAggregator {
    fn on_notification(&mut self, n: &RrcNotification) {
        if let Some(trace) = self.trace.as_mut() {
            trace.push(n.to_string());
        }
        match (n.side, n.kind) {
            (_, HandoverEventKind::ConnectionEstablished) => self.on_connection_established(n),
            (_, HandoverEventKind::Start) => self.on_handover_start(n),
            (RrcSide::Ue, HandoverEventKind::EndOk) => self.on_handover_end_ok(n.imsi, n.cell_id),
            (RrcSide::Enb, HandoverEventKind::EndOk) => self.tallies.enb_handover_end_ok += 1,
            (_, HandoverEventKind::Failure(_)) => self.on_handover_failure(n),
        }
    }
}
