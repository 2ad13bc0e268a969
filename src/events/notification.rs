//! RRC 通知类型
//!
//! 对应 ns-3 的 `LteUeRrc/*` 与 `LteEnbRrc/*` trace source。

use crate::sim::SimTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 通知来源：终端侧或基站侧 RRC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RrcSide {
    Ue,
    Enb,
}

/// 切换失败原因（均为合法的仿真结果，不是程序错误）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    NoPreamble,
    MaxRach,
    Leaving,
    Joining,
}

impl FailureReason {
    pub fn trace_name(&self) -> &'static str {
        match self {
            FailureReason::NoPreamble => "HandoverFailureNoPreamble",
            FailureReason::MaxRach => "HandoverFailureMaxRach",
            FailureReason::Leaving => "HandoverFailureLeaving",
            FailureReason::Joining => "HandoverFailureJoining",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum HandoverEventKind {
    ConnectionEstablished,
    Start,
    EndOk,
    Failure(FailureReason),
}

impl HandoverEventKind {
    pub fn trace_name(&self) -> &'static str {
        match self {
            HandoverEventKind::ConnectionEstablished => "ConnectionEstablished",
            HandoverEventKind::Start => "HandoverStart",
            HandoverEventKind::EndOk => "HandoverEndOk",
            HandoverEventKind::Failure(reason) => reason.trace_name(),
        }
    }
}

/// 一条瞬时通知：消费后即丢弃（除非开启了 trace 记录）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RrcNotification {
    pub at: SimTime,
    pub side: RrcSide,
    pub kind: HandoverEventKind,
    /// 发出通知的节点编号（用于拼接 trace context）
    pub node: u32,
    pub imsi: u64,
    /// 源小区（EndOk 时为新的服务小区）
    pub cell_id: u16,
    pub rnti: u16,
    /// 仅 HandoverStart 携带
    pub target_cell_id: Option<u16>,
}

impl RrcNotification {
    /// ns-3 风格的 trace 路径，例如 `/NodeList/3/DeviceList/0/LteUeRrc/HandoverEndOk`
    pub fn context(&self) -> String {
        let rrc = match self.side {
            RrcSide::Ue => "LteUeRrc",
            RrcSide::Enb => "LteEnbRrc",
        };
        format!(
            "/NodeList/{}/DeviceList/0/{}/{}",
            self.node,
            rrc,
            self.kind.trace_name()
        )
    }
}

impl fmt::Display for RrcNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = self.target_cell_id.unwrap_or_default();
        write!(f, "{} {} ", self.at, self.context())?;
        match (self.side, self.kind) {
            (RrcSide::Ue, HandoverEventKind::ConnectionEstablished) => write!(
                f,
                "UE IMSI {}: connected to CellId {} with RNTI {}",
                self.imsi, self.cell_id, self.rnti
            ),
            (RrcSide::Ue, HandoverEventKind::Start) => write!(
                f,
                "UE IMSI {}: starting handover from CellId {} to CellId {}",
                self.imsi, self.cell_id, target
            ),
            (RrcSide::Ue, HandoverEventKind::EndOk) => write!(
                f,
                "UE IMSI {}: completed handover to CellId {}",
                self.imsi, self.cell_id
            ),
            (RrcSide::Enb, HandoverEventKind::ConnectionEstablished) => write!(
                f,
                "eNB CellId {}: UE IMSI {} connected with RNTI {}",
                self.cell_id, self.imsi, self.rnti
            ),
            (RrcSide::Enb, HandoverEventKind::Start) => write!(
                f,
                "eNB CellId {}: initiating handover of UE IMSI {} to CellId {}",
                self.cell_id, self.imsi, target
            ),
            (RrcSide::Enb, HandoverEventKind::EndOk) => write!(
                f,
                "eNB CellId {}: successful handover of UE IMSI {}",
                self.cell_id, self.imsi
            ),
            (_, HandoverEventKind::Failure(_)) => write!(
                f,
                "eNB CellId {} IMSI {} handover failure (RNTI {})",
                self.cell_id, self.imsi, self.rnti
            ),
        }
    }
}

/// 通知订阅者：协议栈在 `run` 期间同步、按时间顺序调用
pub trait RrcListener {
    fn on_notification(&mut self, n: &RrcNotification);
}
