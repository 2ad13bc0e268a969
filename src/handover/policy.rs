//! 切换策略配置
//!
//! `HandoverPolicyConfig` 是一个和类型：互斥性由类型保证，而不是靠两个布尔开关约定。
//! 选择结果是 "算法名 + 属性包"，参数原样转发，不做物理合理性校验。

use crate::sim::SimTime;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const A3_RSRP_ALGORITHM: &str = "ns3::A3RsrpHandoverAlgorithm";
pub const A2A4_RSRQ_ALGORITHM: &str = "ns3::A2A4RsrqHandoverAlgorithm";

/// 两种切换触发策略之一
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HandoverPolicyConfig {
    /// 基于 RSRP 的 A3 事件：邻区比服务小区强 `hysteresis_db` 并持续 TTT
    A3Rsrp {
        hysteresis_db: f64,
        time_to_trigger_ms: u16,
    },
    /// 基于 RSRQ 的 A2/A4 事件：服务小区低于门限且邻区高出偏置
    A2A4Rsrq {
        serving_cell_threshold: u8,
        neighbour_cell_offset: u8,
    },
}

impl HandoverPolicyConfig {
    pub fn algorithm(&self) -> &'static str {
        match self {
            HandoverPolicyConfig::A3Rsrp { .. } => A3_RSRP_ALGORITHM,
            HandoverPolicyConfig::A2A4Rsrq { .. } => A2A4_RSRQ_ALGORITHM,
        }
    }

    /// 生成转发给协议栈的选择结果，只包含当前变体的属性
    pub fn select(&self) -> PolicySelection {
        let attributes = match *self {
            HandoverPolicyConfig::A3Rsrp {
                hysteresis_db,
                time_to_trigger_ms,
            } => vec![
                ("Hysteresis".to_string(), AttributeValue::Double(hysteresis_db)),
                (
                    "TimeToTrigger".to_string(),
                    AttributeValue::Time(SimTime::from_millis(u64::from(time_to_trigger_ms))),
                ),
            ],
            HandoverPolicyConfig::A2A4Rsrq {
                serving_cell_threshold,
                neighbour_cell_offset,
            } => vec![
                (
                    "ServingCellThreshold".to_string(),
                    AttributeValue::Uinteger(u64::from(serving_cell_threshold)),
                ),
                (
                    "NeighbourCellOffset".to_string(),
                    AttributeValue::Uinteger(u64::from(neighbour_cell_offset)),
                ),
            ],
        };
        PolicySelection {
            algorithm: self.algorithm().to_string(),
            attributes,
        }
    }
}

/// 属性值（对应 ns-3 的 DoubleValue / UintegerValue / TimeValue）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    Double(f64),
    Uinteger(u64),
    Time(SimTime),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Double(v) => write!(f, "{v}"),
            AttributeValue::Uinteger(v) => write!(f, "{v}"),
            AttributeValue::Time(t) => write!(f, "{t}"),
        }
    }
}

/// 一次性的静态选择：算法名 + 属性包
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySelection {
    pub algorithm: String,
    pub attributes: Vec<(String, AttributeValue)>,
}

impl PolicySelection {
    pub fn attribute(&self, name: &str) -> Option<AttributeValue> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.attributes.iter().map(|(n, _)| n.as_str())
    }
}
