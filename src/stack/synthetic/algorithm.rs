//! 参考协议栈内置的两种切换算法
//!
//! 只认两个算法名；属性名、类型、取值范围不符时在安装阶段拒绝。

use crate::error::StackError;
use crate::handover::{A2A4_RSRQ_ALGORITHM, A3_RSRP_ALGORITHM, AttributeValue, PolicySelection};
use crate::sim::SimTime;

/// ServingCellThreshold / NeighbourCellOffset 的上报量程上限
const RSRQ_RANGE_MAX: u64 = 34;
const HYSTERESIS_MAX_DB: f64 = 15.0;

/// 单个终端的一次测量
#[derive(Debug, Clone)]
pub(crate) struct Measurement {
    pub serving: usize,
    pub rsrp_dbm: Vec<f64>,
    /// 0..=34
    pub rsrq_range: Vec<u8>,
}

impl Measurement {
    /// 除服务小区外按 `key` 最大的邻区
    fn best_neighbour<F>(&self, key: F) -> Option<usize>
    where
        F: Fn(usize) -> f64,
    {
        (0..self.rsrp_dbm.len())
            .filter(|c| *c != self.serving)
            .max_by(|a, b| key(*a).total_cmp(&key(*b)))
    }
}

/// 终端上由算法维护的状态
#[derive(Debug, Clone, Default)]
pub(crate) struct TriggerState {
    /// A3 进入条件首次满足的时刻及当时的目标
    entered: Option<(SimTime, usize)>,
}

impl TriggerState {
    pub fn reset(&mut self) {
        self.entered = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum HandoverAlgorithm {
    A3Rsrp {
        hysteresis_db: f64,
        time_to_trigger: SimTime,
    },
    A2A4Rsrq {
        serving_cell_threshold: u8,
        neighbour_cell_offset: u8,
    },
}

impl HandoverAlgorithm {
    pub fn from_selection(sel: &PolicySelection) -> Result<Self, StackError> {
        let mut alg = match sel.algorithm.as_str() {
            A3_RSRP_ALGORITHM => HandoverAlgorithm::A3Rsrp {
                hysteresis_db: 3.0,
                time_to_trigger: SimTime::from_millis(256),
            },
            A2A4_RSRQ_ALGORITHM => HandoverAlgorithm::A2A4Rsrq {
                serving_cell_threshold: 30,
                neighbour_cell_offset: 1,
            },
            other => return Err(StackError::UnknownAlgorithm(other.to_string())),
        };
        for (name, value) in &sel.attributes {
            alg.set_attribute(&sel.algorithm, name, *value)?;
        }
        Ok(alg)
    }

    fn set_attribute(
        &mut self,
        algorithm: &str,
        name: &str,
        value: AttributeValue,
    ) -> Result<(), StackError> {
        let type_err = |expected| StackError::AttributeType {
            algorithm: algorithm.to_string(),
            attribute: name.to_string(),
            expected,
        };
        let range_err = |value: String| StackError::AttributeRange {
            algorithm: algorithm.to_string(),
            attribute: name.to_string(),
            value,
        };

        match (self, name) {
            (HandoverAlgorithm::A3Rsrp { hysteresis_db, .. }, "Hysteresis") => {
                let AttributeValue::Double(v) = value else {
                    return Err(type_err("double"));
                };
                if !(0.0..=HYSTERESIS_MAX_DB).contains(&v) {
                    return Err(range_err(v.to_string()));
                }
                *hysteresis_db = v;
            }
            (HandoverAlgorithm::A3Rsrp { time_to_trigger, .. }, "TimeToTrigger") => {
                let AttributeValue::Time(t) = value else {
                    return Err(type_err("time"));
                };
                *time_to_trigger = t;
            }
            (
                HandoverAlgorithm::A2A4Rsrq {
                    serving_cell_threshold,
                    ..
                },
                "ServingCellThreshold",
            ) => *serving_cell_threshold = range_u8(value, type_err, range_err)?,
            (
                HandoverAlgorithm::A2A4Rsrq {
                    neighbour_cell_offset,
                    ..
                },
                "NeighbourCellOffset",
            ) => *neighbour_cell_offset = range_u8(value, type_err, range_err)?,
            _ => {
                return Err(StackError::UnknownAttribute {
                    algorithm: algorithm.to_string(),
                    attribute: name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// 根据一次测量决定是否切换；返回目标小区下标
    pub fn evaluate(&self, now: SimTime, m: &Measurement, st: &mut TriggerState) -> Option<usize> {
        match *self {
            HandoverAlgorithm::A3Rsrp {
                hysteresis_db,
                time_to_trigger,
            } => {
                let Some(best) = m.best_neighbour(|c| m.rsrp_dbm[c]) else {
                    st.reset();
                    return None;
                };
                if m.rsrp_dbm[best] <= m.rsrp_dbm[m.serving] + hysteresis_db {
                    st.reset();
                    return None;
                }
                // 目标换了就重新计时
                let since = match st.entered {
                    Some((since, target)) if target == best => since,
                    _ => now,
                };
                st.entered = Some((since, best));
                if now.saturating_sub(since) >= time_to_trigger {
                    st.reset();
                    Some(best)
                } else {
                    None
                }
            }
            HandoverAlgorithm::A2A4Rsrq {
                serving_cell_threshold,
                neighbour_cell_offset,
            } => {
                let serving_q = m.rsrq_range[m.serving];
                if serving_q >= serving_cell_threshold {
                    return None;
                }
                let best = m.best_neighbour(|c| f64::from(m.rsrq_range[c]))?;
                let gain = i32::from(m.rsrq_range[best]) - i32::from(serving_q);
                (gain >= i32::from(neighbour_cell_offset)).then_some(best)
            }
        }
    }
}

fn range_u8<T, R>(value: AttributeValue, type_err: T, range_err: R) -> Result<u8, StackError>
where
    T: Fn(&'static str) -> StackError,
    R: Fn(String) -> StackError,
{
    let AttributeValue::Uinteger(v) = value else {
        return Err(type_err("uinteger"));
    };
    if v > RSRQ_RANGE_MAX {
        return Err(range_err(v.to_string()));
    }
    Ok(v as u8)
}
