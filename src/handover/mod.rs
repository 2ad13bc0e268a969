//! 切换策略选择
//!
//! 两种互斥的外部切换算法，每次运行恰好启用一种。

pub mod policy;

pub use policy::{
    A2A4_RSRQ_ALGORITHM, A3_RSRP_ALGORITHM, AttributeValue, HandoverPolicyConfig, PolicySelection,
};
