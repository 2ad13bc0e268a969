//! RRC 通知与事件聚合
//!
//! 外部协议栈在单线程事件循环中按时间顺序推送通知，
//! `EventAggregator` 同步消费并累计完成的切换次数。

mod aggregator;
mod notification;

pub use aggregator::{EventAggregator, EventTallies};
pub use notification::{FailureReason, HandoverEventKind, RrcListener, RrcNotification, RrcSide};
