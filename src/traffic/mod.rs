//! full-buffer 业务计划

pub mod plan;

pub use plan::{Direction, Endpoint, FlowDescriptor, TrafficPlan, TrafficPlanOpts};
