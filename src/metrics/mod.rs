//! 运行结束后的指标归约
//!
//! 输入是流监视器的最终计数与完成的切换次数，输出三个标量指标。

mod flow;
mod reducer;

pub use flow::{FiveTuple, FlowRecord, FlowStats};
pub use reducer::{MetricsReducer, RunMetrics};
