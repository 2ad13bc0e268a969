//! 协议栈 trait

use crate::config::{FadingConfig, RadioConfig};
use crate::error::StackError;
use crate::events::RrcListener;
use crate::handover::PolicySelection;
use crate::metrics::FlowStats;
use crate::mobility::TerminalKinematics;
use crate::sim::SimTime;
use crate::topo::CellGrid;
use crate::traffic::TrafficPlan;

/// 外部无线/核心网协议栈。
///
/// 所有 `configure_*` / `install_*` 调用都发生在 `run` 之前；任何拒绝都是致命的
/// 配置错误。`run` 期间的通知按非递减的仿真时间同步推送给 `listener`。
pub trait RadioStack {
    fn configure_radio(&mut self, radio: &RadioConfig, tx_power_dbm: f64)
    -> Result<(), StackError>;

    fn configure_fading(&mut self, fading: Option<&FadingConfig>) -> Result<(), StackError>;

    /// 一次性选择切换算法，运行期间不可切换
    fn set_handover_algorithm(&mut self, selection: &PolicySelection) -> Result<(), StackError>;

    fn install_cells(&mut self, grid: &CellGrid) -> Result<(), StackError>;

    /// 写入终端初始位置与速度，之后的移动状态归协议栈所有
    fn install_terminals(&mut self, terminals: &[TerminalKinematics]) -> Result<(), StackError>;

    fn install_flows(&mut self, plan: &TrafficPlan) -> Result<(), StackError>;

    /// 运行到 `stop_at` 为止（全局停止指令）
    fn run(&mut self, stop_at: SimTime, listener: &mut dyn RrcListener) -> Result<(), StackError>;

    /// 流监视器的最终计数；在 `run` 结束后读取一次
    fn flow_stats(&self) -> Vec<FlowStats>;

    fn destroy(&mut self);
}
