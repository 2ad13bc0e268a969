//! 合成参考协议栈
//!
//! 用 `sim` 事件引擎驱动一个粗粒度的无线接入网：匀速直线移动的终端、
//! 周期测量、两种内置切换算法、理想 X2 切换、按小区平分容量的 full-buffer
//! 业务以及一个按五元组统计的流监视器。它只用来让实验能够端到端运行，
//! 不追求物理层精度。

pub(crate) mod algorithm;
mod events;
mod radio;
mod world;

use self::algorithm::HandoverAlgorithm;
use self::events::{MeasurementTick, TrafficTick};
use self::world::RadioWorld;
use super::api::RadioStack;
use crate::config::{FadingConfig, RadioConfig};
use crate::error::StackError;
use crate::events::RrcListener;
use crate::handover::PolicySelection;
use crate::metrics::FlowStats;
use crate::mobility::TerminalKinematics;
use crate::sim::{SimTime, Simulator};
use crate::topo::CellGrid;
use crate::traffic::TrafficPlan;
use tracing::{debug, info, warn};

/// 默认测量周期（与 ns-3 的 200 ms 测量上报周期一致）
pub const DEFAULT_MEASUREMENT_PERIOD: SimTime = SimTime(200_000_000);
/// 默认流量记账周期
pub const DEFAULT_TRAFFIC_PERIOD: SimTime = SimTime(100_000_000);

pub struct SyntheticStack {
    sim: Simulator,
    world: RadioWorld,
    cells_installed: bool,
    has_run: bool,
}

impl Default for SyntheticStack {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticStack {
    pub fn new() -> Self {
        Self::with_periods(DEFAULT_MEASUREMENT_PERIOD, DEFAULT_TRAFFIC_PERIOD)
    }

    pub fn with_periods(measurement: SimTime, traffic: SimTime) -> Self {
        Self {
            sim: Simulator::default(),
            world: RadioWorld::new(measurement, traffic),
            cells_installed: false,
            has_run: false,
        }
    }

    /// 当前服务小区（1 起的 CellId）；未接入时为 None
    pub fn serving_cell(&self, terminal: usize) -> Option<u16> {
        let t = self.world.terminals.get(terminal)?;
        t.serving.map(|c| self.world.cells[c].cell_id)
    }

    pub fn now(&self) -> SimTime {
        self.sim.now()
    }

    fn dispatch(&mut self, listener: &mut dyn RrcListener) {
        for n in self.world.notifications.drain(..) {
            listener.on_notification(&n);
        }
    }
}

impl RadioStack for SyntheticStack {
    fn configure_radio(
        &mut self,
        radio: &RadioConfig,
        tx_power_dbm: f64,
    ) -> Result<(), StackError> {
        debug!(scheduler = %radio.scheduler, antenna = %radio.antenna_model, tx_power_dbm, "配置无线参数");
        self.world.radio = radio.clone();
        self.world.tx_power_dbm = tx_power_dbm;
        Ok(())
    }

    fn configure_fading(&mut self, fading: Option<&FadingConfig>) -> Result<(), StackError> {
        let Some(fading) = fading else {
            return Ok(());
        };
        if !fading.trace_path.is_file() {
            return Err(StackError::FadingTrace {
                path: fading.trace_path.clone(),
            });
        }
        warn!(
            trace = %fading.trace_path.display(),
            "合成协议栈不回放衰落 trace，仅校验文件存在"
        );
        Ok(())
    }

    fn set_handover_algorithm(&mut self, selection: &PolicySelection) -> Result<(), StackError> {
        let algorithm = HandoverAlgorithm::from_selection(selection)?;
        info!(algorithm = %selection.algorithm, "切换算法已设置");
        self.world.algorithm = Some(algorithm);
        Ok(())
    }

    fn install_cells(&mut self, grid: &CellGrid) -> Result<(), StackError> {
        self.world
            .install_cells(grid.sectors().map(|s| (s.position, s.orientation_deg)));
        self.cells_installed = true;
        info!(cells = self.world.cells.len(), "小区已安装");
        Ok(())
    }

    fn install_terminals(&mut self, terminals: &[TerminalKinematics]) -> Result<(), StackError> {
        if !self.cells_installed {
            return Err(StackError::NotInstalled("cells"));
        }
        self.world.install_terminals(terminals);
        info!(terminals = terminals.len(), "终端已安装");
        Ok(())
    }

    fn install_flows(&mut self, plan: &TrafficPlan) -> Result<(), StackError> {
        if self.world.terminals.is_empty() && !plan.flows.is_empty() {
            return Err(StackError::NotInstalled("terminals"));
        }
        self.world.install_flows(&plan.flows);
        info!(flows = plan.flows.len(), "业务流已安装");
        Ok(())
    }

    #[tracing::instrument(skip(self, listener), fields(stop_at = ?stop_at))]
    fn run(&mut self, stop_at: SimTime, listener: &mut dyn RrcListener) -> Result<(), StackError> {
        if self.has_run {
            return Err(StackError::AlreadyRun);
        }
        if !self.cells_installed {
            return Err(StackError::NotInstalled("cells"));
        }
        if self.world.algorithm.is_none() {
            return Err(StackError::NotInstalled("handover algorithm"));
        }
        self.has_run = true;
        self.world.stop_at = stop_at;

        self.sim.schedule(SimTime::ZERO, MeasurementTick);
        self.sim.schedule(self.world.traffic_period, TrafficTick);

        info!("▶️  开始运行仿真");
        let mut events = 0_u64;
        while self.sim.step(stop_at, &mut self.world) {
            events += 1;
            self.dispatch(listener);
        }
        self.world.account_traffic(stop_at);
        self.sim.run_until(stop_at, &mut self.world);
        self.dispatch(listener);
        info!(total_events = events, final_time = ?self.sim.now(), "✅ 仿真完成");
        Ok(())
    }

    fn flow_stats(&self) -> Vec<FlowStats> {
        self.world.flow_stats()
    }

    fn destroy(&mut self) {
        self.sim.clear();
        self.world.notifications.clear();
    }
}
