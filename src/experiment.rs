//! 实验编排
//!
//! 配置 -> 校验 -> 生成拓扑/终端/业务计划 -> 配置并安装协议栈 -> 运行 ->
//! 读取流统计 -> 归约指标。所有致命错误都发生在运行开始之前。

use crate::config::{ExperimentConfig, FadingConfig, RadioConfig, TrafficConfig};
use crate::error::{ConfigError, Result};
use crate::events::{EventAggregator, EventTallies};
use crate::handover::PolicySelection;
use crate::metrics::{FlowRecord, MetricsReducer, RunMetrics};
use crate::mobility::{DeploymentArea, TerminalKinematics, generate_terminals};
use crate::stack::RadioStack;
use crate::topo::{CellGrid, CellGridBuilder};
use crate::traffic::{TrafficPlan, TrafficPlanOpts};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// 业务起始抖动使用独立的随机流，与终端运动学互不影响
const TRAFFIC_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;

/// 一次实验的完整静态计划（可导出给外部仿真器）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentPlan {
    pub config: ExperimentConfig,
    pub radio: RadioConfig,
    pub fading: Option<FadingConfig>,
    pub policy: PolicySelection,
    pub grid: CellGrid,
    pub area: DeploymentArea,
    pub terminals: Vec<TerminalKinematics>,
    pub traffic: TrafficPlan,
}

#[derive(Debug, Clone)]
pub struct ExperimentReport {
    pub metrics: RunMetrics,
    pub tallies: EventTallies,
    /// 开启 trace 时按时间顺序的事件日志
    pub trace: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Experiment {
    pub config: ExperimentConfig,
    pub grid: CellGridBuilder,
    pub area: DeploymentArea,
    pub radio: RadioConfig,
    pub traffic: TrafficConfig,
}

impl Experiment {
    /// 标准 7 站点布局与默认无线/业务参数
    pub fn new(config: ExperimentConfig) -> Self {
        Self {
            config,
            grid: CellGridBuilder::seven_site(),
            area: DeploymentArea::default(),
            radio: RadioConfig::default(),
            traffic: TrafficConfig::default(),
        }
    }

    /// 校验配置并生成静态计划；同一配置（含种子）总是得到同一计划。
    pub fn plan(&self) -> std::result::Result<ExperimentPlan, ConfigError> {
        let cfg = &self.config;
        cfg.validate(&self.grid, &self.traffic)?;
        let speeds = cfg.speed_range()?;

        let grid = self.grid.build(usize::from(cfg.number_of_enbs))?;

        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let terminals =
            generate_terminals(usize::from(cfg.number_of_ues), &self.area, &speeds, &mut rng);

        let mut traffic_rng = StdRng::seed_from_u64(cfg.seed ^ TRAFFIC_STREAM);
        let traffic = TrafficPlan::build(
            &TrafficPlanOpts {
                terminals: usize::from(cfg.number_of_ues),
                downlink: !cfg.disable_dl,
                uplink: !cfg.disable_ul,
                traffic: self.traffic.clone(),
                duration: cfg.duration(),
            },
            &mut traffic_rng,
        )?;

        let policy = cfg.handover_policy().select();
        if cfg.use_a2a4 {
            debug!(
                serving_cell_threshold = cfg.serving_cell_threshold,
                neighbour_cell_offset = cfg.neighbour_cell_offset,
                "A2-A4 参数"
            );
        }

        Ok(ExperimentPlan {
            config: cfg.clone(),
            radio: self.radio.clone(),
            fading: cfg.fading(),
            policy,
            grid,
            area: self.area,
            terminals,
            traffic,
        })
    }

    /// 在给定协议栈上执行计划并归约指标。无论成功与否，返回前都会销毁协议栈。
    #[tracing::instrument(skip_all, fields(algorithm = %plan.policy.algorithm))]
    pub fn run<S: RadioStack + ?Sized>(
        &self,
        plan: &ExperimentPlan,
        stack: &mut S,
        capture_trace: bool,
    ) -> Result<ExperimentReport> {
        let report = Self::drive(plan, stack, capture_trace);
        stack.destroy();
        report
    }

    fn drive<S: RadioStack + ?Sized>(
        plan: &ExperimentPlan,
        stack: &mut S,
        capture_trace: bool,
    ) -> Result<ExperimentReport> {
        let cfg = &plan.config;

        stack.configure_radio(&plan.radio, cfg.tx_power)?;
        stack.configure_fading(plan.fading.as_ref())?;
        stack.set_handover_algorithm(&plan.policy)?;
        stack.install_cells(&plan.grid)?;
        stack.install_terminals(&plan.terminals)?;
        stack.install_flows(&plan.traffic)?;

        let mut aggregator = if capture_trace {
            EventAggregator::with_trace()
        } else {
            EventAggregator::new()
        };
        stack.run(cfg.duration(), &mut aggregator)?;

        let records: Vec<FlowRecord> = stack.flow_stats().iter().map(FlowRecord::from).collect();
        let reducer = MetricsReducer::with_port_range(
            plan.terminals.len(),
            cfg.duration().as_secs_f64(),
            plan.traffic.dl_ports.clone(),
        );
        let metrics = reducer.reduce(&records, aggregator.completed_handovers());

        info!(
            completed_handovers = aggregator.completed_handovers(),
            failures = aggregator.tallies().total_failures(),
            flows = records.len(),
            "实验结束"
        );

        Ok(ExperimentReport {
            metrics,
            tallies: aggregator.tallies().clone(),
            trace: aggregator.take_trace(),
        })
    }
}

/// 便捷入口：校验、生成计划并运行
pub fn run_experiment<S: RadioStack + ?Sized>(
    config: ExperimentConfig,
    stack: &mut S,
    capture_trace: bool,
) -> Result<(ExperimentPlan, ExperimentReport)> {
    let experiment = Experiment::new(config);
    let plan = experiment.plan()?;
    let report = experiment.run(&plan, stack, capture_trace)?;
    Ok((plan, report))
}

