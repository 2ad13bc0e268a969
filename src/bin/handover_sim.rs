//! 多小区切换性能实验
//!
//! 构建 7 站点 21 小区拓扑，在合成协议栈上运行 full-buffer 业务，
//! 输出下行总吞吐量、ANOH 与优化比。

use clap::Parser;
use lte_ho_rs::Error;
use lte_ho_rs::config::ExperimentConfig;
use lte_ho_rs::experiment::Experiment;
use lte_ho_rs::stack::SyntheticStack;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "handover-sim",
    about = "LTE 多小区切换实验：吞吐量 / ANOH / 优化比"
)]
struct Args {
    /// 从 JSON 文件加载配置（命令行参数覆盖文件中的值）
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    number_of_ues: Option<u16>,
    /// 扇区总数（7 站点 x 3）
    #[arg(long)]
    number_of_enbs: Option<u16>,
    /// 仿真时长（秒）
    #[arg(long)]
    sim_time: Option<f64>,
    /// 开关参数可写成 `--disable-dl` 或 `--disable-dl=false`
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    disable_dl: Option<bool>,
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    disable_ul: Option<bool>,
    /// 使用 A2-A4-RSRQ（默认 A3-RSRP）
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    use_a2a4: Option<bool>,
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    enable_fading: Option<bool>,
    /// A3-RSRP 迟滞（dB）
    #[arg(long)]
    hysteresis: Option<f64>,
    /// A3-RSRP TTT（毫秒）
    #[arg(long)]
    time_to_trigger: Option<u16>,
    /// A2-A4-RSRQ 服务小区门限
    #[arg(long)]
    serving_cell_threshold: Option<u8>,
    /// A2-A4-RSRQ 邻区偏置
    #[arg(long)]
    neighbour_cell_offset: Option<u8>,
    /// eNB 发射功率（dBm）
    #[arg(long, allow_negative_numbers = true)]
    tx_power: Option<f64>,
    /// 终端最小速率（km/h）
    #[arg(long, allow_negative_numbers = true)]
    min_speed: Option<f64>,
    /// 终端最大速率（km/h）
    #[arg(long, allow_negative_numbers = true)]
    max_speed: Option<f64>,
    #[arg(long)]
    fading_trace: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,

    /// 在指标之前打印 RRC 连接/切换事件日志
    #[arg(long)]
    trace: bool,
    /// 把指标写成 JSON
    #[arg(long)]
    metrics_json: Option<PathBuf>,
    /// 把实验计划（拓扑、终端、策略、业务）写成 JSON
    #[arg(long)]
    plan_json: Option<PathBuf>,
    /// 只生成计划，不运行
    #[arg(long)]
    plan_only: bool,
}

impl Args {
    fn into_config(self) -> Result<(ExperimentConfig, Outputs), Error> {
        let mut cfg = match &self.config {
            Some(path) => ExperimentConfig::from_json_file(path)?,
            None => ExperimentConfig::default(),
        };
        if let Some(v) = self.number_of_ues {
            cfg.number_of_ues = v;
        }
        if let Some(v) = self.number_of_enbs {
            cfg.number_of_enbs = v;
        }
        if let Some(v) = self.sim_time {
            cfg.sim_time = v;
        }
        if let Some(v) = self.hysteresis {
            cfg.hysteresis = v;
        }
        if let Some(v) = self.time_to_trigger {
            cfg.time_to_trigger = v;
        }
        if let Some(v) = self.serving_cell_threshold {
            cfg.serving_cell_threshold = v;
        }
        if let Some(v) = self.neighbour_cell_offset {
            cfg.neighbour_cell_offset = v;
        }
        if let Some(v) = self.tx_power {
            cfg.tx_power = v;
        }
        if let Some(v) = self.min_speed {
            cfg.min_speed = v;
        }
        if let Some(v) = self.max_speed {
            cfg.max_speed = v;
        }
        if let Some(v) = self.fading_trace {
            cfg.fading_trace = v;
        }
        if let Some(v) = self.seed {
            cfg.seed = v;
        }
        if let Some(v) = self.disable_dl {
            cfg.disable_dl = v;
        }
        if let Some(v) = self.disable_ul {
            cfg.disable_ul = v;
        }
        if let Some(v) = self.use_a2a4 {
            cfg.use_a2a4 = v;
        }
        if let Some(v) = self.enable_fading {
            cfg.enable_fading = v;
        }

        let outputs = Outputs {
            trace: self.trace,
            metrics_json: self.metrics_json,
            plan_json: self.plan_json,
            plan_only: self.plan_only,
        };
        Ok((cfg, outputs))
    }
}

struct Outputs {
    trace: bool,
    metrics_json: Option<PathBuf>,
    plan_json: Option<PathBuf>,
    plan_only: bool,
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Error> {
    let raw = serde_json::to_string_pretty(value).map_err(|e| Error::Output {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    fs::write(path, raw).map_err(|source| Error::Output {
        path: path.to_path_buf(),
        source,
    })
}

fn run(args: Args) -> Result<(), Error> {
    let (cfg, outputs) = args.into_config()?;
    let experiment = Experiment::new(cfg);
    let plan = experiment.plan()?;

    if let Some(path) = &outputs.plan_json {
        write_json(path, &plan)?;
    }
    if outputs.plan_only {
        return Ok(());
    }

    let mut stack = SyntheticStack::new();
    let report = experiment.run(&plan, &mut stack, outputs.trace)?;

    for line in &report.trace {
        println!("{line}");
    }
    println!("{}", report.metrics);

    if let Some(path) = &outputs.metrics_json {
        write_json(path, &report.metrics)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    // 初始化 tracing（日志写 stderr，stdout 只留实验输出）
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
