//! 实验配置
//!
//! `ExperimentConfig` 保存一次运行的全部参数；`RadioConfig` 与 `TrafficConfig`
//! 是原样转发给外部协议栈的固定参数。

use crate::error::ConfigError;
use crate::handover::HandoverPolicyConfig;
use crate::mobility::SpeedRange;
use crate::sim::SimTime;
use crate::topo::CellGridBuilder;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 默认衰落 trace 路径（相对于外部仿真器的工作目录）
pub const DEFAULT_FADING_TRACE: &str = "src/lte/model/fading-traces/fading_trace_EVA_60kmph.fad";

/// 一次实验的全部参数。JSON 键名使用 camelCase，与命令行参数同名。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ExperimentConfig {
    pub number_of_ues: u16,
    /// 扇区（eNB）总数，必须等于站点数 x 3
    pub number_of_enbs: u16,
    /// 观测窗口（秒）
    pub sim_time: f64,
    pub disable_dl: bool,
    pub disable_ul: bool,
    #[serde(rename = "useA2A4")]
    pub use_a2a4: bool,
    pub enable_fading: bool,
    /// A3-RSRP 迟滞（dB）
    pub hysteresis: f64,
    /// A3-RSRP TTT（ms）
    pub time_to_trigger: u16,
    /// A2-A4-RSRQ 服务小区门限
    pub serving_cell_threshold: u8,
    /// A2-A4-RSRQ 邻区偏置
    pub neighbour_cell_offset: u8,
    /// eNB 发射功率（dBm）
    pub tx_power: f64,
    /// km/h
    pub min_speed: f64,
    /// km/h
    pub max_speed: f64,
    pub fading_trace: PathBuf,
    /// 均匀随机源种子
    pub seed: u64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            number_of_ues: 41,
            number_of_enbs: 21,
            sim_time: 50.0,
            disable_dl: false,
            disable_ul: false,
            use_a2a4: false,
            enable_fading: false,
            hysteresis: 2.0,
            time_to_trigger: 480,
            serving_cell_threshold: 30,
            neighbour_cell_offset: 2,
            tx_power: 46.0,
            min_speed: 20.0,
            max_speed: 120.0,
            fading_trace: PathBuf::from(DEFAULT_FADING_TRACE),
            seed: 1,
        }
    }
}

impl ExperimentConfig {
    /// 从 JSON 文件加载；缺失字段取默认值，未知字段报错。
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 检查本地可检查的约束。策略参数不在此校验，由协议栈负责。
    pub fn validate(&self, grid: &CellGridBuilder, traffic: &TrafficConfig) -> Result<(), ConfigError> {
        self.speed_range()?;
        if !self.sim_time.is_finite() || self.sim_time < 0.0 {
            return Err(ConfigError::InvalidDuration(self.sim_time));
        }
        grid.check_sector_count(usize::from(self.number_of_enbs))?;
        traffic.check_ports(usize::from(self.number_of_ues))
    }

    pub fn speed_range(&self) -> Result<SpeedRange, ConfigError> {
        SpeedRange::new(self.min_speed, self.max_speed)
    }

    pub fn duration(&self) -> SimTime {
        SimTime::from_secs_f64(self.sim_time)
    }

    /// 按 `useA2A4` 选出唯一生效的切换策略；未选中的一组参数不会被引用。
    pub fn handover_policy(&self) -> HandoverPolicyConfig {
        if self.use_a2a4 {
            HandoverPolicyConfig::A2A4Rsrq {
                serving_cell_threshold: self.serving_cell_threshold,
                neighbour_cell_offset: self.neighbour_cell_offset,
            }
        } else {
            HandoverPolicyConfig::A3Rsrp {
                hysteresis_db: self.hysteresis,
                time_to_trigger_ms: self.time_to_trigger,
            }
        }
    }

    pub fn fading(&self) -> Option<FadingConfig> {
        self.enable_fading.then(|| FadingConfig {
            trace_path: self.fading_trace.clone(),
            ..FadingConfig::default()
        })
    }
}

/// 固定的无线侧参数（原样转发给协议栈）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadioConfig {
    pub scheduler: String,
    pub dl_earfcn: u32,
    pub ul_earfcn: u32,
    /// 资源块数
    pub dl_bandwidth_rb: u8,
    pub ul_bandwidth_rb: u8,
    pub antenna_model: String,
    pub horizontal_beamwidth_deg: f64,
    pub use_ideal_rrc: bool,
    pub x2_enabled: bool,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            scheduler: "ns3::RrFfMacScheduler".to_string(),
            dl_earfcn: 100,
            ul_earfcn: 18100,
            dl_bandwidth_rb: 100,
            ul_bandwidth_rb: 100,
            antenna_model: "ns3::CosineAntennaModel".to_string(),
            horizontal_beamwidth_deg: 65.0,
            use_ideal_rrc: true,
            x2_enabled: true,
        }
    }
}

/// 衰落模型参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FadingConfig {
    pub trace_path: PathBuf,
    pub window: SimTime,
    pub samples: u32,
}

impl Default for FadingConfig {
    fn default() -> Self {
        Self {
            trace_path: PathBuf::from(DEFAULT_FADING_TRACE),
            window: SimTime::from_millis(500),
            samples: 100_000,
        }
    }
}

/// full-buffer 业务参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficConfig {
    pub dl_port: u16,
    pub ul_port: u16,
    pub rate_bps: u64,
    pub packet_bytes: u32,
    /// 每条流起始时间在 [0, start_jitter] 内均匀抖动
    pub start_jitter: SimTime,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            dl_port: 10_000,
            ul_port: 20_000,
            rate_bps: 10_000_000_000,
            packet_bytes: 1400,
            start_jitter: SimTime::from_millis(10),
        }
    }
}

impl TrafficConfig {
    /// 上下行端口区间不能溢出，也不能互相重叠。
    pub fn check_ports(&self, terminals: usize) -> Result<(), ConfigError> {
        let end = |base: u16| {
            usize::from(base)
                .checked_add(terminals)
                .filter(|end| *end <= usize::from(u16::MAX))
                .ok_or(ConfigError::PortOverflow {
                    base,
                    count: terminals,
                })
        };
        let dl_end = end(self.dl_port)?;
        let ul_end = end(self.ul_port)?;
        let (dl, ul) = (usize::from(self.dl_port), usize::from(self.ul_port));
        if terminals > 0 && dl < ul_end && ul < dl_end {
            return Err(ConfigError::PortOverlap {
                dl: self.dl_port,
                ul: self.ul_port,
                count: terminals,
            });
        }
        Ok(())
    }
}
