//! 错误类型
//!
//! 配置阶段的错误全部是致命的：在仿真时间推进之前就返回，不会打印任何指标。

use std::path::PathBuf;
use thiserror::Error;

/// 本地可检查的配置错误（在调用无线协议栈之前检测）。
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("minSpeed ({min} km/h) must not exceed maxSpeed ({max} km/h)")]
    SpeedRange { min: f64, max: f64 },
    #[error("speed must be finite and non-negative, got {0} km/h")]
    NegativeSpeed(f64),
    #[error("sector count {sectors} does not match {sites} sites x {sectors_per_site} sectors")]
    SectorCount {
        sectors: usize,
        sites: usize,
        sectors_per_site: usize,
    },
    #[error("simTime must be finite and non-negative, got {0} s")]
    InvalidDuration(f64),
    #[error("deployment area must have finite, non-negative extent, got {width} x {height} m")]
    InvalidArea { width: f64, height: f64 },
    #[error("port range starting at {base} with {count} terminals overflows u16")]
    PortOverflow { base: u16, count: usize },
    #[error("downlink ports [{dl}, +{count}) overlap uplink ports [{ul}, +{count})")]
    PortOverlap { dl: u16, ul: u16, count: usize },
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// 外部协议栈在安装/配置阶段拒绝的参数。
#[derive(Debug, Error)]
pub enum StackError {
    #[error("unknown handover algorithm type {0:?}")]
    UnknownAlgorithm(String),
    #[error("handover algorithm {algorithm:?} has no attribute {attribute:?}")]
    UnknownAttribute { algorithm: String, attribute: String },
    #[error("attribute {attribute:?} of {algorithm:?} expects a {expected} value")]
    AttributeType {
        algorithm: String,
        attribute: String,
        expected: &'static str,
    },
    #[error("attribute {attribute:?} of {algorithm:?} out of range: {value}")]
    AttributeRange {
        algorithm: String,
        attribute: String,
        value: String,
    },
    #[error("fading trace {} is not readable", path.display())]
    FadingTrace { path: PathBuf },
    #[error("{0} must be installed before the run starts")]
    NotInstalled(&'static str),
    #[error("stack was already run; create a new stack for another run")]
    AlreadyRun,
}

/// crate 顶层错误
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("radio stack rejected configuration: {0}")]
    Stack(#[from] StackError),
    #[error("failed to write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
