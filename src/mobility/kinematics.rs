//! 终端初始运动学参数生成
//!
//! 每个终端依次抽取 x、y、速率、航向四个独立的均匀随机数，
//! 终端之间互不依赖。

use crate::error::ConfigError;
use crate::topo::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// km/h -> m/s
pub fn kmh_to_mps(kmh: f64) -> f64 {
    kmh * 1000.0 / 3600.0
}

/// 速率范围（km/h），保证 `0 <= min <= max`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedRange {
    min_kmh: f64,
    max_kmh: f64,
}

impl SpeedRange {
    pub fn new(min_kmh: f64, max_kmh: f64) -> Result<Self, ConfigError> {
        for v in [min_kmh, max_kmh] {
            if !v.is_finite() || v < 0.0 {
                return Err(ConfigError::NegativeSpeed(v));
            }
        }
        if min_kmh > max_kmh {
            return Err(ConfigError::SpeedRange {
                min: min_kmh,
                max: max_kmh,
            });
        }
        Ok(Self { min_kmh, max_kmh })
    }

    pub fn min_kmh(&self) -> f64 {
        self.min_kmh
    }

    pub fn max_kmh(&self) -> f64 {
        self.max_kmh
    }

    pub fn min_mps(&self) -> f64 {
        kmh_to_mps(self.min_kmh)
    }

    pub fn max_mps(&self) -> f64 {
        kmh_to_mps(self.max_kmh)
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        uniform(rng, self.min_kmh, self.max_kmh)
    }
}

/// 部署矩形 `[x_min, x_max] x [y_min, y_max]`（米）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeploymentArea {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl DeploymentArea {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Result<Self, ConfigError> {
        let (width, height) = (x_max - x_min, y_max - y_min);
        let finite = [x_min, x_max, y_min, y_max].iter().all(|v| v.is_finite());
        if !(finite && width >= 0.0 && height >= 0.0) {
            return Err(ConfigError::InvalidArea { width, height });
        }
        Ok(Self {
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }

    pub fn contains(&self, p: &Vec3) -> bool {
        (self.x_min..=self.x_max).contains(&p.x) && (self.y_min..=self.y_max).contains(&p.y)
    }
}

impl Default for DeploymentArea {
    /// 覆盖 7 站点布局的 1000 m x 1000 m 区域
    fn default() -> Self {
        Self {
            x_min: 0.0,
            x_max: 1000.0,
            y_min: 0.0,
            y_max: 1000.0,
        }
    }
}

/// 单个终端的初始状态
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerminalKinematics {
    pub id: u32,
    pub position: Vec3,
    /// m/s
    pub velocity: Vec3,
    /// 抽样得到的速率（km/h）
    pub speed_kmh: f64,
    /// 航向（弧度，[0, 2π)）
    pub heading_rad: f64,
}

impl TerminalKinematics {
    pub fn speed_mps(&self) -> f64 {
        self.velocity.norm()
    }

    /// 匀速直线运动下 `t` 秒后的位置
    pub fn position_at(&self, t_secs: f64) -> Vec3 {
        Vec3::new(
            self.position.x + self.velocity.x * t_secs,
            self.position.y + self.velocity.y * t_secs,
            self.position.z + self.velocity.z * t_secs,
        )
    }
}

/// 为 `count` 个终端生成初始位置与速度。
pub fn generate_terminals<R: Rng + ?Sized>(
    count: usize,
    area: &DeploymentArea,
    speeds: &SpeedRange,
    rng: &mut R,
) -> Vec<TerminalKinematics> {
    (0..count)
        .map(|id| {
            let x = uniform(rng, area.x_min, area.x_max);
            let y = uniform(rng, area.y_min, area.y_max);
            let speed_kmh = speeds.sample(rng);
            let heading_rad = uniform(rng, 0.0, 2.0 * PI);
            let speed_mps = kmh_to_mps(speed_kmh);
            TerminalKinematics {
                id: id as u32,
                position: Vec3::new(x, y, 0.0),
                velocity: Vec3::new(
                    speed_mps * heading_rad.cos(),
                    speed_mps * heading_rad.sin(),
                    0.0,
                ),
                speed_kmh,
                heading_rad,
            }
        })
        .collect()
}

/// `[lo, hi)` 均匀抽样；区间退化时直接返回 `lo`。
fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if hi > lo { rng.gen_range(lo..hi) } else { lo }
}
