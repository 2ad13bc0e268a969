//! 小区网格构建
//!
//! 标准布局：7 个站点按 2/3/2 三行排列，每个站点 3 个共址扇区，共 21 个小区。
//!
//! ```text
//! y=1000            s6(500)   s7(1000)
//! y=500   s3(0)     s4(500)   s5(1000)
//! y=0     s1(0)     s2(500)
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// 每个站点的扇区数
pub const SECTORS_PER_SITE: usize = 3;
/// 相邻扇区的方位角间隔（度）
pub const SECTOR_SPACING_DEG: f64 = 120.0;

/// 三维坐标（米）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance(&self, other: &Vec3) -> f64 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z).norm()
    }
}

/// 站点锚点：站点编号从 1 开始
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiteAnchor {
    pub id: u16,
    pub position: Vec3,
}

/// 扇区（一个外部管理的无线小区）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    /// 全局顺序编号（0 起，站点优先、扇区其次）
    pub index: usize,
    pub site_id: u16,
    pub position: Vec3,
    /// 天线方位角（度）
    pub orientation_deg: f64,
}

/// 站点及其扇区
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: u16,
    pub position: Vec3,
    pub sectors: Vec<Sector>,
}

/// 构建完成的网格；构建后不可变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellGrid {
    sites: Vec<Site>,
}

impl CellGrid {
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// 按站点优先、扇区其次的顺序遍历所有扇区
    pub fn sectors(&self) -> impl Iterator<Item = &Sector> + '_ {
        self.sites.iter().flat_map(|s| s.sectors.iter())
    }

    pub fn sector_count(&self) -> usize {
        self.sites.iter().map(|s| s.sectors.len()).sum()
    }
}

/// 确定性的网格生成器：不使用任何随机源
#[derive(Debug, Clone)]
pub struct CellGridBuilder {
    anchors: Vec<SiteAnchor>,
    sectors_per_site: usize,
}

impl CellGridBuilder {
    pub fn new(anchors: Vec<SiteAnchor>, sectors_per_site: usize) -> Self {
        Self {
            anchors,
            sectors_per_site,
        }
    }

    /// 标准 7 站点 2/3/2 布局
    pub fn seven_site() -> Self {
        const ROWS: [(f64, &[f64]); 3] = [
            (0.0, &[0.0, 500.0]),
            (500.0, &[0.0, 500.0, 1000.0]),
            (1000.0, &[500.0, 1000.0]),
        ];
        let anchors = ROWS
            .iter()
            .flat_map(|(y, xs)| xs.iter().map(move |x| Vec3::new(*x, *y, 0.0)))
            .zip(1_u16..)
            .map(|(position, id)| SiteAnchor { id, position })
            .collect();
        Self::new(anchors, SECTORS_PER_SITE)
    }

    pub fn site_count(&self) -> usize {
        self.anchors.len()
    }

    pub fn sectors_per_site(&self) -> usize {
        self.sectors_per_site
    }

    pub fn expected_sectors(&self) -> usize {
        self.anchors.len() * self.sectors_per_site
    }

    /// 校验扇区总数能否被该布局表示
    pub fn check_sector_count(&self, sectors: usize) -> Result<(), ConfigError> {
        if sectors == self.expected_sectors() && self.sectors_per_site > 0 {
            Ok(())
        } else {
            Err(ConfigError::SectorCount {
                sectors,
                sites: self.anchors.len(),
                sectors_per_site: self.sectors_per_site,
            })
        }
    }

    /// 生成站点与扇区。扇区 i 的方位角为 `(i mod 3) * 120°`。
    pub fn build(&self, sectors: usize) -> Result<CellGrid, ConfigError> {
        self.check_sector_count(sectors)?;

        let mut index = 0;
        let sites = self
            .anchors
            .iter()
            .map(|anchor| {
                let sectors = (0..self.sectors_per_site)
                    .map(|_| {
                        let sector = Sector {
                            index,
                            site_id: anchor.id,
                            position: anchor.position,
                            orientation_deg: orientation_for(index),
                        };
                        index += 1;
                        sector
                    })
                    .collect();
                Site {
                    id: anchor.id,
                    position: anchor.position,
                    sectors,
                }
            })
            .collect();

        Ok(CellGrid { sites })
    }
}

impl Default for CellGridBuilder {
    fn default() -> Self {
        Self::seven_site()
    }
}

/// 全局扇区编号对应的天线方位角（度）
pub fn orientation_for(sector_index: usize) -> f64 {
    (sector_index % SECTORS_PER_SITE) as f64 * SECTOR_SPACING_DEG
}
