//! 拓扑构建
//!
//! 多站点、多扇区的小区网格布局。

pub mod cell_grid;

pub use cell_grid::{
    CellGrid, CellGridBuilder, SECTOR_SPACING_DEG, SECTORS_PER_SITE, Sector, Site, SiteAnchor,
    Vec3,
};
