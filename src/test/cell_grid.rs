use crate::error::ConfigError;
use crate::topo::{CellGridBuilder, SiteAnchor, Vec3};

#[test]
fn seven_site_layout_has_21_sectors_in_site_major_order() {
    let builder = CellGridBuilder::seven_site();
    assert_eq!(builder.site_count(), 7);
    assert_eq!(builder.expected_sectors(), 21);

    let grid = builder.build(21).expect("build grid");
    assert_eq!(grid.sector_count(), 21);

    let expected_sites = [
        (0.0, 0.0),
        (500.0, 0.0),
        (0.0, 500.0),
        (500.0, 500.0),
        (1000.0, 500.0),
        (500.0, 1000.0),
        (1000.0, 1000.0),
    ];
    for (site, (x, y)) in grid.sites().iter().zip(expected_sites) {
        assert_eq!(site.position, Vec3::new(x, y, 0.0));
        assert_eq!(site.sectors.len(), 3);
        for sector in &site.sectors {
            assert_eq!(sector.site_id, site.id);
            assert_eq!(sector.position, site.position);
        }
    }

    let ids: Vec<u16> = grid.sites().iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7]);

    let indices: Vec<usize> = grid.sectors().map(|s| s.index).collect();
    assert_eq!(indices, (0..21).collect::<Vec<_>>());
}

#[test]
fn orientations_cycle_per_site() {
    let grid = CellGridBuilder::seven_site().build(21).expect("build grid");
    for site in grid.sites() {
        let orientations: Vec<f64> = site.sectors.iter().map(|s| s.orientation_deg).collect();
        assert_eq!(orientations, vec![0.0, 120.0, 240.0]);
    }
}

#[test]
fn build_is_deterministic() {
    let builder = CellGridBuilder::seven_site();
    let a = builder.build(21).expect("build grid");
    let b = builder.build(21).expect("build grid");
    assert_eq!(a, b);
}

#[test]
fn rejects_sector_count_that_does_not_match_layout() {
    let builder = CellGridBuilder::seven_site();
    for bad in [0, 20, 22, 7] {
        let err = builder.build(bad).expect_err("bad sector count");
        assert!(
            matches!(err, ConfigError::SectorCount { sectors, sites: 7, sectors_per_site: 3 } if sectors == bad),
            "unexpected error {err:?}"
        );
    }
}

#[test]
fn custom_layout_builds_three_sectors_per_anchor() {
    let anchors = vec![
        SiteAnchor {
            id: 1,
            position: Vec3::new(0.0, 0.0, 30.0),
        },
        SiteAnchor {
            id: 2,
            position: Vec3::new(250.0, 0.0, 30.0),
        },
    ];
    let grid = CellGridBuilder::new(anchors, 3).build(6).expect("build grid");
    let got: Vec<(u16, f64)> = grid.sectors().map(|s| (s.site_id, s.orientation_deg)).collect();
    assert_eq!(
        got,
        vec![
            (1, 0.0),
            (1, 120.0),
            (1, 240.0),
            (2, 0.0),
            (2, 120.0),
            (2, 240.0)
        ]
    );
}
