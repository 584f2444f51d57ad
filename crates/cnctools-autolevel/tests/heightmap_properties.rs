use cnctools_autolevel::heightmap::is_collinear;
use cnctools_autolevel::HeightMap;
use cnctools_core::{LevelingError, Point3D};
use proptest::prelude::*;

fn p(x: f64, y: f64, z: f64) -> Point3D {
    Point3D::new(x, y, z)
}

#[test]
fn test_collinear_candidates_are_rejected() {
    let map = HeightMap::from_points(vec![
        p(0.0, 0.0, 0.0),
        p(1.0, 0.0, 0.0),
        p(2.0, 0.0, 0.0),
        p(1.0, 1.0, 5.0),
    ]);

    assert!(is_collinear(&map.points()[0], &map.points()[1], &map.points()[2]));

    // Nearest three are the collinear ones; the fourth must be chosen instead.
    let selected = map.nearest_plane_points(0.9, -0.5);
    assert_eq!(selected.len(), 3);
    assert!(selected.contains(&p(1.0, 1.0, 5.0)));
    assert!(map.height_at(0.9, -0.5).is_ok());
}

#[test]
fn test_vertical_plane_is_reported() {
    let map = HeightMap::from_points(vec![
        p(0.0, 0.0, 0.0),
        p(0.0, 0.0, 1.0),
        p(1.0, 0.0, 0.0),
    ]);
    let err = map.height_at(2.0, 2.0).unwrap_err();
    assert!(matches!(err, LevelingError::InvalidPlane { .. }));
}

#[test]
fn test_two_points_are_insufficient() {
    let map = HeightMap::from_points(vec![p(0.0, 0.0, 0.0), p(5.0, 5.0, 1.0)]);
    assert_eq!(
        map.height_at(1.0, 2.0),
        Err(LevelingError::InsufficientPoints {
            found: 2,
            required: 3
        })
    );
    assert!(HeightMap::new().height_at(0.0, 0.0).is_err());
}

#[test]
fn test_empty_map_exact_lookup_is_none() {
    assert_eq!(HeightMap::new().exact_match(0.0, 0.0), None);
}

fn grid_map(height: f64) -> HeightMap {
    let mut map = HeightMap::new();
    for i in 0..4 {
        for j in 0..3 {
            map.push(p(i as f64 * 25.0, j as f64 * 20.0, height));
        }
    }
    map
}

proptest! {
    #[test]
    fn prop_flat_surface_interpolates_to_its_height(
        height in -5.0f64..5.0,
        x in 0.0f64..75.0,
        y in 0.0f64..40.0,
    ) {
        let map = grid_map(height);
        prop_assert_eq!(map.height_at(x, y).unwrap(), height);
    }

    #[test]
    fn prop_exact_match_wins_over_neighbours(
        heights in proptest::collection::vec(-2.0f64..2.0, 12),
        index in 0usize..12,
    ) {
        let mut map = HeightMap::new();
        for (k, z) in heights.iter().enumerate() {
            map.push(p((k % 4) as f64 * 10.0, (k / 4) as f64 * 10.0, *z));
        }
        let target = map.points()[index];
        prop_assert_eq!(map.height_at(target.x, target.y).unwrap(), target.z);
    }

    #[test]
    fn prop_interpolation_is_deterministic(
        x in -10.0f64..90.0,
        y in -10.0f64..50.0,
    ) {
        let mut map = grid_map(0.0);
        map.push(p(37.5, 10.0, 0.4));
        prop_assert_eq!(map.height_at(x, y), map.height_at(x, y));
    }
}
