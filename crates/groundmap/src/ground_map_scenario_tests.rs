//! End-to-end tests of baking and querying whole scenes

#[cfg(test)]
mod tests {
    use crate::test_bitmap_helpers::{bitmap_from_rows, bridge_bitmap, islands_bitmap};
    use crate::{GroundMap, GroundMapConfig, RgbBitmap};
    use groundmap_common::{Error, Point, Result};

    fn bridge_map() -> Result<GroundMap> {
        GroundMap::build(&bridge_bitmap(), GroundMapConfig::new(100, 0))
    }

    /// Height at which each path segment crosses the vertical line `x`
    fn crossings_at_x(origin: Point, path: &[Point], x: f64) -> Vec<f64> {
        let mut previous = origin;
        let mut ys = Vec::new();
        for &p in path {
            let (lo, hi) = if previous.x < p.x {
                (previous, p)
            } else {
                (p, previous)
            };
            if lo.x <= x && x <= hi.x && lo.x != hi.x {
                let t = (x - lo.x) / (hi.x - lo.x);
                ys.push(lo.y + t * (hi.y - lo.y));
            }
            previous = p;
        }
        ys
    }

    #[test]
    fn test_open_square() -> Result<()> {
        let map = GroundMap::build(
            &RgbBitmap::new(4, 4, [255, 255, 255]),
            GroundMapConfig::new(100, 0),
        )?;

        let path = map.find_path(Point::new(0.0, 0.0), Point::new(3.0, 3.0))?;
        assert_eq!(path, vec![Point::new(3.0, 3.0)]);
        // white is the far end of the depth range
        assert_eq!(map.z_at_point(Point::new(0.0, 0.0)), 0.0);
        Ok(())
    }

    #[test]
    fn test_ground_point_to_itself() -> Result<()> {
        let map = bridge_map()?;
        for p in [Point::new(3.0, 4.0), Point::new(15.0, 9.0), Point::new(25.5, 17.2)] {
            assert!(map.is_ground_point(p));
            assert!(map.find_path(p, p)?.is_empty());
        }
        assert!(!map.is_ground_point(Point::new(15.0, 4.0)));
        assert!(!map.is_ground_point(Point::new(-3.0, 4.0)));
        Ok(())
    }

    #[test]
    fn test_distinct_points_snapping_together() -> Result<()> {
        let map = bridge_map()?;
        let (origin, target) = (Point::new(-50.0, -50.0), Point::new(-60.0, -52.0));
        assert_ne!(origin, target);

        let snapped = map.closest_simplex(origin).map(|c| c.point);
        assert_eq!(snapped, map.closest_simplex(target).map(|c| c.point));
        assert!(map.find_path(origin, target)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_straight_corridor() -> Result<()> {
        let map = GroundMap::build(
            &bitmap_from_rows(&[
                "############", //
                "............",
                "############",
            ]),
            GroundMapConfig::default(),
        )?;
        let target = Point::new(10.0, 1.0);
        assert_eq!(map.find_path(Point::new(1.0, 1.0), target)?, vec![target]);
        Ok(())
    }

    #[test]
    fn test_path_crosses_bridge() -> Result<()> {
        let map = bridge_map()?;
        let (origin, target) = (Point::new(5.0, 5.0), Point::new(24.0, 5.0));

        let path = map.find_path(origin, target)?;
        assert!(path.len() > 1, "path through the gap: {path:?}");
        assert_eq!(path.last(), Some(&target));

        // every crossing of the gap centre happens on the bridge row
        let crossings = crossings_at_x(origin, &path, 14.5);
        assert!(!crossings.is_empty());
        for y in crossings {
            assert!((8.5 - 1e-9..=9.5 + 1e-9).contains(&y), "crossed gap at y={y}");
        }
        Ok(())
    }

    #[test]
    fn test_off_map_origin_is_snapped() -> Result<()> {
        let map = bridge_map()?;
        // inside the gap, nearest to the left room's right wall
        let origin = Point::new(14.0, 3.0);
        assert!(!map.is_ground_point(origin));

        let snapped = map.closest_simplex(origin).map(|c| c.point);
        assert_eq!(snapped, Some(Point::new(10.5, 3.0)));

        let path = map.find_path(origin, Point::new(24.0, 5.0))?;
        assert_eq!(path.first().copied(), snapped);
        assert_eq!(path.last(), Some(&Point::new(24.0, 5.0)));

        // back into the left room: a straight step from the wall
        let path = map.find_path(origin, Point::new(5.0, 5.0))?;
        assert_eq!(path, vec![Point::new(10.5, 3.0), Point::new(5.0, 5.0)]);
        Ok(())
    }

    #[test]
    fn test_off_map_target_is_snapped() -> Result<()> {
        let map = bridge_map()?;
        let path = map.find_path(Point::new(5.0, 5.0), Point::new(5.0, -10.0))?;
        let last = path.last().copied().unwrap();
        assert!((last.y - 0.5).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_queries_are_idempotent() -> Result<()> {
        let map = bridge_map()?;
        let (origin, target) = (Point::new(14.0, 3.0), Point::new(26.0, 16.0));
        let first = map.find_path(origin, target)?;
        let second = map.find_path(origin, target)?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_queries_leave_baked_graph_alone() -> Result<()> {
        let map = bridge_map()?;
        let before = map.graph().clone();

        let queries = [
            (Point::new(5.0, 5.0), Point::new(24.0, 5.0)),
            (Point::new(14.0, 3.0), Point::new(2.0, 17.0)),
            (Point::new(-4.0, -4.0), Point::new(40.0, 30.0)),
            (Point::new(3.0, 3.0), Point::new(3.0, 3.0)),
        ];
        for (origin, target) in queries {
            map.find_path(origin, target)?;
        }

        assert_eq!(map.graph(), &before);
        Ok(())
    }

    #[test]
    fn test_baked_graph_has_no_orphans() -> Result<()> {
        for map in [bridge_map()?, GroundMap::build(&islands_bitmap(), GroundMapConfig::default())?] {
            let graph = map.graph();
            assert!(graph.vertex_count() > 0);
            assert!(graph.vertices().all(|v| graph.degree(v) >= 1));
            assert!(graph.validity());
            for e in graph.edges() {
                let (a, b) = graph.endpoints(e);
                assert!(a.index() < graph.vertex_count() && b.index() < graph.vertex_count());
            }
        }
        Ok(())
    }

    #[test]
    fn test_vertex_depth_round_trip() -> Result<()> {
        let bitmap = RgbBitmap::from_fn(12, 8, |x, y| {
            if (2..=9).contains(&x) && (2..=5).contains(&y) {
                [200, 200, 200]
            } else {
                [0, 0, 255]
            }
        });
        let map = GroundMap::build(&bitmap, GroundMapConfig::new(640, 40))?;
        let expected = map.depth_from_channel(200.0);

        let mut checked = 0;
        map.for_each_vertex(|p| {
            assert!((map.z_at_point(p) - expected).abs() < 1e-9, "depth at {p}");
            checked += 1;
        });
        assert!(checked > 0);
        Ok(())
    }

    #[test]
    fn test_queries_from_everywhere() -> Result<()> {
        let map = bridge_map()?;
        let targets = [
            Point::new(5.0, 5.0),
            Point::new(24.0, 15.0),
            Point::new(14.0, 9.0),
            Point::new(14.0, 2.0),
        ];

        for x in (0..30).step_by(3) {
            for y in (0..20).step_by(3) {
                let origin = Point::new(x as f64, y as f64);
                for target in targets {
                    let path = map.find_path(origin, target)?;
                    let expected = if map.is_ground_point(target) {
                        target
                    } else {
                        map.closest_simplex(target).unwrap().point
                    };
                    assert!(
                        path.last().map_or(true, |&p| p == expected),
                        "{origin} -> {target} ended at {:?}",
                        path.last()
                    );
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_disconnected_rooms() -> Result<()> {
        let map = GroundMap::build(&islands_bitmap(), GroundMapConfig::default())?;
        let result = map.find_path(Point::new(3.0, 3.0), Point::new(15.0, 3.0));
        assert!(matches!(result, Err(Error::NoPath { .. })));

        // each room is still navigable on its own
        assert!(map.find_path(Point::new(2.0, 2.0), Point::new(6.0, 7.0)).is_ok());
        Ok(())
    }
}
