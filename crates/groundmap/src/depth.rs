//! Depth sampling
//!
//! Walkable grey levels run from 0 (nearest the camera, `front_z`) to 255
//! (farthest, `back_z`).

use groundmap_common::Point;

use crate::ground_map::GroundMap;
use crate::query::{edge_channel, ClosestSimplex, Simplex};

impl GroundMap {
    /// Depth of the character standing at `p`.
    ///
    /// Off the walkable area the value comes from the nearest graph vertex,
    /// or is blended between the endpoints of the nearest edge.
    pub fn z_at_point(&self, p: Point) -> f64 {
        self.depth_from_channel(self.channel_at_point(p))
    }

    /// Grey level used for `p`, possibly fractional when blended along an edge
    pub fn channel_at_point(&self, p: Point) -> f64 {
        if let Some(channel) = self.mask.channel_at(p) {
            return channel as f64;
        }
        match self.closest_simplex(p) {
            Some(ClosestSimplex {
                simplex: Simplex::Vertex(v),
                ..
            }) => self.graph.vertex(v).depth as f64,
            Some(ClosestSimplex {
                simplex: Simplex::Edge(e),
                ..
            }) => edge_channel(&self.graph, e, p),
            // no boundary at all: every pixel is walkable
            None => self.mask.clamped_channel(p).unwrap_or(u8::MAX) as f64,
        }
    }

    /// Maps a grey level to a scene depth
    pub fn depth_from_channel(&self, channel: f64) -> f64 {
        let front = self.config.front_z as f64;
        let back = self.config.back_z as f64;
        back + (front - back) * (1.0 - channel / 255.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::RgbBitmap;
    use crate::config::GroundMapConfig;

    fn gradient_map() -> GroundMap {
        // columns 1..=4 walkable with grey 0, 85, 170, 255; borders are red
        let bitmap = RgbBitmap::from_fn(6, 3, |x, y| {
            if y == 1 && (1..=4).contains(&x) {
                let v = ((x - 1) * 85) as u8;
                [v, v, v]
            } else {
                [255, 0, 0]
            }
        });
        GroundMap::build(&bitmap, GroundMapConfig::new(1000, 0)).unwrap()
    }

    #[test]
    fn test_channel_mapping_bounds() {
        let map = gradient_map();
        assert_eq!(map.depth_from_channel(0.0), 1000.0);
        assert_eq!(map.depth_from_channel(255.0), 0.0);
    }

    #[test]
    fn test_walkable_pixels_use_their_grey() {
        let map = gradient_map();
        assert_eq!(map.z_at_point(Point::new(1.0, 1.0)), 1000.0);
        assert_eq!(map.z_at_point(Point::new(4.2, 0.9)), 0.0);
        let middle = map.z_at_point(Point::new(2.0, 1.0));
        assert!((middle - 1000.0 * (1.0 - 85.0 / 255.0)).abs() < 1e-9);
    }

    #[test]
    fn test_off_map_uses_graph() {
        let map = gradient_map();
        let far_left = map.z_at_point(Point::new(-20.0, 1.0));
        let far_right = map.z_at_point(Point::new(30.0, 1.0));
        assert!(far_left > far_right);
        assert!((0.0..=1000.0).contains(&far_left));
        assert!((0.0..=1000.0).contains(&far_right));
    }

    #[test]
    fn test_open_bitmap_without_graph() {
        let map = GroundMap::build(
            &RgbBitmap::new(4, 4, [255, 255, 255]),
            GroundMapConfig::new(100, 0),
        )
        .unwrap();
        assert_eq!(map.graph().vertex_count(), 0);
        assert_eq!(map.z_at_point(Point::new(0.0, 0.0)), 0.0);
        // clamped onto the bitmap
        assert_eq!(map.z_at_point(Point::new(-5.0, 9.0)), 0.0);
    }
}
