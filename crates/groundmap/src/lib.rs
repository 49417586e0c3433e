//! Walkable ground maps for 2D point-and-click scenes
//!
//! A scene ships a bitmap whose grey pixels mark where characters may walk;
//! the grey level encodes how far from the camera that spot is. This crate
//! bakes the bitmap into a navigation graph once per scene load and answers
//! shortest path and depth queries against it.

mod bitmap;
mod builder;
mod config;
mod context;
mod depth;
mod ground_map;
mod persistence;
mod query;

#[cfg(test)]
mod ground_map_scenario_tests;
#[cfg(test)]
mod test_bitmap_helpers;

#[cfg(feature = "image")]
pub use bitmap::load_bitmap;
pub use bitmap::{DepthMask, GroundBitmap, RgbBitmap};
pub use config::{GroundMapConfig, DEFAULT_BOUNDARY_PRECISION};
pub use context::{BuildContext, BuildStage, ProgressInfo};
pub use ground_map::{BuildStats, GroundEdge, GroundGraph, GroundMap, GroundVertex};
pub use persistence::{GROUND_MAP_MAGIC, GROUND_MAP_VERSION};
pub use query::{ClosestSimplex, Simplex};

pub use groundmap_common::{Error, Point, Result};
