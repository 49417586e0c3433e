//! Bitmap construction helpers for tests
//!
//! Rows are drawn as text: `#` is an obstacle (pure red), `.` is white
//! ground and `o` is mid-grey ground.

use std::path::PathBuf;

use crate::bitmap::{DepthMask, RgbBitmap};

pub const OBSTACLE: [u8; 3] = [255, 0, 0];
pub const GROUND: [u8; 3] = [255, 255, 255];
pub const GREY_GROUND: [u8; 3] = [128, 128, 128];

/// Builds a bitmap from equally long text rows
pub fn bitmap_from_rows(rows: &[&str]) -> RgbBitmap {
    let height = rows.len() as u32;
    let width = rows.first().map_or(0, |r| r.len()) as u32;
    assert!(rows.iter().all(|r| r.len() == width as usize), "ragged rows");

    RgbBitmap::from_fn(width, height, |x, y| {
        match rows[y as usize].as_bytes()[x as usize] {
            b'#' => OBSTACLE,
            b'.' => GROUND,
            b'o' => GREY_GROUND,
            other => panic!("unknown bitmap cell {:?}", other as char),
        }
    })
}

pub fn mask_from_rows(rows: &[&str]) -> DepthMask {
    DepthMask::from_bitmap(&bitmap_from_rows(rows)).unwrap()
}

/// Two tall rooms joined by a one-pixel bridge halfway down.
///
/// Rooms span x in 1..=10 and 19..=28, y in 1..=18; the bridge is row 9.
/// Everything else, including the gap x in 11..=18, is an obstacle.
pub fn bridge_bitmap() -> RgbBitmap {
    RgbBitmap::from_fn(30, 20, |x, y| {
        let in_rows = (1..=18).contains(&y);
        let left = (1..=10).contains(&x);
        let right = (19..=28).contains(&x);
        let bridge = y == 9 && (11..=18).contains(&x);
        if (in_rows && (left || right)) || bridge {
            GROUND
        } else {
            OBSTACLE
        }
    })
}

/// Two rooms separated by a full-height wall
pub fn islands_bitmap() -> RgbBitmap {
    RgbBitmap::from_fn(20, 10, |x, y| {
        let in_rows = (1..=8).contains(&y);
        if in_rows && ((1..=7).contains(&x) || (12..=18).contains(&x)) {
            GROUND
        } else {
            OBSTACLE
        }
    })
}

/// Scratch file path unique to this test process
pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("groundmap_{}_{name}", std::process::id()))
}
