//! Common utilities and data structures shared by the ground map crates

pub mod debug;
mod geometry;
mod graph;

pub use geometry::*;
pub use graph::*;

/// A point (or vector) in scene pixel space
pub type Point = glam::DVec2;

/// Error types for the library
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("malformed bitmap: {0}")]
    MalformedBitmap(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("no path from {origin} to {target}")]
    NoPath { origin: Point, target: Point },

    #[error("corrupted ground map data: {0}")]
    DataCorrupted(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ground map operations
pub type Result<T> = std::result::Result<T, Error>;
