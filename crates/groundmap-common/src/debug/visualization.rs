//! Navigation-specific visualization traits
//!
//! Implemented by the higher-level crate without the common crate knowing
//! about ground maps.

use super::{Color, DebugConfig, DebugDraw};

/// Trait for types that can be visualized in debug mode
pub trait DebugVisualize {
    /// Draws debug visualization for this type
    fn debug_draw(&self, debug_draw: &mut DebugDraw, config: &DebugConfig);
}

/// Colors used for the walkable graph overlay
#[derive(Debug, Clone, Copy)]
pub struct GroundColors;

impl GroundColors {
    /// Edges extracted from the walkability mask
    pub const BOUNDARY: Color = Color::RED;

    /// Visibility shortcut edges
    pub const SHORTCUT: Color = Color::BLUE;

    pub const VERTEX: Color = Color::WHITE;

    /// Planned character path
    pub const PATH: Color = Color::GREEN;
}
