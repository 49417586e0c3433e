//! Debug visualization utilities for ground maps
//!
//! Renderer-agnostic primitives: a ground map emits lines and circles into a
//! [`DebugDraw`] and the host engine draws them however it likes.

mod visualization;

pub use visualization::*;

use crate::Point;

/// Color representation for debug visualization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Creates a new color
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from RGB values (alpha = 1.0)
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Creates a color from RGB bytes (alpha = 1.0)
    pub const fn from_rgb_bytes(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const GRAY: Color = Color::rgb(0.5, 0.5, 0.5);
}

/// Debug line in scene coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct DebugLine {
    pub start: Point,
    pub end: Point,
    pub color: Color,
    pub thickness: f32,
}

impl DebugLine {
    pub fn new(start: Point, end: Point, color: Color) -> Self {
        Self {
            start,
            end,
            color,
            thickness: 1.0,
        }
    }
}

/// Debug circle (or square marker, at the renderer's discretion)
#[derive(Debug, Clone, PartialEq)]
pub struct DebugCircle {
    pub center: Point,
    pub radius: f32,
    pub color: Color,
}

/// Collection of debug drawing primitives
#[derive(Debug, Default)]
pub struct DebugDraw {
    pub lines: Vec<DebugLine>,
    pub circles: Vec<DebugCircle>,
}

impl DebugDraw {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.circles.clear();
    }

    pub fn line(&mut self, start: Point, end: Point, color: Color) {
        self.lines.push(DebugLine::new(start, end, color));
    }

    pub fn thick_line(&mut self, start: Point, end: Point, color: Color, thickness: f32) {
        self.lines.push(DebugLine {
            start,
            end,
            color,
            thickness,
        });
    }

    pub fn circle(&mut self, center: Point, radius: f32, color: Color) {
        self.circles.push(DebugCircle {
            center,
            radius,
            color,
        });
    }

    /// Gets the total number of debug primitives
    pub fn primitive_count(&self) -> usize {
        self.lines.len() + self.circles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitive_count() == 0
    }
}

/// Debug visualization configuration
#[derive(Debug, Clone)]
pub struct DebugConfig {
    /// Whether to mark graph vertices
    pub show_vertices: bool,
    /// Whether to draw edges extracted from the bitmap
    pub show_boundary_edges: bool,
    /// Whether to draw visibility shortcut edges
    pub show_shortcut_edges: bool,
    /// Marker radius for vertices, in scene pixels
    pub vertex_radius: f32,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            show_vertices: true,
            show_boundary_edges: true,
            show_shortcut_edges: true,
            vertex_radius: 5.0,
        }
    }
}
