//! The baked ground map of one scene

use groundmap_common::debug::{DebugConfig, DebugDraw, DebugVisualize, GroundColors};
use groundmap_common::{Graph, Point, VertexId};

use crate::bitmap::DepthMask;
use crate::config::GroundMapConfig;

/// Vertex payload: scene position and the grey level of the walkable side
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct GroundVertex {
    pub point: Point,
    pub depth: u8,
}

/// Edge payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct GroundEdge {
    /// `true` for edges traced from the bitmap, `false` for visibility shortcuts
    pub boundary: bool,
}

impl GroundEdge {
    pub const BOUNDARY: GroundEdge = GroundEdge { boundary: true };
    pub const SHORTCUT: GroundEdge = GroundEdge { boundary: false };
}

/// Undirected walkable graph
pub type GroundGraph = Graph<GroundVertex, GroundEdge>;

/// Counters collected while baking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct BuildStats {
    /// Vertices traced before simplification
    pub raw_vertices: usize,
    /// Edges traced before simplification
    pub raw_edges: usize,
    /// Vertices left in the final graph
    pub vertices: usize,
    /// Boundary edges left after simplification
    pub boundary_edges: usize,
    /// Visibility edges added on top of the boundary
    pub shortcut_edges: usize,
}

/// Walkability mask plus navigation graph for one scene.
///
/// Built once by [`GroundMap::build`] (or loaded from a baked file) and never
/// mutated afterwards; queries run on private copies of the graph.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct GroundMap {
    pub(crate) config: GroundMapConfig,
    pub(crate) mask: DepthMask,
    pub(crate) graph: GroundGraph,
    pub(crate) stats: BuildStats,
}

impl GroundMap {
    pub fn config(&self) -> &GroundMapConfig {
        &self.config
    }

    pub fn mask(&self) -> &DepthMask {
        &self.mask
    }

    pub fn graph(&self) -> &GroundGraph {
        &self.graph
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    pub fn width(&self) -> u32 {
        self.mask.width()
    }

    pub fn height(&self) -> u32 {
        self.mask.height()
    }

    /// Whether a character may stand on `p`
    pub fn is_ground_point(&self, p: Point) -> bool {
        self.mask.channel_at(p).is_some()
    }

    /// Visits every graph vertex position
    pub fn for_each_vertex(&self, mut f: impl FnMut(Point)) {
        for v in self.graph.vertices() {
            f(self.graph.vertex(v).point);
        }
    }

    /// Visits every edge as `(source, target, is_boundary)`
    pub fn for_each_edge(&self, mut f: impl FnMut(Point, Point, bool)) {
        for e in self.graph.edges() {
            let (source, target) = self.graph.endpoints(e);
            f(
                self.graph.vertex(source).point,
                self.graph.vertex(target).point,
                self.graph.edge(e).boundary,
            );
        }
    }

    pub fn vertices(&self) -> impl Iterator<Item = Point> + '_ {
        self.graph.vertices().map(|v| self.graph.vertex(v).point)
    }

    pub fn edges(&self) -> impl Iterator<Item = (Point, Point, bool)> + '_ {
        self.graph.edges().map(|e| {
            let (source, target) = self.graph.endpoints(e);
            (
                self.point(source),
                self.point(target),
                self.graph.edge(e).boundary,
            )
        })
    }

    fn point(&self, v: VertexId) -> Point {
        self.graph.vertex(v).point
    }

    /// Adds a computed path to a debug overlay, starting from `origin`
    pub fn draw_path(draw: &mut DebugDraw, origin: Point, path: &[Point]) {
        let mut previous = origin;
        for &p in path {
            draw.thick_line(previous, p, GroundColors::PATH, 2.0);
            previous = p;
        }
    }
}

impl DebugVisualize for GroundMap {
    fn debug_draw(&self, debug_draw: &mut DebugDraw, config: &DebugConfig) {
        for (source, target, boundary) in self.edges() {
            if boundary && config.show_boundary_edges {
                debug_draw.line(source, target, GroundColors::BOUNDARY);
            } else if !boundary && config.show_shortcut_edges {
                debug_draw.line(source, target, GroundColors::SHORTCUT);
            }
        }
        if config.show_vertices {
            for p in self.vertices() {
                debug_draw.circle(p, config.vertex_radius, GroundColors::VERTEX);
            }
        }
    }
}
