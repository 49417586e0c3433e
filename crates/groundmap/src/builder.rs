//! Ground map baking: boundary tracing, simplification, and visibility edges
//!
//! The walkable region of the bitmap is outlined along pixel borders, the
//! outline is thinned by collapsing nearly collinear vertices, and finally
//! every pair of vertices that can see each other across walkable ground is
//! linked so that the shortest path search does not have to hug the walls.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use groundmap_common::{Line, Point, Result, Segment, VertexId};

use crate::bitmap::{DepthMask, GroundBitmap};
use crate::config::GroundMapConfig;
use crate::context::{BuildContext, BuildStage};
use crate::ground_map::{BuildStats, GroundEdge, GroundGraph, GroundMap, GroundVertex};

const BUILD_STEPS: usize = 3;

impl GroundMap {
    /// Bakes the ground map of a scene bitmap
    pub fn build<B: GroundBitmap + ?Sized>(bitmap: &B, config: GroundMapConfig) -> Result<Self> {
        let mut ctx = BuildContext::new();
        Self::build_with_context(bitmap, config, &mut ctx)
    }

    /// Bakes the ground map, reporting timings and progress through `ctx`
    pub fn build_with_context<B: GroundBitmap + ?Sized>(
        bitmap: &B,
        config: GroundMapConfig,
        ctx: &mut BuildContext,
    ) -> Result<Self> {
        config.validate()?;
        let mask = DepthMask::from_bitmap(bitmap)?;

        ctx.start_timer(BuildStage::Total);
        ctx.log_info(format!(
            "building ground map for {}x{} bitmap",
            mask.width(),
            mask.height()
        ));

        ctx.set_progress(0, BUILD_STEPS, "tracing walkable boundary");
        ctx.start_timer(BuildStage::EdgeExtraction);
        let mut graph = extract_boundary(&mask);
        ctx.stop_timer(BuildStage::EdgeExtraction);

        let mut stats = BuildStats {
            raw_vertices: graph.vertex_count(),
            raw_edges: graph.edge_count(),
            ..Default::default()
        };
        log::debug!(
            "traced {} boundary vertices and {} edges",
            stats.raw_vertices,
            stats.raw_edges
        );

        ctx.set_progress(1, BUILD_STEPS, "simplifying boundary");
        ctx.start_timer(BuildStage::Simplification);
        simplify_boundary(&mut graph, config.precision);
        ctx.stop_timer(BuildStage::Simplification);
        stats.boundary_edges = graph.edge_count();
        log::debug!(
            "simplified boundary to {} vertices and {} edges",
            graph.vertex_count(),
            graph.edge_count()
        );

        ctx.set_progress(2, BUILD_STEPS, "linking visible vertices");
        ctx.start_timer(BuildStage::Visibility);
        stats.shortcut_edges = add_visibility_edges(&mut graph, &mask);
        ctx.stop_timer(BuildStage::Visibility);
        stats.vertices = graph.vertex_count();
        log::debug!("added {} visibility edges", stats.shortcut_edges);

        ctx.set_progress(BUILD_STEPS, BUILD_STEPS, "ground map ready");
        ctx.stop_timer(BuildStage::Total);
        ctx.log_info(format!(
            "ground map built: {} vertices, {} boundary edges, {} shortcuts",
            stats.vertices, stats.boundary_edges, stats.shortcut_edges
        ));

        Ok(Self {
            config,
            mask,
            graph,
            stats,
        })
    }
}

/// Emits one boundary edge per walkable/non-walkable pixel pair.
///
/// Pixel corners are keyed by their doubled coordinates so that shared
/// corners map to a single vertex.
pub(crate) fn extract_boundary(mask: &DepthMask) -> GroundGraph {
    let mut graph = GroundGraph::new();
    let mut corners: HashMap<(i64, i64), VertexId> = HashMap::new();
    let (width, height) = (mask.width() as i64, mask.height() as i64);

    let mut corner = |graph: &mut GroundGraph, key: (i64, i64), depth: u8| -> VertexId {
        *corners.entry(key).or_insert_with(|| {
            graph.add_vertex(GroundVertex {
                point: Point::new(key.0 as f64 * 0.5, key.1 as f64 * 0.5),
                depth,
            })
        })
    };

    for y in 0..height {
        for x in 0..width {
            let here = mask.channel(x, y);

            if x + 1 < width {
                let right = mask.channel(x + 1, y);
                if let Some(depth) = crossing_depth(here, right) {
                    let a = corner(&mut graph, (2 * x + 1, 2 * y - 1), depth);
                    let b = corner(&mut graph, (2 * x + 1, 2 * y + 1), depth);
                    graph.add_edge(a, b, GroundEdge::BOUNDARY);
                }
            }

            if y + 1 < height {
                let below = mask.channel(x, y + 1);
                if let Some(depth) = crossing_depth(here, below) {
                    let a = corner(&mut graph, (2 * x - 1, 2 * y + 1), depth);
                    let b = corner(&mut graph, (2 * x + 1, 2 * y + 1), depth);
                    graph.add_edge(a, b, GroundEdge::BOUNDARY);
                }
            }
        }
    }

    graph
}

/// Grey level of the walkable side when exactly one side is walkable
fn crossing_depth(a: Option<u8>, b: Option<u8>) -> Option<u8> {
    match (a, b) {
        (Some(depth), None) | (None, Some(depth)) => Some(depth),
        _ => None,
    }
}

/// Collapse candidate, ordered by deviation then vertex id
#[derive(Debug, Clone, Copy)]
struct Candidate {
    deviation: f64,
    vertex: VertexId,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.deviation
            .total_cmp(&other.deviation)
            .then_with(|| self.vertex.cmp(&other.vertex))
    }
}

/// Distance from a degree-2 vertex to the line through its neighbours.
///
/// `None` when collapsing the vertex would create a self-loop or a duplicate
/// edge.
fn deviation(graph: &GroundGraph, v: VertexId) -> Option<f64> {
    if graph.degree(v) != 2 {
        return None;
    }
    let a = graph.incident_vertex(v, 0);
    let b = graph.incident_vertex(v, 1);
    if a == b || graph.find_edge(a, b).is_some() {
        return None;
    }
    let line = Line::new(graph.vertex(a).point, graph.vertex(b).point);
    Some(line.distance(graph.vertex(v).point))
}

/// Greedily collapses the flattest degree-2 vertices while their deviation
/// stays below `precision`, then compacts the graph.
pub(crate) fn simplify_boundary(graph: &mut GroundGraph, precision: f64) {
    let mut queue = CollapseQueue::new(graph.vertex_count());
    for v in graph.vertices() {
        queue.update(graph, v);
    }

    let mut collapsed = 0usize;
    while let Some(candidate) = queue.pop() {
        let v = candidate.vertex;
        // A collapse elsewhere may have linked the two neighbours of `v`
        if deviation(graph, v) != Some(candidate.deviation) {
            queue.update(graph, v);
            continue;
        }
        if candidate.deviation >= precision {
            break;
        }

        let e0 = graph.incident_edge(v, 0);
        let e1 = graph.incident_edge(v, 1);
        let a = graph.opposite(e0, v);
        let b = graph.opposite(e1, v);
        let boundary = graph.edge(e0).boundary && graph.edge(e1).boundary;

        graph.delete_edge(e0);
        graph.delete_edge(e1);
        graph.add_edge(a, b, GroundEdge { boundary });
        collapsed += 1;

        queue.update(graph, a);
        queue.update(graph, b);
    }

    log::trace!("collapsed {collapsed} boundary vertices");
    graph.clean();
    debug_assert!(graph.validity());
}

/// Ordered collapse candidates with at most one entry per vertex
struct CollapseQueue {
    set: BTreeSet<Candidate>,
    queued: Vec<Option<f64>>,
}

impl CollapseQueue {
    fn new(vertex_count: usize) -> Self {
        Self {
            set: BTreeSet::new(),
            queued: vec![None; vertex_count],
        }
    }

    /// Replaces the entry of `v` with its current deviation, if any
    fn update(&mut self, graph: &GroundGraph, v: VertexId) {
        if let Some(old) = self.queued[v.index()].take() {
            self.set.remove(&Candidate {
                deviation: old,
                vertex: v,
            });
        }
        if let Some(deviation) = deviation(graph, v) {
            self.set.insert(Candidate {
                deviation,
                vertex: v,
            });
            self.queued[v.index()] = Some(deviation);
        }
    }

    fn pop(&mut self) -> Option<Candidate> {
        let candidate = self.set.pop_first()?;
        self.queued[candidate.vertex.index()] = None;
        Some(candidate)
    }
}

/// Boundary edge as a plain segment plus its endpoint ids
#[derive(Debug, Clone, Copy)]
pub(crate) struct Wall {
    pub source: VertexId,
    pub target: VertexId,
    pub segment: Segment,
}

impl Wall {
    fn touches(&self, v: VertexId) -> bool {
        self.source == v || self.target == v
    }
}

/// Collects the boundary edges of `graph`
pub(crate) fn walls(graph: &GroundGraph) -> Vec<Wall> {
    graph
        .edges()
        .filter(|&e| graph.edge(e).boundary)
        .map(|e| {
            let (source, target) = graph.endpoints(e);
            Wall {
                source,
                target,
                segment: Segment::new(graph.vertex(source).point, graph.vertex(target).point),
            }
        })
        .collect()
}

/// Whether `a` and `b` see each other: no wall not attached to either
/// vertex crosses the segment, and its midpoint is walkable.
pub(crate) fn is_visible(
    graph: &GroundGraph,
    mask: &DepthMask,
    walls: &[Wall],
    a: VertexId,
    b: VertexId,
) -> bool {
    let segment = Segment::new(graph.vertex(a).point, graph.vertex(b).point);
    if mask.channel_at(segment.midpoint()).is_none() {
        return false;
    }
    !walls
        .iter()
        .any(|wall| !wall.touches(a) && !wall.touches(b) && segment.intersects(&wall.segment))
}

/// Links every unconnected, mutually visible vertex pair.
///
/// Returns the number of edges added.
pub(crate) fn add_visibility_edges(graph: &mut GroundGraph, mask: &DepthMask) -> usize {
    let blocking = walls(graph);
    let vertices: Vec<VertexId> = graph.vertices().collect();

    let mut shortcuts = Vec::new();
    for (i, &a) in vertices.iter().enumerate() {
        for &b in &vertices[i + 1..] {
            if graph.find_edge(a, b).is_none() && is_visible(graph, mask, &blocking, a, b) {
                shortcuts.push((a, b));
            }
        }
    }

    for &(a, b) in &shortcuts {
        graph.add_edge(a, b, GroundEdge::SHORTCUT);
    }
    shortcuts.len()
}
