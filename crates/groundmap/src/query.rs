//! Closest-feature lookup and shortest path queries
//!
//! A query never touches the baked graph. It clones it, splices the two
//! query endpoints in, links them to whatever they can see, and runs
//! Dijkstra on the copy.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use groundmap_common::{EdgeId, Error, Point, Result, Segment, VertexId};

use crate::bitmap::DepthMask;
use crate::builder::{is_visible, walls, Wall};
use crate::ground_map::{GroundEdge, GroundGraph, GroundMap, GroundVertex};

/// Graph feature nearest to a query point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Simplex {
    Vertex(VertexId),
    Edge(EdgeId),
}

/// Result of [`GroundMap::closest_simplex`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestSimplex {
    pub simplex: Simplex,
    /// Nearest point on the simplex
    pub point: Point,
    pub distance: f64,
}

/// Nearest vertex, or nearest edge when the perpendicular foot falls strictly
/// inside it and beats every vertex.
pub(crate) fn closest_simplex(graph: &GroundGraph, p: Point) -> Option<ClosestSimplex> {
    let mut best: Option<ClosestSimplex> = None;

    for v in graph.vertices() {
        let point = graph.vertex(v).point;
        let distance = p.distance(point);
        if best.map_or(true, |b| distance < b.distance) {
            best = Some(ClosestSimplex {
                simplex: Simplex::Vertex(v),
                point,
                distance,
            });
        }
    }

    for e in graph.edges() {
        let (source, target) = graph.endpoints(e);
        let segment = Segment::new(graph.vertex(source).point, graph.vertex(target).point);
        let (point, inside) = segment.projection(p);
        if !inside {
            continue;
        }
        let distance = p.distance(point);
        if best.map_or(true, |b| distance < b.distance) {
            best = Some(ClosestSimplex {
                simplex: Simplex::Edge(e),
                point,
                distance,
            });
        }
    }

    best
}

/// Grey level at `p` on edge `e`, weighting both endpoints by inverse distance
pub(crate) fn edge_channel(graph: &GroundGraph, e: EdgeId, p: Point) -> f64 {
    let (source, target) = graph.endpoints(e);
    let (a, b) = (graph.vertex(source), graph.vertex(target));
    let (da, db) = (p.distance(a.point), p.distance(b.point));
    if da == 0.0 {
        return a.depth as f64;
    }
    if db == 0.0 {
        return b.depth as f64;
    }
    let (wa, wb) = (1.0 / da, 1.0 / db);
    (wa * a.depth as f64 + wb * b.depth as f64) / (wa + wb)
}

/// Min-heap entry for Dijkstra
#[derive(Debug, Clone, Copy)]
struct HeapNode {
    cost: f64,
    vertex: VertexId,
}

impl PartialEq for HeapNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapNode {}

impl PartialOrd for HeapNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

/// Dijkstra over Euclidean edge lengths.
///
/// Returns the vertices after `origin` up to and including `target`, or
/// `None` when `target` is unreachable.
fn shortest_path(graph: &GroundGraph, origin: VertexId, target: VertexId) -> Option<Vec<VertexId>> {
    let n = graph.vertex_count();
    let mut cost = vec![f64::INFINITY; n];
    let mut parent: Vec<Option<VertexId>> = vec![None; n];

    let mut open = BinaryHeap::new();
    cost[origin.index()] = 0.0;
    open.push(HeapNode {
        cost: 0.0,
        vertex: origin,
    });

    while let Some(HeapNode { cost: current, vertex }) = open.pop() {
        if current > cost[vertex.index()] {
            // stale
            continue;
        }
        if vertex == target {
            break;
        }

        let here = graph.vertex(vertex).point;
        for &e in graph.incident_edges(vertex) {
            let next = graph.opposite(e, vertex);
            let candidate = current + here.distance(graph.vertex(next).point);
            if candidate < cost[next.index()] {
                cost[next.index()] = candidate;
                parent[next.index()] = Some(vertex);
                open.push(HeapNode {
                    cost: candidate,
                    vertex: next,
                });
            }
        }
    }

    let mut route = Vec::new();
    let mut current = target;
    while current != origin {
        route.push(current);
        current = parent[current.index()]?;
    }
    route.reverse();
    Some(route)
}

impl GroundMap {
    /// Nearest vertex or edge of the walkable graph.
    ///
    /// `None` only when the graph is empty (the bitmap has no boundary).
    pub fn closest_simplex(&self, p: Point) -> Option<ClosestSimplex> {
        closest_simplex(&self.graph, p)
    }

    /// Shortest walkable path from `origin` to `target`.
    ///
    /// Endpoints off the walkable area are first snapped onto the graph. The
    /// returned points exclude `origin` itself, except that a snapped origin
    /// is returned as the first point so the caller can step onto the map.
    /// The last point is the (possibly snapped) target. Identical endpoints
    /// give an empty path. Non-finite endpoints yield [`Error::NoPath`].
    pub fn find_path(&self, origin: Point, target: Point) -> Result<Vec<Point>> {
        let no_path = || Error::NoPath { origin, target };
        if !origin.is_finite() || !target.is_finite() {
            log::warn!("no path from {origin} to {target}: non-finite endpoint");
            return Err(no_path());
        }

        let (start, start_snap) = self.snap(origin).ok_or_else(no_path)?;
        let (end, end_snap) = self.snap(target).ok_or_else(no_path)?;

        if start == end {
            return Ok(Vec::new());
        }

        let mut path = Vec::new();
        if start_snap.is_some() {
            path.push(start);
        }

        if let (Some(Simplex::Edge(a)), Some(Simplex::Edge(b))) = (start_snap, end_snap) {
            if a == b {
                path.push(end);
                return Ok(path);
            }
        }

        let mut working = self.graph.clone();
        let mut pending = Vec::new();
        let vo = splice(&mut working, start, start_snap, &self.mask, &mut pending);
        let vt = splice(&mut working, end, end_snap, &self.mask, &mut pending);

        // Split edges are not in the working graph yet but still block sight
        let mut blocking = walls(&working);
        blocking.extend(pending.iter().filter(|p| p.2.boundary).map(|&(a, b, _)| Wall {
            source: a,
            target: b,
            segment: Segment::new(working.vertex(a).point, working.vertex(b).point),
        }));

        if is_visible(&working, &self.mask, &blocking, vo, vt) {
            log::trace!("direct line from {start} to {end}");
            path.push(end);
            return Ok(path);
        }

        let mut shortcuts = Vec::new();
        for from in [vo, vt] {
            for v in working.vertices() {
                if v == vo || v == vt {
                    continue;
                }
                let linked = working.find_edge(from, v).is_some()
                    || pending
                        .iter()
                        .any(|&(a, b, _)| (a, b) == (from, v) || (a, b) == (v, from));
                if !linked && is_visible(&working, &self.mask, &blocking, from, v) {
                    shortcuts.push((from, v, GroundEdge::SHORTCUT));
                }
            }
        }
        log::trace!(
            "spliced query endpoints with {} split and {} visibility edges",
            pending.len(),
            shortcuts.len()
        );

        for (a, b, edge) in pending.into_iter().chain(shortcuts) {
            working.add_edge(a, b, edge);
        }
        let remap = working.clean();
        debug_assert!(working.validity());

        let (Some(vo), Some(vt)) = (remap[vo.index()], remap[vt.index()]) else {
            log::warn!("query endpoint sees no vertex: {origin} -> {target}");
            return Err(no_path());
        };

        let route = shortest_path(&working, vo, vt).ok_or_else(|| {
            log::warn!("no route from {origin} to {target}");
            no_path()
        })?;
        path.extend(route.into_iter().map(|v| working.vertex(v).point));
        Ok(path)
    }

    /// Leaves walkable points alone and moves the others onto the graph
    fn snap(&self, p: Point) -> Option<(Point, Option<Simplex>)> {
        if self.is_ground_point(p) {
            return Some((p, None));
        }
        let closest = self.closest_simplex(p)?;
        Some((closest.point, Some(closest.simplex)))
    }
}

/// Inserts a query endpoint into the working graph.
///
/// Snapped-to vertices are reused. A snapped-to edge is removed and its two
/// halves, keeping its flag, are queued in `pending`.
fn splice(
    graph: &mut GroundGraph,
    p: Point,
    snap: Option<Simplex>,
    mask: &DepthMask,
    pending: &mut Vec<(VertexId, VertexId, GroundEdge)>,
) -> VertexId {
    match snap {
        Some(Simplex::Vertex(v)) => v,
        Some(Simplex::Edge(e)) => {
            let depth = edge_channel(graph, e, p).round() as u8;
            let (source, target) = graph.endpoints(e);
            let edge = *graph.edge(e);
            let v = graph.add_vertex(GroundVertex { point: p, depth });
            graph.delete_edge(e);
            pending.push((source, v, edge));
            pending.push((v, target, edge));
            v
        }
        None => graph.add_vertex(GroundVertex {
            point: p,
            depth: mask.channel_at(p).unwrap_or(u8::MAX),
        }),
    }
}
