//! Adjacency-list graph with per-vertex and per-edge payloads
//!
//! Vertices and edges are addressed by small integer handles that stay
//! stable until [`Graph::clean`] compacts the storage. Deleting an edge only
//! detaches it: the slot remains (marked invalid) so that outstanding edge
//! handles keep pointing at the right place.
//!
//! The same container serves undirected boundary graphs (`DIRECTED = false`,
//! the default) and directed trees (`DIRECTED = true`), where an edge is only
//! listed in the adjacency of its source.

use std::fmt;

/// Handle to a graph vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct VertexId(u32);

/// Handle to a graph edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct EdgeId(u32);

impl VertexId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl EdgeId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
struct GraphVertex<V> {
    data: V,
    incident: Vec<EdgeId>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
struct GraphEdge<E> {
    data: E,
    /// `None` once the edge has been deleted
    ends: Option<(VertexId, VertexId)>,
}

/// Graph container, undirected unless `DIRECTED` is set.
///
/// Cloning performs a deep copy, adjacency lists included.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Graph<V, E, const DIRECTED: bool = false> {
    vertices: Vec<GraphVertex<V>>,
    edges: Vec<GraphEdge<E>>,
}

/// Graph whose edges are only attached to their source vertex
pub type DirectedGraph<V, E> = Graph<V, E, true>;

impl<V, E, const DIRECTED: bool> Default for Graph<V, E, DIRECTED> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, E, const DIRECTED: bool> Graph<V, E, DIRECTED> {
    /// Creates an empty graph
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Number of vertex slots
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edge slots, deleted edges included until the next `clean`
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Iterates over every vertex handle
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterates over the handles of edges that have not been deleted
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, edge)| edge.ends.is_some())
            .map(|(i, _)| EdgeId::new(i))
    }

    pub fn vertex(&self, v: VertexId) -> &V {
        &self.vertices[v.index()].data
    }

    pub fn vertex_mut(&mut self, v: VertexId) -> &mut V {
        &mut self.vertices[v.index()].data
    }

    pub fn edge(&self, e: EdgeId) -> &E {
        &self.edges[e.index()].data
    }

    pub fn edge_mut(&mut self, e: EdgeId) -> &mut E {
        &mut self.edges[e.index()].data
    }

    /// Whether the edge still connects two vertices
    pub fn is_valid(&self, e: EdgeId) -> bool {
        self.edges[e.index()].ends.is_some()
    }

    /// Both endpoints of a live edge.
    ///
    /// For undirected graphs the smaller handle comes first.
    ///
    /// # Panics
    ///
    /// Panics if the edge has been deleted.
    pub fn endpoints(&self, e: EdgeId) -> (VertexId, VertexId) {
        match self.edges[e.index()].ends {
            Some(ends) => ends,
            None => panic!("edge {e} has been deleted"),
        }
    }

    pub fn source(&self, e: EdgeId) -> VertexId {
        self.endpoints(e).0
    }

    pub fn target(&self, e: EdgeId) -> VertexId {
        self.endpoints(e).1
    }

    /// Endpoint of `e` opposite to `v`.
    ///
    /// # Panics
    ///
    /// Panics if `v` is not an endpoint of `e`.
    pub fn opposite(&self, e: EdgeId, v: VertexId) -> VertexId {
        let (source, target) = self.endpoints(e);
        if v == source {
            target
        } else {
            assert_eq!(v, target, "vertex {v} is not on edge {e}");
            source
        }
    }

    pub fn edge_has_vertex(&self, e: EdgeId, v: VertexId) -> bool {
        matches!(self.edges[e.index()].ends, Some((s, t)) if s == v || t == v)
    }

    /// Edges attached to `v`
    pub fn incident_edges(&self, v: VertexId) -> &[EdgeId] {
        &self.vertices[v.index()].incident
    }

    pub fn degree(&self, v: VertexId) -> usize {
        self.vertices[v.index()].incident.len()
    }

    pub fn incident_edge(&self, v: VertexId, i: usize) -> EdgeId {
        self.vertices[v.index()].incident[i]
    }

    /// Vertex reached from `v` through its `i`-th incident edge
    pub fn incident_vertex(&self, v: VertexId, i: usize) -> VertexId {
        self.opposite(self.incident_edge(v, i), v)
    }

    /// Finds a live edge from `a` to `b` (either direction when undirected)
    pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        let (from, to) = if !DIRECTED && self.degree(b) < self.degree(a) {
            (b, a)
        } else {
            (a, b)
        };
        self.incident_edges(from)
            .iter()
            .copied()
            .find(|&e| self.opposite(e, from) == to)
    }

    pub fn add_vertex(&mut self, data: V) -> VertexId {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(GraphVertex {
            data,
            incident: Vec::new(),
        });
        id
    }

    /// Adds an edge between two existing vertices
    pub fn add_edge(&mut self, a: VertexId, b: VertexId, data: E) -> EdgeId {
        debug_assert!(a.index() < self.vertices.len() && b.index() < self.vertices.len());
        let ends = if !DIRECTED && b < a { (b, a) } else { (a, b) };
        let id = EdgeId::new(self.edges.len());
        self.edges.push(GraphEdge {
            data,
            ends: Some(ends),
        });
        self.vertices[a.index()].incident.push(id);
        if !DIRECTED {
            self.vertices[b.index()].incident.push(id);
        }
        id
    }

    /// Detaches an edge from its endpoints and marks it invalid
    pub fn delete_edge(&mut self, e: EdgeId) {
        let (source, target) = self.endpoints(e);
        self.edges[e.index()].ends = None;

        let detach = |incident: &mut Vec<EdgeId>| {
            if let Some(pos) = incident.iter().position(|&x| x == e) {
                incident.remove(pos);
            }
        };
        detach(&mut self.vertices[source.index()].incident);
        if !DIRECTED {
            detach(&mut self.vertices[target.index()].incident);
        }
    }

    /// Checks that every handle stored in the graph is in range and that
    /// every incident edge really references its vertex
    pub fn validity(&self) -> bool {
        log::trace!(
            "checking graph ({} vertices, {} edges)",
            self.vertices.len(),
            self.edges.len()
        );
        let vertex_count = self.vertices.len();
        let ends_in_range = self.edges.iter().all(|edge| match edge.ends {
            Some((source, target)) => {
                source.index() < vertex_count && target.index() < vertex_count
            }
            None => true,
        });

        ends_in_range
            && self.vertices().all(|v| {
                self.incident_edges(v).iter().all(|&e| {
                    match self.edges.get(e.index()).and_then(|edge| edge.ends) {
                        Some((source, _)) if DIRECTED => source == v,
                        Some((source, target)) => source == v || target == v,
                        None => false,
                    }
                })
            })
    }
}

impl<V: Clone, E: Clone, const DIRECTED: bool> Graph<V, E, DIRECTED> {
    /// Drops vertices without incident edges and deleted edges, renumbering
    /// the survivors contiguously in their previous order.
    ///
    /// Returns the old-to-new vertex mapping (`None` for dropped vertices).
    pub fn clean(&mut self) -> Vec<Option<VertexId>> {
        let mut referenced = vec![false; self.vertices.len()];
        for edge in &self.edges {
            if let Some((source, target)) = edge.ends {
                referenced[source.index()] = true;
                referenced[target.index()] = true;
            }
        }

        let mut remap = vec![None; self.vertices.len()];
        let mut vertices = Vec::with_capacity(self.vertices.len());
        for (i, vertex) in self.vertices.iter().enumerate() {
            if referenced[i] || !vertex.incident.is_empty() {
                remap[i] = Some(VertexId::new(vertices.len()));
                vertices.push(GraphVertex {
                    data: vertex.data.clone(),
                    incident: Vec::new(),
                });
            }
        }

        let mut edges = Vec::with_capacity(self.edges.len());
        for edge in &self.edges {
            let Some((source, target)) = edge.ends else {
                continue;
            };
            let (Some(source), Some(target)) = (remap[source.index()], remap[target.index()])
            else {
                continue;
            };
            let id = EdgeId::new(edges.len());
            edges.push(GraphEdge {
                data: edge.data.clone(),
                ends: Some((source, target)),
            });
            vertices[source.index()].incident.push(id);
            if !DIRECTED {
                vertices[target.index()].incident.push(id);
            }
        }

        self.vertices = vertices;
        self.edges = edges;
        remap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph(n: usize) -> (Graph<usize, ()>, Vec<VertexId>) {
        let mut graph = Graph::new();
        let vs: Vec<_> = (0..n).map(|i| graph.add_vertex(i)).collect();
        for w in vs.windows(2) {
            graph.add_edge(w[0], w[1], ());
        }
        (graph, vs)
    }

    #[test]
    fn test_add_and_adjacency() {
        let (graph, vs) = path_graph(3);
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.degree(vs[0]), 1);
        assert_eq!(graph.degree(vs[1]), 2);
        assert_eq!(graph.incident_vertex(vs[1], 0), vs[0]);
        assert_eq!(graph.incident_vertex(vs[1], 1), vs[2]);
        assert_eq!(*graph.vertex(vs[2]), 2);
        assert!(graph.validity());
    }

    #[test]
    fn test_undirected_endpoints_are_ordered() {
        let mut graph: Graph<(), ()> = Graph::new();
        let a = graph.add_vertex(());
        let b = graph.add_vertex(());
        let e = graph.add_edge(b, a, ());
        assert_eq!(graph.endpoints(e), (a, b));
        assert_eq!(graph.opposite(e, a), b);
        assert!(graph.edge_has_vertex(e, b));
    }

    #[test]
    fn test_find_edge() {
        let (graph, vs) = path_graph(4);
        assert!(graph.find_edge(vs[1], vs[2]).is_some());
        assert!(graph.find_edge(vs[2], vs[1]).is_some());
        assert!(graph.find_edge(vs[0], vs[3]).is_none());
        // A later incident edge must be found too, not only the first one
        assert_eq!(
            graph.find_edge(vs[1], vs[2]),
            Some(graph.incident_edge(vs[1], 1))
        );
    }

    #[test]
    fn test_delete_edge_detaches_both_ends() {
        let (mut graph, vs) = path_graph(3);
        let e = graph.find_edge(vs[0], vs[1]).unwrap();
        graph.delete_edge(e);

        assert!(!graph.is_valid(e));
        assert_eq!(graph.degree(vs[0]), 0);
        assert_eq!(graph.degree(vs[1]), 1);
        assert_eq!(graph.edges().count(), 1);
        assert!(graph.validity());
    }

    #[test]
    #[should_panic]
    fn test_deleted_edge_access_panics() {
        let (mut graph, vs) = path_graph(2);
        let e = graph.find_edge(vs[0], vs[1]).unwrap();
        graph.delete_edge(e);
        graph.endpoints(e);
    }

    #[test]
    fn test_clean_compacts_and_remaps() {
        let (mut graph, vs) = path_graph(4);
        let e = graph.find_edge(vs[0], vs[1]).unwrap();
        graph.delete_edge(e);
        let orphan = graph.add_vertex(99);

        let remap = graph.clean();

        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(remap[vs[0].index()], None);
        assert_eq!(remap[orphan.index()], None);
        assert_eq!(remap[vs[1].index()], Some(VertexId::new(0)));
        assert_eq!(remap[vs[3].index()], Some(VertexId::new(2)));
        assert_eq!(*graph.vertex(VertexId::new(0)), 1);
        assert!(graph.vertices().all(|v| graph.degree(v) >= 1));
        assert!(graph.validity());
    }

    #[test]
    fn test_validity_rejects_dangling_handles() {
        let (mut graph, vs) = path_graph(3);
        graph.vertices[vs[0].index()].incident[0] = EdgeId::new(99);
        assert!(!graph.validity());

        let (mut graph, _) = path_graph(3);
        graph.edges[1].ends = Some((VertexId::new(1), VertexId::new(42)));
        assert!(!graph.validity());
    }

    #[test]
    fn test_clone_is_deep() {
        let (graph, vs) = path_graph(3);
        let mut copy = graph.clone();
        let e = copy.find_edge(vs[0], vs[1]).unwrap();
        copy.delete_edge(e);
        copy.add_vertex(7);

        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.degree(vs[0]), 1);
        assert_ne!(graph, copy);
    }

    #[test]
    fn test_directed_adjacency_is_source_only() {
        let mut tree: DirectedGraph<&str, ()> = DirectedGraph::new();
        let root = tree.add_vertex("root");
        let child = tree.add_vertex("child");
        let e = tree.add_edge(child, root, ());

        assert_eq!(tree.endpoints(e), (child, root));
        assert_eq!(tree.degree(child), 1);
        assert_eq!(tree.degree(root), 0);
        assert!(tree.find_edge(child, root).is_some());
        assert!(tree.find_edge(root, child).is_none());
        assert!(tree.validity());

        tree.delete_edge(e);
        assert_eq!(tree.degree(child), 0);
    }
}
