use super::types::*;
use crate::traversal::MeshTraversal;

/// Counter-clockwise walk over the outgoing half-edges of a vertex, starting
/// at its incident (most clockwise) half-edge. Stops when the walk closes or
/// runs off a boundary.
pub struct IncidentEdges<'a, M: MeshTraversal + ?Sized> {
    mesh: &'a M,
    start: Option<HalfEdgeId>,
    current: Option<HalfEdgeId>,
}

impl<'a, M: MeshTraversal + ?Sized> IncidentEdges<'a, M> {
    pub fn new(mesh: &'a M, v: VertexId) -> Self {
        Self::starting_at(mesh, mesh.vertex_incident_edge(v))
    }

    fn starting_at(mesh: &'a M, start: Option<HalfEdgeId>) -> Self {
        Self {
            mesh,
            start,
            current: start,
        }
    }
}

impl<'a, M: MeshTraversal + ?Sized> Iterator for IncidentEdges<'a, M> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<HalfEdgeId> {
        let cur = self.current?;
        self.current = self
            .mesh
            .vertex_next_edge(cur)
            .filter(|&e| Some(e) != self.start);
        Some(cur)
    }
}

/// Neighbors of a vertex in counter-clockwise order: the destination of
/// every incident half-edge, followed on a boundary by the origin of the
/// last face's closing half-edge.
pub struct SurroundingVertices<'a, M: MeshTraversal + ?Sized> {
    mesh: &'a M,
    start: Option<HalfEdgeId>,
    current: Option<HalfEdgeId>,
    tail: Option<HalfEdgeId>,
}

impl<'a, M: MeshTraversal + ?Sized> SurroundingVertices<'a, M> {
    pub fn new(mesh: &'a M, v: VertexId) -> Self {
        Self::starting_at(mesh, mesh.vertex_incident_edge(v))
    }

    fn starting_at(mesh: &'a M, start: Option<HalfEdgeId>) -> Self {
        Self {
            mesh,
            start,
            current: start,
            tail: None,
        }
    }
}

impl<'a, M: MeshTraversal + ?Sized> Iterator for SurroundingVertices<'a, M> {
    type Item = VertexId;

    fn next(&mut self) -> Option<VertexId> {
        if let Some(cur) = self.current {
            match self.mesh.vertex_next_edge(cur) {
                Some(e) if Some(e) != self.start => self.current = Some(e),
                Some(_) => self.current = None,
                None => {
                    self.current = None;
                    self.tail = Some(self.mesh.edge_prev(cur));
                }
            }
            return Some(self.mesh.edge_dest(cur));
        }

        let tail = self.tail.take()?;
        Some(self.mesh.edge_org(tail))
    }
}

pub fn incident_edges<M: MeshTraversal + ?Sized>(mesh: &M, v: VertexId) -> IncidentEdges<'_, M> {
    IncidentEdges::new(mesh, v)
}

pub fn surrounding_vertices<M: MeshTraversal + ?Sized>(
    mesh: &M,
    v: VertexId,
) -> SurroundingVertices<'_, M> {
    SurroundingVertices::new(mesh, v)
}

/// Most clockwise outgoing half-edge of the face fan that contains `e`.
///
/// A singular vertex has several fans; walks starting here stay inside the
/// fan of `e`. For a closed fan that holds the vertex's incident edge, that
/// edge is returned, so the walk matches `surrounding_vertices`.
pub fn fan_start<M: MeshTraversal + ?Sized>(mesh: &M, e: HalfEdgeId) -> HalfEdgeId {
    let mut current = e;
    loop {
        let Some(twin) = mesh.edge_opposite(current) else {
            return current;
        };
        current = mesh.edge_next(twin);
        if current == e {
            break;
        }
    }

    mesh.vertex_incident_edge(mesh.edge_org(e))
        .filter(|&start| IncidentEdges::starting_at(mesh, Some(e)).any(|x| x == start))
        .unwrap_or(e)
}

/// Neighbors of the origin of `e` within the face fan of `e`, counter-clockwise.
pub fn fan_surrounding_vertices<M: MeshTraversal + ?Sized>(
    mesh: &M,
    e: HalfEdgeId,
) -> SurroundingVertices<'_, M> {
    SurroundingVertices::starting_at(mesh, Some(fan_start(mesh, e)))
}
