//! Read access (plus forced child generation) to a hierarchically refined
//! quad mesh, as needed by patch table construction.

use slotmap::SecondaryMap;

use crate::halfedge::{
    incident_edges, surrounding_vertices, FaceId, HalfEdgeId, Mesh, VertexId,
};

/// Mesh vertex id to packed output index.
pub type VertexRemap = SecondaryMap<VertexId, u32>;

/// Topological queries over a refined half-edge mesh.
///
/// Half-edge `i` of a face runs from face vertex `i` to vertex `i + 1`.
/// Boundary edges have no opposite. A vertex's incident edge is its most
/// clockwise outgoing half-edge, so counter-clockwise walks from it reach
/// every incident face even on a boundary.
pub trait MeshTraversal {
    // --- mesh ---

    /// All faces, every level, in index order.
    fn face_ids(&self) -> Vec<FaceId>;
    /// All vertices, every level, in index order.
    fn vertex_ids(&self) -> Vec<VertexId>;
    fn num_vertices(&self) -> usize;
    fn face_varying_width(&self) -> usize;

    // --- faces ---

    fn face_num_vertices(&self, f: FaceId) -> usize;
    fn face_vertex(&self, f: FaceId, i: usize) -> VertexId;
    fn face_edge(&self, f: FaceId, i: usize) -> HalfEdgeId;
    fn face_parent(&self, f: FaceId) -> Option<FaceId>;
    /// Position of `f` among its parent's children.
    fn face_child_index(&self, f: FaceId) -> Option<usize>;
    fn face_ptex_index(&self, f: FaceId) -> usize;
    fn face_is_hole(&self, f: FaceId) -> bool;
    fn face_is_tagged(&self, f: FaceId) -> bool;
    /// Face-varying values at corner `corner`, `face_varying_width` floats.
    fn face_varying(&self, f: FaceId, corner: usize) -> &[f32];
    /// Force the face's child (centroid) vertex.
    fn subdivide_face(&mut self, f: FaceId) -> VertexId;

    fn face_is_extraordinary(&self, f: FaceId) -> bool {
        self.face_num_vertices(f) != 4
    }

    // --- edges ---

    fn edge_opposite(&self, e: HalfEdgeId) -> Option<HalfEdgeId>;
    fn edge_next(&self, e: HalfEdgeId) -> HalfEdgeId;
    fn edge_prev(&self, e: HalfEdgeId) -> HalfEdgeId;
    fn edge_org(&self, e: HalfEdgeId) -> VertexId;
    fn edge_face(&self, e: HalfEdgeId) -> FaceId;
    fn edge_has_child(&self, e: HalfEdgeId) -> bool;
    /// Force the edge's child (midpoint) vertex, shared with the opposite.
    fn subdivide_edge(&mut self, e: HalfEdgeId) -> VertexId;

    fn edge_dest(&self, e: HalfEdgeId) -> VertexId {
        self.edge_org(self.edge_next(e))
    }

    /// Face on the other side of `e`.
    fn edge_right_face(&self, e: HalfEdgeId) -> Option<FaceId> {
        self.edge_opposite(e).map(|o| self.edge_face(o))
    }

    // --- vertices ---

    fn vertex_incident_edge(&self, v: VertexId) -> Option<HalfEdgeId>;
    /// Outgoing half-edge from `v` to `w`.
    fn vertex_edge_to(&self, v: VertexId, w: VertexId) -> Option<HalfEdgeId>;
    fn vertex_is_singular(&self, v: VertexId) -> bool;
    fn vertex_is_connected(&self, v: VertexId) -> bool;
    fn vertex_has_child(&self, v: VertexId) -> bool;
    fn vertex_child(&self, v: VertexId) -> Option<VertexId>;
    fn vertex_is_tagged(&self, v: VertexId) -> bool;
    fn vertex_was_tagged(&self, v: VertexId) -> bool;

    /// Next outgoing half-edge counter-clockwise around the origin of `e`.
    fn vertex_next_edge(&self, e: HalfEdgeId) -> Option<HalfEdgeId> {
        self.edge_opposite(self.edge_prev(e))
    }

    fn vertex_on_boundary(&self, v: VertexId) -> bool {
        self.vertex_incident_edge(v)
            .map_or(false, |e| self.edge_opposite(e).is_none())
    }

    /// Number of neighboring vertices.
    fn vertex_valence(&self, v: VertexId) -> usize {
        surrounding_vertices(self, v).count()
    }

    fn vertex_is_extraordinary(&self, v: VertexId) -> bool {
        let valence = self.vertex_valence(v);
        if self.vertex_on_boundary(v) {
            valence > 3
        } else {
            valence != 4
        }
    }
}

impl MeshTraversal for Mesh {
    fn face_ids(&self) -> Vec<FaceId> {
        self.faces.keys().collect()
    }

    fn vertex_ids(&self) -> Vec<VertexId> {
        self.vertices.keys().collect()
    }

    fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    fn face_varying_width(&self) -> usize {
        Mesh::face_varying_width(self)
    }

    fn face_num_vertices(&self, f: FaceId) -> usize {
        self.faces[f].num_vertices()
    }

    fn face_vertex(&self, f: FaceId, i: usize) -> VertexId {
        self.halfedges[self.faces[f].halfedges[i]].origin
    }

    fn face_edge(&self, f: FaceId, i: usize) -> HalfEdgeId {
        self.faces[f].halfedges[i]
    }

    fn face_parent(&self, f: FaceId) -> Option<FaceId> {
        self.faces[f].parent
    }

    fn face_child_index(&self, f: FaceId) -> Option<usize> {
        let parent = self.faces[f].parent?;
        self.faces[parent].children.iter().position(|&c| c == f)
    }

    fn face_ptex_index(&self, f: FaceId) -> usize {
        self.faces[f].ptex_index
    }

    fn face_is_hole(&self, f: FaceId) -> bool {
        self.faces[f].is_hole
    }

    fn face_is_tagged(&self, f: FaceId) -> bool {
        self.faces[f].is_tagged
    }

    fn face_varying(&self, f: FaceId, corner: usize) -> &[f32] {
        let width = Mesh::face_varying_width(self);
        &self.faces[f].fvar[corner * width..(corner + 1) * width]
    }

    fn subdivide_face(&mut self, f: FaceId) -> VertexId {
        Mesh::subdivide_face(self, f)
    }

    fn edge_opposite(&self, e: HalfEdgeId) -> Option<HalfEdgeId> {
        self.halfedges[e].twin
    }

    fn edge_next(&self, e: HalfEdgeId) -> HalfEdgeId {
        self.halfedges[e].next
    }

    fn edge_prev(&self, e: HalfEdgeId) -> HalfEdgeId {
        self.halfedges[e].prev
    }

    fn edge_org(&self, e: HalfEdgeId) -> VertexId {
        self.halfedges[e].origin
    }

    fn edge_face(&self, e: HalfEdgeId) -> FaceId {
        self.halfedges[e].face
    }

    fn edge_has_child(&self, e: HalfEdgeId) -> bool {
        self.halfedges[e].child.is_some()
    }

    fn subdivide_edge(&mut self, e: HalfEdgeId) -> VertexId {
        Mesh::subdivide_edge(self, e)
    }

    fn vertex_incident_edge(&self, v: VertexId) -> Option<HalfEdgeId> {
        self.incident_halfedge(v)
    }

    fn vertex_edge_to(&self, v: VertexId, w: VertexId) -> Option<HalfEdgeId> {
        self.find_halfedge(v, w)
    }

    /// More than one face fan meets at `v`.
    fn vertex_is_singular(&self, v: VertexId) -> bool {
        incident_edges(self, v).count() != self.vertices[v].outgoing.len()
    }

    fn vertex_is_connected(&self, v: VertexId) -> bool {
        !self.vertices[v].outgoing.is_empty()
    }

    fn vertex_has_child(&self, v: VertexId) -> bool {
        self.vertices[v].child.is_some()
    }

    fn vertex_child(&self, v: VertexId) -> Option<VertexId> {
        self.vertices[v].child
    }

    fn vertex_is_tagged(&self, v: VertexId) -> bool {
        self.vertices[v].is_tagged
    }

    fn vertex_was_tagged(&self, v: VertexId) -> bool {
        self.vertices[v].was_tagged
    }
}
