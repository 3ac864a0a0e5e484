use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::Point3;

// --- SlotMap key types ---

new_key_type! {
    pub struct VertexId;
    pub struct HalfEdgeId;
    pub struct FaceId;
}

// --- Entity structs ---

/// The element a child vertex was generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VertexParent {
    Face(FaceId),
    Edge(HalfEdgeId),
    Vertex(VertexId),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Point3,
    /// Outgoing half-edges, one per incident face.
    pub outgoing: Vec<HalfEdgeId>,
    pub parent: Option<VertexParent>,
    pub child: Option<VertexId>,
    pub level: u8,
    /// Selected by the adaptive refiner for further refinement.
    pub is_tagged: bool,
    /// Lies in a region the adaptive refiner has resolved.
    pub was_tagged: bool,
}

/// Half-edges exist only inside faces: a boundary edge has a single
/// half-edge whose `twin` is `None`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HalfEdge {
    pub origin: VertexId,
    pub twin: Option<HalfEdgeId>,
    pub next: HalfEdgeId,
    pub prev: HalfEdgeId,
    pub face: FaceId,
    /// Midpoint vertex, shared with the twin.
    pub child: Option<VertexId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Face {
    /// Half-edge `i` runs from vertex `i` to vertex `i + 1`.
    pub halfedges: Vec<HalfEdgeId>,
    pub parent: Option<FaceId>,
    /// Child `i` holds the child of vertex `i`. Empty until refined.
    pub children: Vec<FaceId>,
    pub child_vertex: Option<VertexId>,
    pub level: u8,
    pub ptex_index: usize,
    pub is_hole: bool,
    pub is_tagged: bool,
    /// Face-varying values, `width` floats per corner.
    pub fvar: Vec<f32>,
}

impl Face {
    pub fn num_vertices(&self) -> usize {
        self.halfedges.len()
    }

    pub fn is_coarse(&self) -> bool {
        self.parent.is_none()
    }
}
