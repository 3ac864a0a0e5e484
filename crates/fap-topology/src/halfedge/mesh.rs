use fap_core::error::{FapError, Result};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use super::types::*;
use crate::traversal::VertexRemap;
use crate::Point3;

/// Hierarchical half-edge mesh. Every refinement level lives in the same
/// arenas; parent/child links connect the levels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: SlotMap<VertexId, Vertex>,
    pub halfedges: SlotMap<HalfEdgeId, HalfEdge>,
    pub faces: SlotMap<FaceId, Face>,
    fvar_width: usize,
    next_ptex_index: usize,
}

impl Mesh {
    pub fn new() -> Self {
        Self::with_face_varying_width(0)
    }

    /// Create an empty mesh carrying `width` face-varying floats per face corner.
    pub fn with_face_varying_width(width: usize) -> Self {
        Self {
            vertices: SlotMap::with_key(),
            halfedges: SlotMap::with_key(),
            faces: SlotMap::with_key(),
            fvar_width: width,
            next_ptex_index: 0,
        }
    }

    pub fn face_varying_width(&self) -> usize {
        self.fvar_width
    }

    pub fn add_vertex(&mut self, position: Point3) -> VertexId {
        self.insert_vertex(position, None, 0)
    }

    pub(crate) fn insert_vertex(
        &mut self,
        position: Point3,
        parent: Option<VertexParent>,
        level: u8,
    ) -> VertexId {
        self.vertices.insert(Vertex {
            position,
            outgoing: Vec::new(),
            parent,
            child: None,
            level,
            is_tagged: false,
            was_tagged: false,
        })
    }

    /// Create a coarse face from an ordered list of vertices (CCW winding).
    /// Links twins with existing faces sharing an edge in the opposite direction.
    pub fn make_face(&mut self, vertices: &[VertexId]) -> Result<FaceId> {
        let n = vertices.len();
        if n < 3 {
            return Err(FapError::Topology(
                "A face requires at least 3 vertices".into(),
            ));
        }

        for (i, &v) in vertices.iter().enumerate() {
            if !self.vertices.contains_key(v) {
                return Err(FapError::NotFound("Vertex not found".into()));
            }
            if vertices[..i].contains(&v) {
                return Err(FapError::Topology(format!(
                    "Vertex {:?} appears twice in the same face",
                    v
                )));
            }
        }

        let ptex_index = self.next_ptex_index;
        self.next_ptex_index += if n == 4 { 1 } else { n };

        let fvar = vec![0.0; n * self.fvar_width];
        self.insert_face(vertices, None, 0, ptex_index, fvar)
    }

    pub(crate) fn insert_face(
        &mut self,
        vertices: &[VertexId],
        parent: Option<FaceId>,
        level: u8,
        ptex_index: usize,
        fvar: Vec<f32>,
    ) -> Result<FaceId> {
        let n = vertices.len();

        // Reject before mutating anything
        for i in 0..n {
            if self
                .find_halfedge(vertices[i], vertices[(i + 1) % n])
                .is_some()
            {
                return Err(FapError::Topology(
                    "Half-edge already belongs to a face (non-manifold)".into(),
                ));
            }
        }

        let face_id = self.faces.insert(Face {
            halfedges: Vec::with_capacity(n),
            parent,
            children: Vec::new(),
            child_vertex: None,
            level,
            ptex_index,
            is_hole: false,
            is_tagged: false,
            fvar,
        });

        let mut face_halfedges = Vec::with_capacity(n);
        for &origin in vertices {
            let he = self.halfedges.insert(HalfEdge {
                origin,
                twin: None,
                next: HalfEdgeId::default(),
                prev: HalfEdgeId::default(),
                face: face_id,
                child: None,
            });
            self.vertices[origin].outgoing.push(he);
            face_halfedges.push(he);
        }

        // Link half-edges: next/prev chain first, twins once targets resolve
        for i in 0..n {
            let he = face_halfedges[i];
            self.halfedges[he].next = face_halfedges[(i + 1) % n];
            self.halfedges[he].prev = face_halfedges[(n + i - 1) % n];
        }

        for i in 0..n {
            let he = face_halfedges[i];
            if let Some(rev) = self.find_halfedge(vertices[(i + 1) % n], vertices[i]) {
                self.halfedges[he].twin = Some(rev);
                self.halfedges[rev].twin = Some(he);
                self.halfedges[he].child = self.halfedges[rev].child;
            }
        }

        self.faces[face_id].halfedges = face_halfedges;
        Ok(face_id)
    }

    /// Find a half-edge going from `origin` to `target`.
    pub fn find_halfedge(&self, origin: VertexId, target: VertexId) -> Option<HalfEdgeId> {
        self.vertices
            .get(origin)?
            .outgoing
            .iter()
            .copied()
            .find(|&he| self.halfedge_target(he) == target)
    }

    /// Get the target (destination) vertex of a half-edge.
    pub fn halfedge_target(&self, he_id: HalfEdgeId) -> VertexId {
        let next = self.halfedges[he_id].next;
        self.halfedges[next].origin
    }

    /// The most clockwise outgoing half-edge of `v`. For boundary vertices
    /// this is the outgoing boundary half-edge, so a counter-clockwise walk
    /// from it visits every incident face.
    pub fn incident_halfedge(&self, v: VertexId) -> Option<HalfEdgeId> {
        let vertex = self.vertices.get(v)?;
        let start = *vertex.outgoing.first()?;

        let mut current = start;
        for _ in 0..vertex.outgoing.len() {
            let Some(twin) = self.halfedges[current].twin else {
                return Some(current);
            };
            let cw = self.halfedges[twin].next;
            if cw == start {
                break;
            }
            current = cw;
        }
        Some(start)
    }

    pub fn set_face_varying(&mut self, face: FaceId, values: &[f32]) -> Result<()> {
        let width = self.fvar_width;
        let f = self
            .faces
            .get_mut(face)
            .ok_or_else(|| FapError::NotFound("Face not found".into()))?;

        if values.len() != f.num_vertices() * width {
            return Err(FapError::InvalidOperation(format!(
                "Face {:?} expects {} face-varying values, got {}",
                face,
                f.num_vertices() * width,
                values.len()
            )));
        }
        f.fvar.copy_from_slice(values);
        Ok(())
    }

    pub fn set_hole(&mut self, face: FaceId, is_hole: bool) -> Result<()> {
        self.faces
            .get_mut(face)
            .ok_or_else(|| FapError::NotFound("Face not found".into()))?
            .is_hole = is_hole;
        Ok(())
    }

    /// Select a face as an adaptive stopping face.
    pub fn tag_face(&mut self, face: FaceId) -> Result<()> {
        self.faces
            .get_mut(face)
            .ok_or_else(|| FapError::NotFound("Face not found".into()))?
            .is_tagged = true;
        Ok(())
    }

    pub fn tag_vertex(&mut self, v: VertexId) -> Result<()> {
        self.vertices
            .get_mut(v)
            .ok_or_else(|| FapError::NotFound("Vertex not found".into()))?
            .is_tagged = true;
        Ok(())
    }

    pub fn mark_was_tagged(&mut self, v: VertexId) -> Result<()> {
        self.vertices
            .get_mut(v)
            .ok_or_else(|| FapError::NotFound("Vertex not found".into()))?
            .was_tagged = true;
        Ok(())
    }

    /// Faces of refinement level 0, in creation order.
    pub fn coarse_faces(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces
            .iter()
            .filter(|(_, f)| f.is_coarse())
            .map(|(id, _)| id)
    }

    /// Packed output ids in creation order.
    pub fn vertex_remap(&self) -> VertexRemap {
        self.vertices
            .keys()
            .enumerate()
            .map(|(i, v)| (v, i as u32))
            .collect()
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}
