//! Per-element tag state written by propagation and classification.
//!
//! Tags are kept beside the mesh, keyed by the mesh's ids, so the mesh
//! itself stays read-only apart from forced child generation.

use fap_core::error::{FapError, Result};
use fap_topology::{FaceId, HalfEdgeId, MeshTraversal, VertexId};
use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;

use crate::descriptor::{Descriptor, TransitionPattern};

/// How a face ends up in the patch tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FacePatchKind {
    #[default]
    None,
    /// Regular, boundary or corner B-spline patch.
    Full,
    /// Gregory or Gregory-boundary patch around an extraordinary vertex.
    Gregory,
    /// Touches resolved geometry but is not (yet) a patch.
    End,
}

/// Patch orientation. `rotation` drives vertex gathering, ptex and
/// face-varying sampling; `boundary_rotation` selects the bucket of
/// boundary and corner transition patches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchRotation {
    pub rotation: u8,
    pub boundary_rotation: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceTags {
    pub is_tagged: bool,
    pub was_tagged: bool,
    pub kind: FacePatchKind,
    pub boundary_count: u8,
    pub is_extraordinary: bool,
    pub is_critical: bool,
    pub rotation: PatchRotation,
    pub transition: TransitionPattern,
    /// Set iff the face is emitted as a patch.
    pub descriptor: Option<Descriptor>,
}

impl Default for FaceTags {
    fn default() -> Self {
        Self {
            is_tagged: false,
            was_tagged: false,
            kind: FacePatchKind::None,
            boundary_count: 0,
            is_extraordinary: false,
            is_critical: false,
            rotation: PatchRotation::default(),
            transition: TransitionPattern::NonTransition,
            descriptor: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeTags {
    /// Borders a face selected for refinement.
    pub is_triangle_head: bool,
    /// Separates a refined face from an unrefined one.
    pub is_transition: bool,
    /// Child half-edge along a transition edge that must stay watertight.
    pub is_watertight_critical: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexTags {
    pub is_tagged: bool,
    pub was_tagged: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TagStore {
    faces: SecondaryMap<FaceId, FaceTags>,
    edges: SecondaryMap<HalfEdgeId, EdgeTags>,
    vertices: SecondaryMap<VertexId, VertexTags>,
}

impl TagStore {
    /// Seed face and vertex selection flags from the mesh.
    pub fn seeded<M: MeshTraversal + ?Sized>(mesh: &M, faces: &[FaceId]) -> Self {
        let mut store = Self::default();
        for &f in faces {
            store.faces.insert(
                f,
                FaceTags {
                    is_tagged: mesh.face_is_tagged(f),
                    ..FaceTags::default()
                },
            );
        }
        for v in mesh.vertex_ids() {
            store.vertices.insert(
                v,
                VertexTags {
                    is_tagged: mesh.vertex_is_tagged(v),
                    was_tagged: mesh.vertex_was_tagged(v),
                },
            );
        }
        store
    }

    pub fn face(&self, f: FaceId) -> FaceTags {
        self.faces.get(f).copied().unwrap_or_default()
    }

    pub fn face_mut(&mut self, f: FaceId) -> Result<&mut FaceTags> {
        self.faces
            .entry(f)
            .map(|entry| entry.or_default())
            .ok_or_else(|| FapError::NotFound(format!("Stale face id {:?}", f)))
    }

    pub fn edge(&self, e: HalfEdgeId) -> EdgeTags {
        self.edges.get(e).copied().unwrap_or_default()
    }

    pub fn edge_mut(&mut self, e: HalfEdgeId) -> Result<&mut EdgeTags> {
        self.edges
            .entry(e)
            .map(|entry| entry.or_default())
            .ok_or_else(|| FapError::NotFound(format!("Stale edge id {:?}", e)))
    }

    pub fn vertex(&self, v: VertexId) -> VertexTags {
        self.vertices.get(v).copied().unwrap_or_default()
    }

    pub fn vertex_mut(&mut self, v: VertexId) -> Result<&mut VertexTags> {
        self.vertices
            .entry(v)
            .map(|entry| entry.or_default())
            .ok_or_else(|| FapError::NotFound(format!("Stale vertex id {:?}", v)))
    }

    /// Half-edges carrying any edge tag.
    pub fn tagged_edges(&self) -> impl Iterator<Item = (HalfEdgeId, &EdgeTags)> {
        self.edges.iter()
    }
}
