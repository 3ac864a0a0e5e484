//! Patch table construction entry point.

use fap_core::error::{FapError, Result};
use fap_core::traits::Validate;
use fap_topology::{FaceId, MeshTraversal, VertexRemap};
use tracing::debug;

use crate::classify::classify_faces;
use crate::descriptor::DescriptorMap;
use crate::emit::emit_patch_tables;
use crate::layout::layout_patch_arrays;
use crate::options::PatchTablesOptions;
use crate::propagate::propagate_tags;
use crate::tables::PatchTables;
use crate::tags::TagStore;

/// Tags and classifies an adaptively refined mesh, then emits patch tables.
///
/// Construction runs the passes that may still add children to the mesh
/// (tag propagation); afterwards the mesh is only read.
pub struct PatchTablesFactory<'a, M: ?Sized> {
    mesh: &'a M,
    remap: &'a VertexRemap,
    faces: Vec<FaceId>,
    tags: TagStore,
    counts: DescriptorMap<usize>,
}

impl<'a, M: MeshTraversal + Sync + ?Sized> PatchTablesFactory<'a, M> {
    /// Propagate tags over `mesh` and classify every face.
    ///
    /// `remap` maps each vertex to its index in the output vertex buffer.
    pub fn new(mesh: &'a mut M, remap: &'a VertexRemap) -> Result<Self> {
        let faces = mesh.face_ids();
        if faces.is_empty() {
            return Err(FapError::EmptyMesh);
        }

        let mut tags = TagStore::seeded(&*mesh, &faces);
        propagate_tags(mesh, &faces, &mut tags)?;

        let mesh: &'a M = mesh;
        let counts = classify_faces(mesh, &faces, &mut tags)?;
        debug!(
            "Patch factory ready: {} faces, {} patches",
            faces.len(),
            counts.total()
        );

        Ok(Self {
            mesh,
            remap,
            faces,
            tags,
            counts,
        })
    }

    pub fn faces(&self) -> &[FaceId] {
        &self.faces
    }

    pub fn tags(&self) -> &TagStore {
        &self.tags
    }

    /// Number of patches per descriptor.
    pub fn patch_counts(&self) -> &DescriptorMap<usize> {
        &self.counts
    }

    pub fn num_patch_arrays(&self) -> usize {
        self.counts.iter().filter(|&(_, &c)| c > 0).count()
    }

    /// Lay out the patch arrays and fill them.
    pub fn create(&self, options: &PatchTablesOptions) -> Result<PatchTables> {
        options.validate()?;
        let layout = layout_patch_arrays(&self.counts);
        emit_patch_tables(
            self.mesh,
            self.remap,
            &self.faces,
            &self.tags,
            layout,
            options,
        )
    }
}

/// Build patch tables for `mesh` in one call.
pub fn build_patch_tables<M: MeshTraversal + Sync + ?Sized>(
    mesh: &mut M,
    remap: &VertexRemap,
    options: &PatchTablesOptions,
) -> Result<PatchTables> {
    options.validate()?;
    PatchTablesFactory::new(mesh, remap)?.create(options)
}
