//! Final pass: write every classified face into its patch array slot.

use fap_core::error::{FapError, Result};
use fap_topology::{FaceId, MeshTraversal, VertexRemap};
use tracing::{debug, trace};

use crate::descriptor::{DescriptorMap, PatchArray};
use crate::fvar::gather_face_varying;
use crate::layout::PatchLayout;
use crate::one_ring::{gather_one_ring, remap_vertex};
use crate::options::PatchTablesOptions;
use crate::ptex::{compute_ptex_coordinate, PtexCoord};
use crate::quad_offsets::compute_quad_offsets;
use crate::tables::PatchTables;
use crate::tags::TagStore;
use crate::valence::build_vertex_valence_table;

/// Write position inside one patch array.
#[derive(Debug, Clone, Copy)]
struct BucketCursor {
    array: PatchArray,
    written: usize,
}

impl BucketCursor {
    /// Claim the next patch index of the array.
    fn advance(&mut self) -> Result<usize> {
        if self.written == self.array.patch_count {
            return Err(FapError::Layout(format!(
                "{:?} array overflows its {} patches",
                self.array.descriptor, self.array.patch_count
            )));
        }
        self.written += 1;
        Ok(self.written - 1)
    }
}

pub fn emit_patch_tables<M: MeshTraversal + ?Sized>(
    mesh: &M,
    remap: &VertexRemap,
    faces: &[FaceId],
    tags: &TagStore,
    layout: PatchLayout,
    options: &PatchTablesOptions,
) -> Result<PatchTables> {
    let fvar_width = mesh.face_varying_width();

    let mut cursors: DescriptorMap<Option<BucketCursor>> = DescriptorMap::new();
    for &array in &layout.arrays {
        cursors[array.descriptor] = Some(BucketCursor { array, written: 0 });
    }

    let mut control_vertices = vec![0u32; layout.num_control_vertices];
    let mut ptex_coords = vec![PtexCoord::default(); layout.num_patches];
    let mut quad_offsets = vec![0u32; layout.num_quad_offsets];
    let mut face_varying = options
        .require_face_varying
        .then(|| vec![0.0f32; layout.num_patches * 4 * fvar_width]);

    for &f in faces {
        let ft = tags.face(f);
        let Some(descriptor) = ft.descriptor else {
            continue;
        };

        let cursor = cursors[descriptor].as_mut().ok_or_else(|| {
            FapError::Layout(format!("No patch array for {:?}", descriptor))
        })?;
        let i = cursor.advance()?;
        let array = cursor.array;

        let cv = descriptor.num_control_vertices();
        let vertex_start = array.vertex_offset + i * cv;
        let slot = &mut control_vertices[vertex_start..vertex_start + cv];

        if descriptor.patch_type().is_gregory() {
            for (j, out) in slot.iter_mut().enumerate() {
                *out = remap_vertex(remap, mesh.face_vertex(f, j))?;
            }
            let quad_start = array.quad_offset_offset + i * 4;
            quad_offsets[quad_start..quad_start + 4]
                .copy_from_slice(&compute_quad_offsets(mesh, f)?);
        } else {
            gather_one_ring(
                mesh,
                remap,
                f,
                descriptor.patch_type(),
                ft.rotation.rotation,
                slot,
            )?;
        }

        let patch = array.patch_offset + i;
        let ptex = compute_ptex_coordinate(mesh, f, ft.rotation.rotation)?;
        if ptex.depth() > options.max_level {
            return Err(FapError::Unsupported(format!(
                "Patch from face {:?} is at depth {}, deeper than max_level {}",
                f,
                ptex.depth(),
                options.max_level
            )));
        }
        ptex_coords[patch] = ptex;

        if let Some(fvar) = face_varying.as_mut() {
            let start = patch * 4 * fvar_width;
            gather_face_varying(
                mesh,
                f,
                ft.rotation.rotation,
                &mut fvar[start..start + 4 * fvar_width],
            )?;
        }

        trace!("Emitted face {:?} as {:?} patch {}", f, descriptor, patch);
    }

    for (descriptor, cursor) in cursors.iter() {
        if let Some(cursor) = cursor {
            if cursor.written != cursor.array.patch_count {
                return Err(FapError::Layout(format!(
                    "{:?} array filled {} of {} patches",
                    descriptor, cursor.written, cursor.array.patch_count
                )));
            }
        }
    }

    let vertex_valences = if layout.num_quad_offsets > 0 {
        build_vertex_valence_table(mesh, remap, options.max_valence)?
    } else {
        Vec::new()
    };

    debug!(
        "Emitted {} patches in {} arrays: {} control vertices, {} quad offsets, {} valence entries",
        layout.num_patches,
        layout.arrays.len(),
        control_vertices.len(),
        quad_offsets.len(),
        vertex_valences.len()
    );

    Ok(PatchTables {
        patch_arrays: layout.arrays,
        control_vertices,
        ptex_coords,
        face_varying,
        vertex_valences,
        quad_offsets,
        max_valence: options.max_valence,
        max_level: options.max_level,
        fvar_width,
    })
}
