use serde::{Deserialize, Serialize};

use crate::descriptor::{Descriptor, PatchArray};
use crate::ptex::PtexCoord;

/// Finished patch tables, grouped into patch arrays.
///
/// Every per-patch table is indexed by the patch slot
/// `array.patch_offset + i`; control vertices start at
/// `array.vertex_offset + i * cv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchTables {
    pub(crate) patch_arrays: Vec<PatchArray>,
    pub(crate) control_vertices: Vec<u32>,
    pub(crate) ptex_coords: Vec<PtexCoord>,
    pub(crate) face_varying: Option<Vec<f32>>,
    pub(crate) vertex_valences: Vec<i32>,
    pub(crate) quad_offsets: Vec<u32>,
    pub(crate) max_valence: usize,
    pub(crate) max_level: u8,
    pub(crate) fvar_width: usize,
}

impl PatchTables {
    pub fn patch_arrays(&self) -> &[PatchArray] {
        &self.patch_arrays
    }

    pub fn find_patch_array(&self, descriptor: Descriptor) -> Option<&PatchArray> {
        self.patch_arrays
            .iter()
            .find(|a| a.descriptor == descriptor)
    }

    pub fn num_patches(&self) -> usize {
        self.ptex_coords.len()
    }

    pub fn num_control_vertices(&self) -> usize {
        self.control_vertices.len()
    }

    /// Control-vertex indices of every patch, back to back.
    pub fn control_vertices(&self) -> &[u32] {
        &self.control_vertices
    }

    /// Control vertices of patch `i` of `array`.
    pub fn patch_vertices(&self, array: &PatchArray, i: usize) -> Option<&[u32]> {
        if i >= array.patch_count {
            return None;
        }
        let cv = array.descriptor.num_control_vertices();
        let start = array.vertex_offset + i * cv;
        self.control_vertices.get(start..start + cv)
    }

    pub fn ptex_coords(&self) -> &[PtexCoord] {
        &self.ptex_coords
    }

    /// Face-varying values, `4 * width` per patch, if they were requested.
    pub fn face_varying(&self) -> Option<&[f32]> {
        self.face_varying.as_deref()
    }

    pub fn face_varying_width(&self) -> usize {
        self.fvar_width
    }

    /// Per-vertex valence rows, present only when Gregory patches exist.
    pub fn vertex_valences(&self) -> Option<&[i32]> {
        (!self.vertex_valences.is_empty()).then_some(self.vertex_valences.as_slice())
    }

    /// Packed quad offsets, 4 per Gregory patch: Gregory patches first,
    /// then Gregory boundary patches.
    pub fn quad_offsets(&self) -> &[u32] {
        &self.quad_offsets
    }

    pub fn max_valence(&self) -> usize {
        self.max_valence
    }

    pub fn max_level(&self) -> u8 {
        self.max_level
    }
}
