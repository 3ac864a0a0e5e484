use tracing::debug;

use crate::descriptor::{DescriptorMap, PatchArray};

/// Offsets of every non-empty patch array and the resulting table sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchLayout {
    pub arrays: Vec<PatchArray>,
    pub num_control_vertices: usize,
    pub num_patches: usize,
    pub num_quad_offsets: usize,
}

/// Lay out one patch array per descriptor with a non-zero count, in
/// canonical descriptor order, packed back to back.
pub fn layout_patch_arrays(counts: &DescriptorMap<usize>) -> PatchLayout {
    let mut arrays = Vec::new();
    let (mut vertex_offset, mut patch_offset, mut quad_offset) = (0, 0, 0);

    for (descriptor, &count) in counts.iter() {
        if count == 0 {
            continue;
        }

        arrays.push(PatchArray {
            descriptor,
            vertex_offset,
            patch_offset,
            patch_count: count,
            quad_offset_offset: quad_offset,
        });

        vertex_offset += count * descriptor.num_control_vertices();
        patch_offset += count;
        if descriptor.patch_type().is_gregory() {
            quad_offset += count * 4;
        }
    }

    debug!(
        "Laid out {} patch arrays: {} patches, {} control vertices, {} quad offsets",
        arrays.len(),
        patch_offset,
        vertex_offset,
        quad_offset
    );

    PatchLayout {
        arrays,
        num_control_vertices: vertex_offset,
        num_patches: patch_offset,
        num_quad_offsets: quad_offset,
    }
}
