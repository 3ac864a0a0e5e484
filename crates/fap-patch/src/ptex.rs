use fap_core::error::{FapError, Result};
use fap_topology::{FaceId, MeshTraversal};
use serde::{Deserialize, Serialize};

const DEPTH_BITS: u32 = 4;
const NON_QUAD_SHIFT: u32 = 4;
const ROTATION_SHIFT: u32 = 5;
const V_SHIFT: u32 = 7;
const U_SHIFT: u32 = 17;
const UV_BITS: u32 = 10;

/// Location of a patch inside its ptex face.
///
/// `bits` packs, from the least significant bit: depth (4 bits), the
/// non-quad root flag (1), rotation (2), `v` (10) and `u` (10). `u` and `v`
/// count patches of size `1 / 2^depth` from the ptex face origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PtexCoord {
    pub face_index: u32,
    pub bits: u32,
}

impl PtexCoord {
    pub fn new(
        face_index: u32,
        u: u32,
        v: u32,
        depth: u8,
        non_quad_root: bool,
        rotation: u8,
    ) -> Self {
        let mask = (1 << UV_BITS) - 1;
        let bits = (u32::from(depth) & ((1 << DEPTH_BITS) - 1))
            | (u32::from(non_quad_root) << NON_QUAD_SHIFT)
            | ((u32::from(rotation) & 3) << ROTATION_SHIFT)
            | ((v & mask) << V_SHIFT)
            | ((u & mask) << U_SHIFT);
        Self { face_index, bits }
    }

    pub fn depth(&self) -> u8 {
        (self.bits & ((1 << DEPTH_BITS) - 1)) as u8
    }

    /// The ptex face is a sub-face of a non-quad coarse face.
    pub fn non_quad_root(&self) -> bool {
        (self.bits >> NON_QUAD_SHIFT) & 1 == 1
    }

    pub fn rotation(&self) -> u8 {
        ((self.bits >> ROTATION_SHIFT) & 3) as u8
    }

    pub fn u(&self) -> u32 {
        (self.bits >> U_SHIFT) & ((1 << UV_BITS) - 1)
    }

    pub fn v(&self) -> u32 {
        (self.bits >> V_SHIFT) & ((1 << UV_BITS) - 1)
    }
}

/// Walk up the parents of `f` to its ptex face, accumulating the patch's
/// `u`, `v` position. The walk stops below a non-quad parent, whose
/// children are ptex faces of their own.
pub fn compute_ptex_coordinate<M: MeshTraversal + ?Sized>(
    mesh: &M,
    f: FaceId,
    rotation: u8,
) -> Result<PtexCoord> {
    let (mut u, mut v) = (0u32, 0u32);
    let mut offset = 1u32;
    let mut depth = 0u8;
    let mut non_quad_root = false;
    let mut current = f;

    while let Some(parent) = mesh.face_parent(current) {
        if mesh.face_num_vertices(parent) != 4 {
            non_quad_root = true;
            break;
        }

        let child = mesh.face_child_index(current).ok_or_else(|| {
            FapError::Topology(format!(
                "Face {:?} is not among the children of its parent {:?}",
                current, parent
            ))
        })?;
        match child {
            1 => u += offset,
            2 => {
                u += offset;
                v += offset;
            }
            3 => v += offset,
            _ => {}
        }

        offset <<= 1;
        depth += 1;
        if depth >= 1 << DEPTH_BITS || offset > 1 << UV_BITS {
            return Err(FapError::Unsupported(format!(
                "Face {:?} is too deep for a ptex coordinate",
                f
            )));
        }
        current = parent;
    }

    let face_index = u32::try_from(mesh.face_ptex_index(current)).map_err(|_| {
        FapError::Unsupported(format!("Ptex index of face {:?} does not fit 32 bits", current))
    })?;
    Ok(PtexCoord::new(face_index, u, v, depth, non_quad_root, rotation))
}
