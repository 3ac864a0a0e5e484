//! Control-vertex gathering for regular, boundary and corner patches.
//!
//! The four face corners are written first, then fixed two-hop half-edge
//! walks collect the rest of the ring. Each write goes through a
//! permutation that puts the result in the canonical patch layout:
//!
//! ```text
//!   regular (16)        boundary (12)       corner (9)
//!                       ------------        ---------+
//!    0  1  2  3          0  1  2  3          0  1  2 |
//!    4  5  6  7          4  5  6  7          3  4  5 |
//!    8  9 10 11          8  9 10 11          6  7  8 |
//!   12 13 14 15
//! ```

use fap_core::error::{FapError, Result};
use fap_topology::{FaceId, HalfEdgeId, MeshTraversal, VertexId, VertexRemap};

use crate::descriptor::PatchType;

const REGULAR_PERMUTATION: [usize; 16] = [5, 6, 10, 9, 4, 0, 1, 2, 3, 7, 11, 15, 14, 13, 12, 8];
const BOUNDARY_PERMUTATION: [usize; 12] = [1, 2, 6, 5, 0, 3, 7, 11, 10, 9, 8, 4];
const CORNER_PERMUTATION: [usize; 9] = [1, 2, 5, 4, 0, 8, 7, 6, 3];

pub(crate) fn remap_vertex(remap: &VertexRemap, v: VertexId) -> Result<u32> {
    remap
        .get(v)
        .copied()
        .ok_or_else(|| FapError::MissingRemap(format!("{:?}", v)))
}

/// Writes remapped vertex ids through a permutation, in walk order.
struct RingWriter<'a> {
    remap: &'a VertexRemap,
    permutation: &'static [usize],
    out: &'a mut [u32],
    written: usize,
}

impl<'a> RingWriter<'a> {
    fn push(&mut self, v: VertexId) -> Result<()> {
        let slot = *self.permutation.get(self.written).ok_or_else(|| {
            FapError::Layout(format!(
                "One-ring walk produced more than {} vertices",
                self.permutation.len()
            ))
        })?;
        self.out[slot] = remap_vertex(self.remap, v)?;
        self.written += 1;
        Ok(())
    }
}

fn missing(f: FaceId, what: &str) -> FapError {
    FapError::Topology(format!("One-ring walk around face {:?}: {}", f, what))
}

/// Next outgoing half-edge counter-clockwise around the origin of `e`.
fn rotate<M: MeshTraversal + ?Sized>(mesh: &M, f: FaceId, e: HalfEdgeId) -> Result<HalfEdgeId> {
    mesh.vertex_next_edge(e)
        .ok_or_else(|| missing(f, "ran off a boundary while turning around a vertex"))
}

/// Push the origins of the next three half-edges after `e`.
fn push_three<M: MeshTraversal + ?Sized>(
    mesh: &M,
    ring: &mut RingWriter<'_>,
    mut e: HalfEdgeId,
) -> Result<()> {
    for _ in 0..3 {
        e = mesh.edge_next(e);
        ring.push(mesh.edge_org(e))?;
    }
    Ok(())
}

/// Gather the control vertices of a regular, boundary or corner patch
/// into `out`, which must hold exactly `patch_type.num_control_vertices()`
/// slots.
pub fn gather_one_ring<M: MeshTraversal + ?Sized>(
    mesh: &M,
    remap: &VertexRemap,
    f: FaceId,
    patch_type: PatchType,
    rotation: u8,
    out: &mut [u32],
) -> Result<()> {
    let permutation: &'static [usize] = match patch_type {
        PatchType::Regular => &REGULAR_PERMUTATION,
        PatchType::Boundary => &BOUNDARY_PERMUTATION,
        PatchType::Corner => &CORNER_PERMUTATION,
        PatchType::Gregory | PatchType::GregoryBoundary => {
            return Err(FapError::InvalidOperation(format!(
                "{:?} patches have no one-ring",
                patch_type
            )))
        }
    };
    if out.len() != permutation.len() {
        return Err(FapError::Layout(format!(
            "{:?} one-ring needs {} slots, got {}",
            patch_type,
            permutation.len(),
            out.len()
        )));
    }
    if mesh.face_num_vertices(f) != 4 {
        return Err(FapError::Topology(format!(
            "Face {:?} is not a quad",
            f
        )));
    }

    let rot = rotation as usize;
    let corner = |i: usize| (i + rot) % 4;
    let v: [VertexId; 4] = std::array::from_fn(|i| mesh.face_vertex(f, corner(i)));

    let mut ring = RingWriter {
        remap,
        permutation,
        out,
        written: 0,
    };
    for &c in &v {
        ring.push(c)?;
    }

    match patch_type {
        PatchType::Regular => {
            for i in 0..4 {
                let e = mesh.face_edge(f, corner(i));
                let e = rotate(mesh, f, rotate(mesh, f, e)?)?;
                push_three(mesh, &mut ring, e)?;
            }
        }
        PatchType::Boundary => {
            ring.push(outer_boundary_neighbor(mesh, f, v[0])?)?;

            let e = mesh
                .vertex_incident_edge(v[1])
                .ok_or_else(|| missing(f, "corner 1 has no incident edge"))?;
            ring.push(mesh.edge_dest(e))?;

            for (a, b) in [(v[2], v[1]), (v[3], v[2])] {
                let e = mesh
                    .vertex_edge_to(a, b)
                    .ok_or_else(|| missing(f, "no half-edge along a patch side"))?;
                push_three(mesh, &mut ring, rotate(mesh, f, e)?)?;
            }
        }
        _ => {
            ring.push(outer_boundary_neighbor(mesh, f, v[0])?)?;

            let e = mesh
                .vertex_incident_edge(v[2])
                .ok_or_else(|| missing(f, "corner 2 has no incident edge"))?;
            ring.push(mesh.edge_dest(e))?;

            let e = mesh
                .vertex_edge_to(v[3], v[2])
                .ok_or_else(|| missing(f, "no half-edge along a patch side"))?;
            push_three(mesh, &mut ring, rotate(mesh, f, e)?)?;
        }
    }

    if ring.written != permutation.len() {
        return Err(FapError::Layout(format!(
            "One-ring of face {:?} wrote {} of {} vertices",
            f,
            ring.written,
            permutation.len()
        )));
    }
    Ok(())
}

/// Boundary vertex two steps away from `v`, across the face before its
/// incident boundary edge.
fn outer_boundary_neighbor<M: MeshTraversal + ?Sized>(
    mesh: &M,
    f: FaceId,
    v: VertexId,
) -> Result<VertexId> {
    let e = mesh
        .vertex_incident_edge(v)
        .ok_or_else(|| missing(f, "corner 0 has no incident edge"))?;
    let e = mesh
        .edge_opposite(mesh.edge_prev(e))
        .ok_or_else(|| missing(f, "corner 0 has no neighboring face"))?;
    Ok(mesh.edge_org(mesh.edge_prev(e)))
}
