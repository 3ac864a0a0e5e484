use fap_core::error::{FapError, Result};
use fap_topology::{surrounding_vertices, MeshTraversal, VertexRemap};
use tracing::debug;

use crate::one_ring::remap_vertex;

/// Build the per-vertex neighbor table used to evaluate Gregory patches.
///
/// Each output vertex owns a row of `2 * max_valence + 1` entries: the
/// signed valence (negative on a boundary), then one `(neighbor, diagonal)`
/// pair per neighbor in counter-clockwise order. Rows are placed by the
/// vertex's remapped index. Disconnected vertices get a zero valence.
///
/// A singular vertex gets the fan that holds its incident edge, the most
/// clockwise outgoing half-edge. Quad offsets of faces in that fan index
/// the same cycle; faces in its other fans index their own.
pub fn build_vertex_valence_table<M: MeshTraversal + ?Sized>(
    mesh: &M,
    remap: &VertexRemap,
    max_valence: usize,
) -> Result<Vec<i32>> {
    let row = 2 * max_valence + 1;
    let mut table = vec![0i32; mesh.num_vertices() * row];

    for v in mesh.vertex_ids() {
        // Adaptive refinement leaves unconnected face centroids behind
        if !mesh.vertex_is_connected(v) {
            continue;
        }

        let offset = remap_vertex(remap, v)? as usize * row;
        let entries = table.get_mut(offset..offset + row).ok_or_else(|| {
            FapError::MissingRemap(format!(
                "{:?} maps past the {} rows of the valence table",
                v,
                mesh.num_vertices()
            ))
        })?;

        let mut valence = 0usize;
        for n in surrounding_vertices(mesh, v) {
            if valence == max_valence {
                return Err(FapError::ValenceExceeded {
                    vertex: format!("{:?}", v),
                    valence: mesh.vertex_valence(v),
                    max: max_valence,
                });
            }

            // Boundary neighbors may have no diagonal
            let diagonal = mesh
                .vertex_edge_to(v, n)
                .map(|e| mesh.edge_dest(mesh.edge_next(e)))
                .unwrap_or(n);

            entries[1 + 2 * valence] = remap_vertex(remap, n)? as i32;
            entries[2 + 2 * valence] = remap_vertex(remap, diagonal)? as i32;
            valence += 1;
        }

        entries[0] = if mesh.vertex_on_boundary(v) {
            -(valence as i32)
        } else {
            valence as i32
        };
    }

    debug!(
        "Built vertex valence table: {} vertices, row width {}",
        mesh.num_vertices(),
        row
    );
    Ok(table)
}
