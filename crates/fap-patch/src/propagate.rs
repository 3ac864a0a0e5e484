//! First pass: mark where refined regions meet unrefined ones.

use fap_core::error::Result;
use fap_topology::{FaceId, MeshTraversal};
use tracing::debug;

use crate::tags::TagStore;

/// Propagate selection tags to vertices and edges, in face order.
///
/// Forces the centroid of every selected face and the midpoint of every
/// transition edge. Both are idempotent on the mesh.
pub fn propagate_tags<M: MeshTraversal + ?Sized>(
    mesh: &mut M,
    faces: &[FaceId],
    tags: &mut TagStore,
) -> Result<()> {
    let mut transition_edges = 0usize;
    let mut critical_edges = 0usize;

    for &f in faces {
        let face_tagged = tags.face(f).is_tagged;

        if face_tagged && !mesh.face_is_hole(f) {
            let center = mesh.subdivide_face(f);
            tags.vertex_mut(center)?.was_tagged = true;
        }

        let coarse = mesh.face_parent(f).is_none();
        for j in 0..mesh.face_num_vertices(f) {
            if coarse {
                tags.vertex_mut(mesh.face_vertex(f, j))?.was_tagged = true;
            }

            let e = mesh.face_edge(f, j);
            let opposite = mesh.edge_opposite(e);

            if face_tagged {
                tags.edge_mut(e)?.is_triangle_head = true;
                if let Some(o) = opposite {
                    tags.edge_mut(o)?.is_triangle_head = true;
                }
            }

            let Some(right) = mesh.edge_right_face(e) else {
                continue;
            };

            // An edge without a child lies inside a hole
            if !mesh.edge_has_child(e) || face_tagged == tags.face(right).is_tagged {
                continue;
            }

            tags.edge_mut(e)?.is_transition = true;
            transition_edges += 1;

            let mid = mesh.subdivide_edge(e);
            for end in [mesh.edge_org(e), mesh.edge_dest(e)] {
                let Some(end_child) = mesh.vertex_child(end) else {
                    continue;
                };
                if let Some(critical) = mesh.vertex_edge_to(mid, end_child) {
                    tags.edge_mut(critical)?.is_watertight_critical = true;
                    critical_edges += 1;
                }
            }
        }
    }

    debug!(
        "Propagated tags over {} faces: {} transition half-edges, {} watertight-critical",
        faces.len(),
        transition_edges,
        critical_edges
    );
    Ok(())
}
