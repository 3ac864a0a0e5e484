//! Second pass: decide the patch type, transition pattern and rotation of
//! every face, and count patches per descriptor.

use fap_core::error::{FapError, Result};
use fap_topology::{incident_edges, FaceId, MeshTraversal, VertexId};
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::descriptor::{Descriptor, DescriptorMap, PatchType, TransitionPattern};
use crate::tags::{FacePatchKind, PatchRotation, TagStore};

/// `RECONCILED_ROTATION[t][b]` is the bucket rotation of a boundary or
/// corner transition patch with transition rotation `t` and shape rotation `b`.
const RECONCILED_ROTATION: [[u8; 4]; 4] = [
    [0, 1, 2, 3],
    [3, 0, 1, 2],
    [2, 3, 0, 1],
    [1, 2, 3, 0],
];

/// Combine the transition rotation `t` and the boundary/corner shape
/// rotation `b` of a patch.
pub fn reconcile_rotation(
    pattern: TransitionPattern,
    patch_type: PatchType,
    t: u8,
    b: u8,
) -> PatchRotation {
    let (rotation, boundary_rotation) = match (pattern.is_transition(), patch_type.has_rotations()) {
        (false, false) => (0, 0),
        (false, true) => (b, (b + 1) % 4),
        (true, false) => (t, 0),
        (true, true) => (b, RECONCILED_ROTATION[t as usize % 4][b as usize % 4]),
    };
    PatchRotation {
        rotation,
        boundary_rotation,
    }
}

fn descriptor_for(
    patch_type: PatchType,
    pattern: TransitionPattern,
    rotation: u8,
) -> Result<Descriptor> {
    Descriptor::new(patch_type, pattern, rotation).ok_or_else(|| {
        FapError::Layout(format!(
            "No descriptor for {:?} {:?} rotation {}",
            patch_type, pattern, rotation
        ))
    })
}

/// What a single face contributes to the tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PatchDecision {
    kind: FacePatchKind,
    transition: TransitionPattern,
    rotation: PatchRotation,
    descriptor: Descriptor,
}

/// Per-face facts gathered from the four corners and edges.
#[derive(Debug, Clone, Copy, Default)]
struct FaceScan {
    on_boundary: [bool; 4],
    boundary_count: u8,
    is_extraordinary: bool,
    is_critical: bool,
    any_tagged: bool,
    any_was_tagged: bool,
    heads: [bool; 4],
    connected: bool,
}

impl FaceScan {
    fn head_count(&self) -> usize {
        self.heads.iter().filter(|&&h| h).count()
    }

    /// Regular, boundary or corner shape with its rotation, if the face has one.
    fn full_shape(&self) -> Option<(PatchType, u8)> {
        if self.is_extraordinary {
            return None;
        }
        let b = &self.on_boundary;
        match self.boundary_count {
            0 => Some((PatchType::Regular, 0)),
            2 => (0..4u8)
                .find(|&i| b[i as usize] && b[(i as usize + 1) % 4])
                .map(|r| (PatchType::Boundary, r)),
            3 => (0..4u8)
                .find(|&i| !b[(i as usize + 3) % 4])
                .map(|r| (PatchType::Corner, r)),
            _ => None,
        }
    }

    /// Transition pattern and transition rotation from the triangle heads.
    fn transition(&self) -> (TransitionPattern, u8) {
        let h = &self.heads;
        let first = |pred: &dyn Fn(usize) -> bool| (0..4).find(|&j| pred(j)).unwrap_or(0) as u8;
        match self.head_count() {
            0 => (TransitionPattern::NonTransition, 0),
            1 => (TransitionPattern::Pattern0, first(&|j| h[j])),
            2 if self.connected => (
                TransitionPattern::Pattern1,
                first(&|j| h[j] && h[(j + 3) % 4]),
            ),
            2 => (TransitionPattern::Pattern4, first(&|j| h[j])),
            3 => (TransitionPattern::Pattern2, first(&|j| !h[j])),
            _ => (TransitionPattern::Pattern3, 0),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct FaceOutcome {
    face: FaceId,
    scan: FaceScan,
    patch: Option<PatchDecision>,
}

/// Some face around `v` has no resolved (`was_tagged`) vertex.
fn vertex_has_unresolved_neighbors<M: MeshTraversal + ?Sized>(
    mesh: &M,
    tags: &TagStore,
    v: VertexId,
) -> bool {
    let unresolved = |f: FaceId| {
        !(0..mesh.face_num_vertices(f)).any(|j| tags.vertex(mesh.face_vertex(f, j)).was_tagged)
    };
    incident_edges(mesh, v).any(|e| {
        unresolved(mesh.edge_face(e)) || mesh.edge_right_face(e).map_or(false, unresolved)
    })
}

fn scan_face<M: MeshTraversal + ?Sized>(mesh: &M, tags: &TagStore, f: FaceId) -> FaceScan {
    let mut scan = FaceScan::default();
    let has_parent = mesh.face_parent(f).is_some();

    for j in 0..4 {
        let v = mesh.face_vertex(f, j);

        if mesh.vertex_on_boundary(v) {
            scan.on_boundary[j] = true;
            scan.boundary_count += 1;
            if mesh.vertex_is_singular(v) || mesh.vertex_valence(v) > 3 {
                scan.is_extraordinary = true;
            }
        } else if mesh.vertex_is_extraordinary(v) {
            scan.is_extraordinary = true;
        }

        if has_parent && !scan.is_critical {
            scan.is_critical = vertex_has_unresolved_neighbors(mesh, tags, v);
        }

        let vt = tags.vertex(v);
        scan.any_tagged |= vt.is_tagged;
        scan.any_was_tagged |= vt.was_tagged;

        scan.heads[j] = tags.edge(mesh.face_edge(f, j)).is_triangle_head;
    }
    scan.connected = (0..4).any(|j| scan.heads[j] && scan.heads[(j + 1) % 4]);
    scan
}

fn decide<M: MeshTraversal + ?Sized>(
    mesh: &M,
    tags: &TagStore,
    f: FaceId,
) -> Result<Option<FaceOutcome>> {
    if mesh.face_is_extraordinary(f) || mesh.face_is_hole(f) {
        return Ok(None);
    }
    let nv = mesh.face_num_vertices(f);
    if nv != 4 {
        return Err(FapError::Topology(format!(
            "Face {:?} has {} vertices where a quad is required",
            f, nv
        )));
    }

    let scan = scan_face(mesh, tags, f);
    let mut outcome = FaceOutcome {
        face: f,
        scan,
        patch: None,
    };

    // Still refining, or outside any resolved region
    if tags.face(f).is_tagged || scan.any_tagged || !scan.any_was_tagged {
        return Ok(Some(outcome));
    }

    let full = scan.full_shape();
    let (pattern, t) = scan.transition();

    let decision = if !pattern.is_transition() {
        match full {
            Some((patch_type, b)) => PatchDecision {
                kind: FacePatchKind::Full,
                transition: pattern,
                rotation: reconcile_rotation(pattern, patch_type, 0, b),
                descriptor: descriptor_for(patch_type, pattern, 0)?,
            },
            None => {
                let patch_type = if scan.boundary_count == 0 {
                    PatchType::Gregory
                } else {
                    PatchType::GregoryBoundary
                };
                PatchDecision {
                    kind: FacePatchKind::Gregory,
                    transition: pattern,
                    rotation: PatchRotation::default(),
                    descriptor: descriptor_for(patch_type, pattern, 0)?,
                }
            }
        }
    } else {
        let (patch_type, b) = full.ok_or_else(|| {
            FapError::Unsupported(format!(
                "Face {:?} is a {:?} transition without a regular, boundary or corner shape \
                 ({} boundary vertices, extraordinary: {})",
                f, pattern, scan.boundary_count, scan.is_extraordinary
            ))
        })?;
        let rotation = reconcile_rotation(pattern, patch_type, t, b);
        let slot = if patch_type.has_rotations() {
            rotation.boundary_rotation
        } else {
            0
        };
        PatchDecision {
            kind: FacePatchKind::Full,
            transition: pattern,
            rotation,
            descriptor: descriptor_for(patch_type, pattern, slot)?,
        }
    };

    trace!(
        "Face {:?}: {:?} rotation {:?}",
        f,
        decision.descriptor,
        decision.rotation
    );
    outcome.patch = Some(decision);
    Ok(Some(outcome))
}

/// Classify every face and return the patch count per descriptor.
///
/// Decisions are computed in parallel and applied to `tags` in face order.
pub fn classify_faces<M: MeshTraversal + Sync + ?Sized>(
    mesh: &M,
    faces: &[FaceId],
    tags: &mut TagStore,
) -> Result<DescriptorMap<usize>> {
    let outcomes = {
        let tags = &*tags;
        faces
            .par_iter()
            .map(|&f| decide(mesh, tags, f))
            .collect::<Result<Vec<_>>>()?
    };

    let mut counts = DescriptorMap::new();
    for outcome in outcomes.into_iter().flatten() {
        let ft = tags.face_mut(outcome.face)?;
        ft.boundary_count = outcome.scan.boundary_count;
        ft.is_critical = outcome.scan.is_critical;
        ft.is_extraordinary = outcome.scan.is_extraordinary;
        ft.was_tagged = outcome.scan.any_was_tagged;
        if ft.was_tagged {
            ft.kind = FacePatchKind::End;
        }

        if let Some(decision) = outcome.patch {
            ft.kind = decision.kind;
            ft.transition = decision.transition;
            ft.rotation = decision.rotation;
            ft.descriptor = Some(decision.descriptor);
            counts[decision.descriptor] += 1;
        }
    }

    for (descriptor, &count) in counts.iter().filter(|&(_, &c)| c > 0) {
        debug!("Classified {} patches as {:?}", count, descriptor);
    }
    debug!(
        "Classified {} patches from {} faces",
        counts.total(),
        faces.len()
    );
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagate::propagate_tags;
    use fap_topology::Mesh;

    fn classify(mesh: &mut Mesh) -> (Vec<FaceId>, TagStore, DescriptorMap<usize>) {
        let faces = mesh.face_ids();
        let mut tags = TagStore::seeded(&*mesh, &faces);
        propagate_tags(mesh, &faces, &mut tags).unwrap();
        let counts = classify_faces(&*mesh, &faces, &mut tags).unwrap();
        (faces, tags, counts)
    }

    fn nt(patch_type: PatchType, rotation: u8) -> Descriptor {
        Descriptor::new(patch_type, TransitionPattern::NonTransition, rotation).unwrap()
    }

    fn desc(patch_type: PatchType, pattern: TransitionPattern, rotation: u8) -> Descriptor {
        Descriptor::new(patch_type, pattern, rotation).unwrap()
    }

    #[test]
    fn test_reconcile_rotation_contract() {
        use PatchType::*;
        use TransitionPattern::*;

        for b in 0..4 {
            for t in 0..4 {
                // Non-transition patches ignore the transition rotation
                for patch_type in [Regular, Gregory, GregoryBoundary] {
                    let r = reconcile_rotation(NonTransition, patch_type, t, b);
                    assert_eq!(r, PatchRotation::default());
                }
                for patch_type in [Boundary, Corner] {
                    let r = reconcile_rotation(NonTransition, patch_type, t, b);
                    assert_eq!(r.rotation, b);
                    assert_eq!(r.boundary_rotation, (b + 1) % 4);
                }

                for pattern in [Pattern0, Pattern1, Pattern2, Pattern3, Pattern4] {
                    let r = reconcile_rotation(pattern, Regular, t, b);
                    assert_eq!(r, PatchRotation { rotation: t, boundary_rotation: 0 });

                    for patch_type in [Boundary, Corner] {
                        let r = reconcile_rotation(pattern, patch_type, t, b);
                        assert_eq!(r.rotation, b);
                        assert_eq!(r.boundary_rotation, (4 - t + b) % 4);
                        // Undoing the shape rotation recovers the transition rotation
                        assert_eq!((4 + r.rotation - r.boundary_rotation) % 4, t);
                    }
                }
            }
        }
    }

    #[test]
    fn test_interior_regular_face() {
        let mut mesh = Mesh::quad_grid(3, 3).unwrap();
        let (faces, tags, counts) = classify(&mut mesh);

        let center = tags.face(faces[4]);
        assert_eq!(center.kind, FacePatchKind::Full);
        assert_eq!(center.boundary_count, 0);
        assert_eq!(center.rotation, PatchRotation::default());
        assert_eq!(center.descriptor, Some(nt(PatchType::Regular, 0)));

        assert_eq!(counts[nt(PatchType::Regular, 0)], 1);
        assert_eq!(counts[nt(PatchType::Boundary, 0)], 4);
        assert_eq!(counts[nt(PatchType::Corner, 0)], 4);
        assert_eq!(counts.total(), 9);
    }

    #[test]
    fn test_boundary_and_corner_rotations() {
        let mut mesh = Mesh::quad_grid(3, 3).unwrap();
        let (faces, tags, _) = classify(&mut mesh);

        // Face (x, y) is faces[y * 3 + x]
        let bottom = tags.face(faces[1]);
        assert_eq!(bottom.boundary_count, 2);
        assert_eq!(bottom.rotation.rotation, 0);
        let right = tags.face(faces[5]);
        assert_eq!(right.rotation.rotation, 1);
        let top = tags.face(faces[7]);
        assert_eq!(top.rotation.rotation, 2);
        let left = tags.face(faces[3]);
        assert_eq!(left.rotation.rotation, 3);

        let corner = tags.face(faces[0]);
        assert_eq!(corner.boundary_count, 3);
        assert_eq!(corner.rotation.rotation, 3);
        assert_eq!(tags.face(faces[2]).rotation.rotation, 0);
        assert_eq!(tags.face(faces[8]).rotation.rotation, 1);
        assert_eq!(tags.face(faces[6]).rotation.rotation, 2);
    }

    #[test]
    fn test_cube_faces_are_gregory() {
        let mut mesh = Mesh::cube().unwrap();
        let (faces, tags, counts) = classify(&mut mesh);

        assert_eq!(counts[nt(PatchType::Gregory, 0)], 6);
        assert_eq!(counts.total(), 6);
        for f in faces {
            let ft = tags.face(f);
            assert_eq!(ft.kind, FacePatchKind::Gregory);
            assert!(ft.is_extraordinary);
        }
    }

    #[test]
    fn test_star_faces_are_gregory_boundary() {
        let mut mesh = Mesh::star(5).unwrap();
        let (_, _, counts) = classify(&mut mesh);
        assert_eq!(counts[nt(PatchType::GregoryBoundary, 0)], 5);
        assert_eq!(counts.total(), 5);
    }

    #[test]
    fn test_holes_are_skipped() {
        let mut mesh = Mesh::quad_grid(3, 3).unwrap();
        let hole = mesh.face_ids()[4];
        mesh.set_hole(hole, true).unwrap();
        let (_, tags, counts) = classify(&mut mesh);

        assert_eq!(tags.face(hole).descriptor, None);
        assert_eq!(tags.face(hole).kind, FacePatchKind::None);
        assert_eq!(counts.total(), 8);
    }

    #[test]
    fn test_refined_center_makes_transitions() {
        let mut mesh = Mesh::quad_grid(3, 3).unwrap();
        let center = mesh.face_ids()[4];
        mesh.tag_face(center).unwrap();
        mesh.refine_face(center).unwrap();
        let (faces, tags, counts) = classify(&mut mesh);

        // The tagged face is skipped; its children share the resolved centroid
        // and form an isolated 2x2 block of corner patches
        assert_eq!(tags.face(center).descriptor, None);
        for &child in &faces[9..] {
            let ft = tags.face(child);
            assert_eq!(ft.descriptor, Some(nt(PatchType::Corner, 0)));
            assert_eq!(ft.boundary_count, 3);
            assert!(!ft.is_critical);
        }

        // Edge neighbors become single-head boundary transitions
        let t0 = TransitionPattern::Pattern0;
        assert_eq!(counts[desc(PatchType::Boundary, t0, 2)], 4);
        assert_eq!(counts[nt(PatchType::Corner, 0)], 4 + 4);
        assert_eq!(counts.total(), 12);

        let bottom = tags.face(faces[1]);
        assert_eq!(bottom.transition, t0);
        assert_eq!(bottom.rotation.rotation, 0);
        assert_eq!(bottom.rotation.boundary_rotation, 2);
    }

    #[test]
    fn test_opposite_heads_make_pattern4() {
        let mut mesh = Mesh::quad_grid(3, 3).unwrap();
        let faces = mesh.face_ids();
        mesh.tag_face(faces[3]).unwrap();
        mesh.tag_face(faces[5]).unwrap();
        let (faces, tags, counts) = classify(&mut mesh);

        let center = tags.face(faces[4]);
        assert_eq!(center.transition, TransitionPattern::Pattern4);
        assert_eq!(center.rotation.rotation, 1);
        assert_eq!(
            center.descriptor,
            Some(desc(PatchType::Regular, TransitionPattern::Pattern4, 0))
        );

        let t0 = TransitionPattern::Pattern0;
        assert_eq!(counts[desc(PatchType::Corner, t0, 1)], 2);
        assert_eq!(counts[desc(PatchType::Corner, t0, 2)], 2);
        assert_eq!(tags.face(faces[0]).descriptor, Some(desc(PatchType::Corner, t0, 1)));
        assert_eq!(tags.face(faces[2]).descriptor, Some(desc(PatchType::Corner, t0, 2)));
        assert_eq!(counts[nt(PatchType::Boundary, 0)], 2);
        assert_eq!(counts.total(), 7);
    }

    #[test]
    fn test_adjacent_heads_make_pattern1() {
        let mut mesh = Mesh::quad_grid(3, 3).unwrap();
        let faces = mesh.face_ids();
        mesh.tag_face(faces[1]).unwrap();
        mesh.tag_face(faces[3]).unwrap();
        let (faces, tags, _) = classify(&mut mesh);

        let center = tags.face(faces[4]);
        assert_eq!(center.transition, TransitionPattern::Pattern1);
        assert_eq!(center.rotation.rotation, 0);
    }

    #[test]
    fn test_three_heads_make_pattern2() {
        let mut mesh = Mesh::quad_grid(5, 5).unwrap();
        let faces = mesh.face_ids();
        for i in [6, 7, 8, 11, 13] {
            mesh.tag_face(faces[i]).unwrap();
        }
        let (faces, tags, _) = classify(&mut mesh);

        let center = tags.face(faces[12]);
        assert_eq!(center.transition, TransitionPattern::Pattern2);
        assert_eq!(center.rotation.rotation, 2);
        assert_eq!(
            center.descriptor,
            Some(desc(PatchType::Regular, TransitionPattern::Pattern2, 0))
        );
    }

    #[test]
    fn test_surrounded_face_makes_pattern3() {
        let mut mesh = Mesh::quad_grid(5, 5).unwrap();
        let faces = mesh.face_ids();
        for i in [6, 7, 8, 11, 13, 16, 17, 18] {
            mesh.tag_face(faces[i]).unwrap();
        }
        let (faces, tags, counts) = classify(&mut mesh);

        let center = tags.face(faces[12]);
        assert_eq!(center.transition, TransitionPattern::Pattern3);
        assert_eq!(center.rotation.rotation, 0);
        assert_eq!(
            center.descriptor,
            Some(desc(PatchType::Regular, TransitionPattern::Pattern3, 0))
        );
        assert_eq!(counts[desc(PatchType::Regular, TransitionPattern::Pattern3, 0)], 1);
    }

    #[test]
    fn test_child_touching_unresolved_face_is_critical() {
        let mut mesh = Mesh::quad_grid(3, 3).unwrap();
        let center = mesh.face_ids()[4];
        mesh.tag_face(center).unwrap();
        let children = mesh.refine_face(center).unwrap();

        // Only the first child's outer corner is resolved, so its edge
        // midpoints still touch coarse faces without a resolved vertex
        let faces = mesh.face_ids();
        let mut tags = TagStore::seeded(&mesh, &faces);
        tags.vertex_mut(mesh.face_vertex(children[0], 0)).unwrap().was_tagged = true;
        classify_faces(&mesh, &faces, &mut tags).unwrap();

        assert!(tags.face(children[0]).is_critical);
        assert!(tags.face(children[0]).descriptor.is_some());
        // Coarse faces have no parent and are never critical
        assert!(!tags.face(faces[0]).is_critical);
    }

    #[test]
    fn test_extraordinary_transition_is_unsupported() {
        let mut mesh = Mesh::cube().unwrap();
        let faces = mesh.face_ids();
        mesh.tag_face(faces[0]).unwrap();

        let mut tags = TagStore::seeded(&mesh, &faces);
        propagate_tags(&mut mesh, &faces, &mut tags).unwrap();
        let err = classify_faces(&mesh, &faces, &mut tags).unwrap_err();
        assert!(matches!(err, FapError::Unsupported(_)));
    }

    #[test]
    fn test_tagged_vertex_defers_face() {
        let mut mesh = Mesh::quad_grid(3, 3).unwrap();
        let v = mesh.vertex_ids()[5];
        mesh.tag_vertex(v).unwrap();
        let (faces, tags, counts) = classify(&mut mesh);

        // Vertex (1, 1) touches faces (0,0), (1,0), (0,1), (1,1)
        for i in [0, 1, 3, 4] {
            assert_eq!(tags.face(faces[i]).descriptor, None);
            assert_eq!(tags.face(faces[i]).kind, FacePatchKind::End);
        }
        assert_eq!(counts.total(), 5);
    }
}
