use fap_core::error::{FapError, Result};
use fap_core::traits::Validate;

use super::mesh::Mesh;

impl Validate for Mesh {
    fn validate(&self) -> Result<()> {
        // 1. Validate twin symmetry
        for (he_id, he) in &self.halfedges {
            if let Some(twin_id) = he.twin {
                let twin = self.halfedges.get(twin_id).ok_or_else(|| {
                    FapError::Topology(format!(
                        "HalfEdge {:?} has twin {:?} that does not exist",
                        he_id, twin_id
                    ))
                })?;

                if twin.twin != Some(he_id) {
                    return Err(FapError::Topology(format!(
                        "Twin symmetry violated: {:?}.twin = {:?}, but {:?}.twin = {:?}",
                        he_id, twin_id, twin_id, twin.twin
                    )));
                }

                // Twin runs the other way
                if twin.origin != self.halfedge_target(he_id) {
                    return Err(FapError::Topology(format!(
                        "HalfEdge {:?} and its twin {:?} do not share endpoints",
                        he_id, twin_id
                    )));
                }

                if twin.child != he.child {
                    return Err(FapError::Topology(format!(
                        "HalfEdge {:?} and its twin {:?} disagree on the edge child",
                        he_id, twin_id
                    )));
                }
            }
        }

        // 2. Validate next/prev chain forms a closed loop for each face
        for (face_id, face) in &self.faces {
            let start = *face.halfedges.first().ok_or_else(|| {
                FapError::Topology(format!("Face {:?} has no half-edges", face_id))
            })?;

            let mut current = start;
            let mut count = 0;

            loop {
                let he = self.halfedges.get(current).ok_or_else(|| {
                    FapError::Topology(format!(
                        "HalfEdge {:?} in face {:?} loop does not exist",
                        current, face_id
                    ))
                })?;

                if he.face != face_id {
                    return Err(FapError::Topology(format!(
                        "HalfEdge {:?} in face {:?} loop has wrong face assignment: {:?}",
                        current, face_id, he.face
                    )));
                }

                if face.halfedges.get(count) != Some(&current) {
                    return Err(FapError::Topology(format!(
                        "Face {:?} half-edge list disagrees with its next chain at {}",
                        face_id, count
                    )));
                }

                let next_he = self.halfedges.get(he.next).ok_or_else(|| {
                    FapError::Topology(format!(
                        "HalfEdge {:?}.next = {:?} does not exist",
                        current, he.next
                    ))
                })?;
                if next_he.prev != current {
                    return Err(FapError::Topology(format!(
                        "next/prev mismatch: {:?}.next = {:?}, but {:?}.prev = {:?}",
                        current, he.next, he.next, next_he.prev
                    )));
                }

                count += 1;
                if count > face.num_vertices() {
                    return Err(FapError::Topology(format!(
                        "Face {:?} loop does not close (infinite chain detected)",
                        face_id
                    )));
                }

                current = he.next;
                if current == start {
                    break;
                }
            }

            if count != face.num_vertices() || count < 3 {
                return Err(FapError::Topology(format!(
                    "Face {:?} loop has {} half-edges, expected {}",
                    face_id,
                    count,
                    face.num_vertices()
                )));
            }
        }

        // 3. Validate outgoing lists
        for (v_id, vertex) in &self.vertices {
            for &he_id in &vertex.outgoing {
                let he = self.halfedges.get(he_id).ok_or_else(|| {
                    FapError::Topology(format!(
                        "Vertex {:?} lists non-existent half-edge {:?}",
                        v_id, he_id
                    ))
                })?;
                if he.origin != v_id {
                    return Err(FapError::Topology(format!(
                        "Vertex {:?} lists half-edge {:?} that starts at {:?}",
                        v_id, he_id, he.origin
                    )));
                }
            }
        }

        let listed: usize = self.vertices.values().map(|v| v.outgoing.len()).sum();
        if listed != self.halfedges.len() {
            return Err(FapError::Topology(format!(
                "{} half-edges exist but {} are listed as outgoing",
                self.halfedges.len(),
                listed
            )));
        }

        Ok(())
    }
}
