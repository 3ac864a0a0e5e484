use fap_core::error::{FapError, Result};
use fap_topology::{fan_surrounding_vertices, FaceId, MeshTraversal};

/// For each corner of a Gregory patch face, the positions of the two
/// adjacent face corners in that corner's counter-clockwise neighbor cycle,
/// packed as `first | second << 8` with `second` following `first` in the
/// cycle.
///
/// The cycle is the fan of faces around the corner that contains `f`, so a
/// singular corner is indexed within its own fan.
pub fn compute_quad_offsets<M: MeshTraversal + ?Sized>(mesh: &M, f: FaceId) -> Result<[u32; 4]> {
    if mesh.face_num_vertices(f) != 4 {
        return Err(FapError::Topology(format!("Face {:?} is not a quad", f)));
    }
    let corners: [_; 4] = std::array::from_fn(|i| mesh.face_vertex(f, i));

    let mut packed = [0u32; 4];
    for (i, &v) in corners.iter().enumerate() {
        let adjacent = [corners[(i + 1) % 4], corners[(i + 3) % 4]];

        let mut offsets = [0u32; 2];
        let mut found = 0;
        for (index, n) in fan_surrounding_vertices(mesh, mesh.face_edge(f, i)).enumerate() {
            if !adjacent.contains(&n) {
                continue;
            }
            if found == 2 || index > u8::MAX as usize {
                return Err(FapError::Topology(format!(
                    "Corner {:?} of face {:?} has an unusable neighbor cycle",
                    v, f
                )));
            }
            offsets[found] = index as u32;
            found += 1;
        }
        if found != 2 {
            return Err(FapError::Topology(format!(
                "Corner {:?} of face {:?} sees {} face corners among its neighbors",
                v, f, found
            )));
        }

        let [mut o0, mut o1] = offsets;
        if o1.wrapping_sub(o0) != 1 {
            std::mem::swap(&mut o0, &mut o1);
        }
        packed[i] = o0 | (o1 << 8);
    }
    Ok(packed)
}

/// Split a packed quad-offset word into its two cycle positions.
pub fn unpack_quad_offset(word: u32) -> (u8, u8) {
    ((word & 0xff) as u8, ((word >> 8) & 0xff) as u8)
}
