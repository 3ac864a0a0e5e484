use fap_core::error::{FapError, Result};
use fap_topology::{FaceId, MeshTraversal};

/// Copy the face-varying values of the four corners of `f` into `out`,
/// starting at corner `rotation` so they follow the patch orientation.
pub fn gather_face_varying<M: MeshTraversal + ?Sized>(
    mesh: &M,
    f: FaceId,
    rotation: u8,
    out: &mut [f32],
) -> Result<()> {
    let width = mesh.face_varying_width();
    if out.len() != 4 * width {
        return Err(FapError::Layout(format!(
            "Face-varying slot holds {} values, expected {}",
            out.len(),
            4 * width
        )));
    }

    for (j, chunk) in out.chunks_exact_mut(width.max(1)).enumerate() {
        let corner = (j + rotation as usize) % 4;
        chunk.copy_from_slice(mesh.face_varying(f, corner));
    }
    Ok(())
}
