//! Topological refinement, one face at a time.
//!
//! Refining an n-sided face produces n quads: child `i` is
//! `[child(v_i), mid(e_i), centroid, mid(e_{i-1})]`, so the children keep the
//! parent's winding. Child vertices are shared with already refined
//! neighbors through the parent's `child` links. Positions are plain
//! centroids and midpoints; no smoothing rules are applied here.

use fap_core::error::{FapError, Result};
use tracing::trace;

use super::mesh::Mesh;
use super::types::*;

impl Mesh {
    /// Face-vertex of `face`, generated on first request.
    pub fn subdivide_face(&mut self, face: FaceId) -> VertexId {
        if let Some(child) = self.faces[face].child_vertex {
            return child;
        }

        let f = &self.faces[face];
        let level = f.level + 1;
        let sum = f
            .halfedges
            .iter()
            .map(|&he| self.vertices[self.halfedges[he].origin].position)
            .fold(crate::Point3::ZERO, |acc, p| acc + p);
        let centroid = sum / f.num_vertices() as f64;

        let child = self.insert_vertex(centroid, Some(VertexParent::Face(face)), level);
        self.faces[face].child_vertex = Some(child);
        child
    }

    /// Edge-vertex of `he` (and its twin), generated on first request.
    pub fn subdivide_edge(&mut self, he: HalfEdgeId) -> VertexId {
        let h = self.halfedges[he];
        if let Some(child) = h.child {
            return child;
        }

        let a = self.vertices[h.origin].position;
        let b = self.vertices[self.halfedge_target(he)].position;
        let level = self.faces[h.face].level + 1;

        let child = self.insert_vertex((a + b) * 0.5, Some(VertexParent::Edge(he)), level);
        self.halfedges[he].child = Some(child);
        if let Some(twin) = h.twin {
            self.halfedges[twin].child = Some(child);
        }
        child
    }

    /// Vertex-vertex of `v`, generated on first request.
    pub fn subdivide_vertex(&mut self, v: VertexId) -> VertexId {
        let vertex = &self.vertices[v];
        if let Some(child) = vertex.child {
            return child;
        }

        let (position, level) = (vertex.position, vertex.level + 1);
        let child = self.insert_vertex(position, Some(VertexParent::Vertex(v)), level);
        self.vertices[v].child = Some(child);
        child
    }

    /// Create the child faces of `face`. Refining twice returns the existing children.
    pub fn refine_face(&mut self, face: FaceId) -> Result<Vec<FaceId>> {
        let f = self
            .faces
            .get(face)
            .ok_or_else(|| FapError::NotFound("Face not found".into()))?;
        if !f.children.is_empty() {
            return Ok(f.children.clone());
        }
        if f.level == u8::MAX {
            return Err(FapError::InvalidOperation(format!(
                "Face {:?} is at the deepest representable level",
                face
            )));
        }

        let halfedges = f.halfedges.clone();
        let parent_fvar = f.fvar.clone();
        let level = f.level + 1;
        let ptex_base = f.ptex_index;
        // Children of coarse non-quads are ptex roots of their own
        let per_child_ptex = f.is_coarse() && halfedges.len() != 4;
        let n = halfedges.len();

        let center = self.subdivide_face(face);

        let mut corners = Vec::with_capacity(n);
        let mut mids = Vec::with_capacity(n);
        for &he in &halfedges {
            let origin = self.halfedges[he].origin;
            corners.push(self.subdivide_vertex(origin));
            mids.push(self.subdivide_edge(he));
        }

        let mut children = Vec::with_capacity(n);
        for i in 0..n {
            let prev = (n + i - 1) % n;
            let verts = [corners[i], mids[i], center, mids[prev]];
            let fvar = child_face_varying(&parent_fvar, n, self.face_varying_width(), i);
            let ptex_index = if per_child_ptex { ptex_base + i } else { ptex_base };
            children.push(self.insert_face(&verts, Some(face), level, ptex_index, fvar)?);
        }

        trace!("Refined face {:?} into {} children", face, n);
        self.faces[face].children = children.clone();
        Ok(children)
    }
}

/// Bilinear face-varying values for child `i` of an n-sided parent.
fn child_face_varying(parent: &[f32], n: usize, width: usize, i: usize) -> Vec<f32> {
    if width == 0 {
        return Vec::new();
    }

    let corner = |k: usize| &parent[k * width..(k + 1) * width];
    let next = (i + 1) % n;
    let prev = (n + i - 1) % n;

    let mut out = Vec::with_capacity(4 * width);
    out.extend_from_slice(corner(i));
    out.extend((0..width).map(|c| 0.5 * (corner(i)[c] + corner(next)[c])));
    out.extend((0..width).map(|c| (0..n).map(|k| corner(k)[c]).sum::<f32>() / n as f32));
    out.extend((0..width).map(|c| 0.5 * (corner(prev)[c] + corner(i)[c])));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use fap_core::traits::Validate;

    #[test]
    fn test_refine_quad_creates_four_children() {
        let mut mesh = Mesh::quad_grid(1, 1).unwrap();
        let face = mesh.coarse_faces().next().unwrap();

        let children = mesh.refine_face(face).unwrap();
        assert_eq!(children.len(), 4);
        // 4 corners + 4 children of corners + 4 midpoints + centroid
        assert_eq!(mesh.vertices.len(), 13);
        assert_eq!(mesh.faces.len(), 5);

        for (i, &child) in children.iter().enumerate() {
            let f = &mesh.faces[child];
            assert_eq!(f.level, 1);
            assert_eq!(f.parent, Some(face));
            assert_eq!(f.num_vertices(), 4);
            // Child i holds the child of parent vertex i
            let parent_vertex = mesh.halfedges[mesh.faces[face].halfedges[i]].origin;
            let first = mesh.halfedges[f.halfedges[0]].origin;
            assert_eq!(mesh.vertices[parent_vertex].child, Some(first));
        }

        let center = mesh.faces[face].child_vertex.unwrap();
        assert_relative_eq!(mesh.vertices[center].position.x, 0.5);
        assert_relative_eq!(mesh.vertices[center].position.y, 0.5);

        mesh.validate().unwrap();
    }

    #[test]
    fn test_refine_is_idempotent() {
        let mut mesh = Mesh::quad_grid(1, 1).unwrap();
        let face = mesh.coarse_faces().next().unwrap();
        let first = mesh.refine_face(face).unwrap();
        let second = mesh.refine_face(face).unwrap();
        assert_eq!(first, second);
        assert_eq!(mesh.faces.len(), 5);
    }

    #[test]
    fn test_refined_neighbors_share_children() {
        let mut mesh = Mesh::quad_grid(2, 1).unwrap();
        let faces: Vec<_> = mesh.coarse_faces().collect();
        mesh.refine_face(faces[0]).unwrap();
        let before = mesh.vertices.len();
        mesh.refine_face(faces[1]).unwrap();
        // The shared edge contributes one midpoint and two vertex children
        // that already exist: 6 corners + 7 midpoints + 2 centroids
        assert_eq!(mesh.vertices.len() - before, 2 + 3 + 1);

        // Children across the shared edge are twins
        let twins = mesh
            .halfedges
            .values()
            .filter(|he| he.twin.is_some() && mesh.faces[he.face].level == 1)
            .count();
        assert_eq!(twins, 2 * (4 + 4 + 2));
        mesh.validate().unwrap();
    }

    #[test]
    fn test_refine_non_quad_gives_per_child_ptex() {
        let mut mesh = Mesh::new();
        let v: Vec<_> = [(0.0, 0.0), (1.0, 0.0), (0.5, 1.0)]
            .iter()
            .map(|&(x, y)| mesh.add_vertex(crate::Point3::new(x, y, 0.0)))
            .collect();
        let tri = mesh.make_face(&v).unwrap();
        assert_eq!(mesh.faces[tri].ptex_index, 0);

        let children = mesh.refine_face(tri).unwrap();
        assert_eq!(children.len(), 3);
        for (i, &child) in children.iter().enumerate() {
            assert_eq!(mesh.faces[child].ptex_index, i);
            assert_eq!(mesh.faces[child].num_vertices(), 4);
        }
    }

    #[test]
    fn test_child_face_varying_is_bilinear() {
        let mut mesh = Mesh::with_face_varying_width(1);
        let v: Vec<_> = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
            .iter()
            .map(|&(x, y)| mesh.add_vertex(crate::Point3::new(x, y, 0.0)))
            .collect();
        let face = mesh.make_face(&v).unwrap();
        mesh.set_face_varying(face, &[0.0, 1.0, 2.0, 3.0]).unwrap();

        let children = mesh.refine_face(face).unwrap();
        assert_eq!(mesh.faces[children[0]].fvar, vec![0.0, 0.5, 1.5, 1.5]);
        assert_eq!(mesh.faces[children[2]].fvar, vec![2.0, 2.5, 1.5, 1.5]);
    }
}
