pub mod halfedge;
pub mod traversal;

pub use halfedge::*;
pub use traversal::{MeshTraversal, VertexRemap};

pub type Point3 = glam::DVec3;
