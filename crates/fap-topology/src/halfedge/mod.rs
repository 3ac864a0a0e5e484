mod iter;
pub mod mesh;
mod primitives;
mod refine;
pub mod types;
mod validate;

pub use iter::{
    fan_start, fan_surrounding_vertices, incident_edges, surrounding_vertices, IncidentEdges,
    SurroundingVertices,
};
pub use mesh::Mesh;
pub use types::*;
