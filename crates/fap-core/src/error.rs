use thiserror::Error;

#[derive(Debug, Error)]
pub enum FapError {
    #[error("Topology error: {0}")]
    Topology(String),

    #[error("Mesh has no faces")]
    EmptyMesh,

    #[error("Missing vertex remap entry: {0}")]
    MissingRemap(String),

    #[error("Vertex {vertex} has valence {valence}, exceeding the supported maximum of {max}")]
    ValenceExceeded {
        vertex: String,
        valence: usize,
        max: usize,
    },

    #[error("Unsupported patch configuration: {0}")]
    Unsupported(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Patch layout error: {0}")]
    Layout(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, FapError>;
