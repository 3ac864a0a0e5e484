//! Feature-adaptive patch tables.
//!
//! Turns an adaptively refined quad mesh into GPU-ready patch tables:
//! faces are tagged, classified into full B-spline, transition and
//! Gregory patches, grouped by descriptor, and written out together with
//! ptex coordinates, quad offsets and the vertex valence table.

pub mod classify;
pub mod descriptor;
pub mod emit;
pub mod factory;
pub mod fvar;
pub mod layout;
pub mod one_ring;
pub mod options;
pub mod propagate;
pub mod ptex;
pub mod quad_offsets;
pub mod tables;
pub mod tags;
pub mod valence;

pub use descriptor::{Descriptor, DescriptorMap, PatchArray, PatchType, TransitionPattern};
pub use factory::{build_patch_tables, PatchTablesFactory};
pub use options::PatchTablesOptions;
pub use ptex::PtexCoord;
pub use tables::PatchTables;
pub use tags::{FacePatchKind, FaceTags, PatchRotation, TagStore};
