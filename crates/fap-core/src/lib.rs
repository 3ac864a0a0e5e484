pub mod error;
pub mod traits;

pub use error::{FapError, Result};
pub use traits::Validate;
