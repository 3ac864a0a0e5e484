//! Parameters for patch table construction.

use fap_core::error::{FapError, Result};
use fap_core::traits::Validate;
use serde::{Deserialize, Serialize};

/// Parameters for patch table construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchTablesOptions {
    /// Deepest refinement level a patch may come from. Ptex coordinates
    /// store the depth in 4 bits, so at most 15. Default: 8
    pub max_level: u8,

    /// Largest vertex valence supported by Gregory patches. Sets the row
    /// width of the valence table; quad offsets are byte-packed, so at
    /// most 255. Default: 16
    pub max_valence: usize,

    /// Whether to sample face-varying data per patch corner. Default: false
    pub require_face_varying: bool,
}

impl Default for PatchTablesOptions {
    fn default() -> Self {
        Self {
            max_level: 8,
            max_valence: 16,
            require_face_varying: false,
        }
    }
}

impl PatchTablesOptions {
    pub const MAX_LEVEL_LIMIT: u8 = 15;
    pub const MAX_VALENCE_LIMIT: usize = 255;

    /// Set the deepest allowed refinement level.
    #[must_use]
    pub const fn with_max_level(mut self, max_level: u8) -> Self {
        self.max_level = max_level;
        self
    }

    /// Set the largest supported valence.
    #[must_use]
    pub const fn with_max_valence(mut self, max_valence: usize) -> Self {
        self.max_valence = max_valence;
        self
    }

    /// Set face-varying sampling.
    #[must_use]
    pub const fn with_face_varying(mut self, require: bool) -> Self {
        self.require_face_varying = require;
        self
    }
}

impl Validate for PatchTablesOptions {
    fn validate(&self) -> Result<()> {
        if self.max_level > Self::MAX_LEVEL_LIMIT {
            return Err(FapError::InvalidOption(format!(
                "max_level {} exceeds {}",
                self.max_level,
                Self::MAX_LEVEL_LIMIT
            )));
        }
        if !(3..=Self::MAX_VALENCE_LIMIT).contains(&self.max_valence) {
            return Err(FapError::InvalidOption(format!(
                "max_valence {} is outside 3..={}",
                self.max_valence,
                Self::MAX_VALENCE_LIMIT
            )));
        }
        Ok(())
    }
}
