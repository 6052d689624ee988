use tracing::debug;

use crate::error::{FlexError, Result};

/// Default sanity ceiling: `i32::MAX` bytes.
pub const DEFAULT_SANITY_CEILING: usize = i32::MAX as usize;

/// Bounds applied to byte spans crossing the record/buffer boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Largest byte span a (de)serializer will touch. Default: `i32::MAX`.
    pub sanity_ceiling: usize,
}

impl Limits {
    /// Limits with an explicit ceiling.
    pub const fn with_ceiling(sanity_ceiling: usize) -> Self {
        Self { sanity_ceiling }
    }

    /// Fail with `AboveCeiling` if `bytes` exceeds the ceiling.
    pub fn check(&self, bytes: usize) -> Result<()> {
        if bytes > self.sanity_ceiling {
            debug!(bytes, ceiling = self.sanity_ceiling, "size above sanity ceiling");
            return Err(FlexError::AboveCeiling {
                size: bytes,
                ceiling: self.sanity_ceiling,
            });
        }
        Ok(())
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            sanity_ceiling: DEFAULT_SANITY_CEILING,
        }
    }
}
