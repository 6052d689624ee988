use std::fmt;

use crate::shape::Shape;

/// The three failure classes every flexible-record operation reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or already-populated output, or structurally incompatible input.
    InvalidArgument,
    /// Size arithmetic overflow or a bounds violation.
    TooBig,
    /// The allocator could not satisfy the request.
    OutOfMemory,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidArgument => f.write_str("invalid argument"),
            ErrorKind::TooBig => f.write_str("too big"),
            ErrorKind::OutOfMemory => f.write_str("out of memory"),
        }
    }
}

/// Errors that can occur while sizing, copying, or (de)serializing records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlexError {
    /// The output slot of an allocating operation already holds a value.
    #[error("output slot already holds a value")]
    SlotOccupied,

    /// Two raw records do not share a layout.
    #[error("record shape mismatch (expected {expected}, got {actual})")]
    ShapeMismatch { expected: Shape, actual: Shape },

    /// A shape descriptor is internally inconsistent.
    #[error("invalid shape: {0}")]
    InvalidShape(&'static str),

    /// A header field access falls outside the header or overlaps the count field.
    #[error("header field {offset}..{end} out of bounds")]
    FieldOutOfBounds { offset: usize, end: usize },

    /// A raw block ends with a partial element.
    #[error("{extra} trailing bytes do not form a whole element")]
    TrailingBytes { extra: usize },

    /// A requested element count was negative.
    #[error("negative element count {0}")]
    NegativeCount(i128),

    /// A requested element count does not fit the count field.
    #[error("element count {count} exceeds count field maximum {max}")]
    CountOverflow { count: u128, max: usize },

    /// A multiplication or addition of sizes overflowed `usize`.
    #[error("size arithmetic overflow")]
    ArithmeticOverflow,

    /// A byte length exceeded the configured sanity ceiling.
    #[error("{size} bytes exceeds sanity ceiling of {ceiling} bytes")]
    AboveCeiling { size: usize, ceiling: usize },

    /// The source buffer is shorter than the requested elements.
    #[error("source too short ({available} bytes, need {required})")]
    SourceTooShort { required: usize, available: usize },

    /// The destination cannot hold the data being copied into it.
    #[error("destination too small ({capacity} bytes, need {required})")]
    DestinationTooSmall { required: usize, capacity: usize },

    /// A byte length cannot be reported in the caller's length type.
    #[error("length {len} not representable in a {bits}-bit field")]
    LengthUnrepresentable { len: usize, bits: u32 },

    /// The allocator refused the request.
    #[error("failed to allocate {bytes} bytes")]
    OutOfMemory { bytes: usize },
}

impl FlexError {
    /// The failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FlexError::SlotOccupied
            | FlexError::ShapeMismatch { .. }
            | FlexError::InvalidShape(_)
            | FlexError::FieldOutOfBounds { .. }
            | FlexError::TrailingBytes { .. } => ErrorKind::InvalidArgument,
            FlexError::NegativeCount(_)
            | FlexError::CountOverflow { .. }
            | FlexError::ArithmeticOverflow
            | FlexError::AboveCeiling { .. }
            | FlexError::SourceTooShort { .. }
            | FlexError::DestinationTooSmall { .. }
            | FlexError::LengthUnrepresentable { .. } => ErrorKind::TooBig,
            FlexError::OutOfMemory { .. } => ErrorKind::OutOfMemory,
        }
    }

    /// Negative errno equivalent, for callers bridging to C conventions.
    pub fn errno(&self) -> i32 {
        match self.kind() {
            ErrorKind::InvalidArgument => -libc::EINVAL,
            ErrorKind::TooBig => -libc::E2BIG,
            ErrorKind::OutOfMemory => -libc::ENOMEM,
        }
    }
}

pub type Result<T> = std::result::Result<T, FlexError>;
