use std::fmt;
use std::io;

use flexprims_layout::{ErrorKind, FlexError};

// Exit code constants aligned with rsfulmen/DDR-0002 semantics.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn flex_error(context: &str, err: FlexError) -> CliError {
    let code = match err.kind() {
        ErrorKind::TooBig => DATA_INVALID,
        ErrorKind::InvalidArgument => USAGE,
        ErrorKind::OutOfMemory => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flex_errors_map_by_kind() {
        let err = flex_error("pack", FlexError::NegativeCount(-1));
        assert_eq!(err.code, DATA_INVALID);
        assert_eq!(err.to_string(), "pack: negative element count -1");

        assert_eq!(flex_error("x", FlexError::SlotOccupied).code, USAGE);
        assert_eq!(
            flex_error("x", FlexError::OutOfMemory { bytes: 1 }).code,
            INTERNAL
        );
    }

    #[test]
    fn io_errors_map_by_kind() {
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert_eq!(io_error("read", denied).code, PERMISSION_DENIED);
        let missing = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert_eq!(io_error("read", missing).code, FAILURE);
    }
}
