//! Engine-level error types.

use thiserror::Error;

/// Top-level error for non-GPU engine concerns.
#[derive(Error, Debug)]
pub enum Error {
    /// Window creation or surface management errors
    #[error("window error: {0}")]
    Window(String),

    /// Vulkan errors surfaced outside the RHI layer
    #[error("vulkan error: {0}")]
    Vulkan(String),

    /// IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invariant violations that are not worth a panic
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias using the engine [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn display_includes_context() {
        let err = Error::Window("surface lost".to_string());
        assert_eq!(err.to_string(), "window error: surface lost");
    }
}
