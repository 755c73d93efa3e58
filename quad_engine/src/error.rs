//! Error types for the Quad engine
//!
//! Only device-fatal conditions travel through `Error`. Soft failures
//! (missing uniform, shader compile failure, image decode failure) are
//! logged and degrade to a sentinel state instead.

use std::fmt;

/// Result type for Quad engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Quad engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (OpenGL, mock device, etc.)
    BackendError(String),

    /// Device could not allocate a new object
    OutOfMemory,

    /// Invalid resource (buffer, vertex array, shader, texture)
    InvalidResource(String),

    /// Initialization failed (context, renderer)
    InitializationFailed(String),

    /// A file-backed resource (shader source, image) could not be read
    ResourceNotFound(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of device memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::ResourceNotFound(msg) => write!(f, "Resource not found: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
