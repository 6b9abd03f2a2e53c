//! Error types for the Galaxy3D render pass subsystem
//!
//! This module defines the error types used by the render pass cache,
//! the attachment planner, the framebuffer realizer and the backends.

use std::fmt;

/// Result type for Galaxy3D render pass operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D render pass errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (Vulkan call failed while creating a render pass,
    /// image view or framebuffer). Carries the failing call's context.
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (stale registry handle, attachment index out of range, etc.)
    InvalidResource(String),

    /// Invalid attachment combination (e.g. a render window used as MRT)
    InvalidConfiguration(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
