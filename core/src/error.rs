#![deny(missing_docs)]

//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the crate.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// Registry validation failures are fatal to a compile call: no partial
/// artifact is produced once one of them is returned.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Two endpoints were registered under the same name.
    #[display("Duplicate endpoint name: {name}")]
    DuplicateEndpointName {
        /// The offending endpoint name.
        name: String,
    },

    /// Two endpoints share the exact declared path and method.
    #[display("Duplicate path and method: {method} {path}")]
    DuplicatePathAndMethod {
        /// The raw declared path.
        path: String,
        /// The HTTP method.
        method: String,
    },

    /// A literal query fragment is missing its `=` separator.
    #[display("Malformed query fragment '{fragment}' in path '{path}'")]
    MalformedQueryFragment {
        /// The raw declared path.
        path: String,
        /// The fragment lacking `=`.
        fragment: String,
    },

    /// The reflection capability could not describe a payload type.
    #[display("Reflection Error: {_0}")]
    Reflection(String),

    /// An artifact could not be encoded.
    #[display("Serialization Error: {_0}")]
    Serialization(String),

    /// Wrapper for standard IO errors.
    #[from]
    #[display("IO Error: {_0}")]
    Io(std::io::Error),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
