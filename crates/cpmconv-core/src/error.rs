//! Error types for the cpmconv-core library.
//!
//! Scanning never fails: malformed JSON or PNG regions are skipped. The
//! variants here cover precondition violations on the input path, an empty
//! source buffer, and I/O or archive failures while packaging.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cpmconv operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all cpmconv operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Input file does not exist
    #[error("input file '{path}' not found")]
    InputNotFound {
        /// Path that was requested
        path: PathBuf,
    },

    /// Input file does not carry the expected extension
    #[error("input file '{path}' must have the .{expected} extension")]
    InvalidExtension {
        /// Path that was requested
        path: PathBuf,
        /// Extension the converter accepts
        expected: &'static str,
    },

    /// Failed to read input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to write output file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        /// Path to the file that failed to write
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Nothing could be extracted from the source buffer
    #[error("could not read any data from '{name}'")]
    ExtractionFailed {
        /// Source name handed to the extractor
        name: String,
    },

    /// Failed to serialize a JSON entry
    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed while building the ZIP archive
    #[error("failed to write archive: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl Error {
    /// Creates a new input-not-found error
    pub fn input_not_found(path: impl Into<PathBuf>) -> Self {
        Self::InputNotFound { path: path.into() }
    }

    /// Creates a new invalid extension error
    pub fn invalid_extension(path: impl Into<PathBuf>, expected: &'static str) -> Self {
        Self::InvalidExtension {
            path: path.into(),
            expected,
        }
    }

    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new file write error
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a new extraction failure
    pub fn extraction_failed(name: impl Into<String>) -> Self {
        Self::ExtractionFailed { name: name.into() }
    }

    /// Returns true if the error is a precondition violation on the input,
    /// raised before any extraction began
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InputNotFound { .. } | Self::InvalidExtension { .. }
        )
    }

    /// Returns true if the error happened while writing the output archive
    pub fn is_packaging_error(&self) -> bool {
        matches!(
            self,
            Self::FileWrite { .. } | Self::Json(_) | Self::Archive(_)
        )
    }
}
