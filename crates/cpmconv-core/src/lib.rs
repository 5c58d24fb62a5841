//! # cpmconv-core
//!
//! A library for converting Custom Player Models `.cpmmodel` files into
//! `.cpmproject` archives.
//!
//! The `.cpmmodel` container is undocumented. Instead of parsing it, this
//! crate locates the structures that matter inside the opaque bytes:
//! - the first complete JSON object (the model description)
//! - every embedded PNG image (the textures)
//!
//! ## Architecture
//!
//! - [`scanner`]: Byte-level search for JSON objects, PNG images and strings
//! - [`extractor`]: Builds an [`ExtractionResult`] from a source buffer
//! - [`packager`]: Writes the `.cpmproject` ZIP layout
//! - [`pipeline`]: File-level conversion wiring the two stages together
//! - [`analysis`]: Diagnostic summary of an unknown file
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use cpmconv_core::{Converter, ConverterConfig};
//! use std::path::Path;
//!
//! let converter = Converter::with_config(ConverterConfig::new().debug(true));
//! let report = converter.convert(Path::new("knight.cpmmodel"), None)?;
//! println!(
//!     "wrote {} with {} texture(s)",
//!     report.output.display(),
//!     report.textures_written
//! );
//! # Ok::<(), cpmconv_core::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod analysis;
pub mod error;
pub mod extractor;
pub mod model;
pub mod packager;
pub mod pipeline;
pub mod scanner;

// Re-export primary types for convenience
pub use analysis::{analyze, Analysis};
pub use error::{Error, Result};
pub use extractor::{ExtractionResult, Extractor, ExtractorConfig, SourceMetadata, Texture};
pub use model::{Document, ModelData};
pub use packager::{Packager, PackagerConfig, ProjectInfo};
pub use pipeline::{ConversionReport, Converter, ConverterConfig};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Extension of source model files
pub const MODEL_EXTENSION: &str = "cpmmodel";

/// Extension of generated project archives
pub const PROJECT_EXTENSION: &str = "cpmproject";
