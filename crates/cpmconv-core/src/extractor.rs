//! Best-effort recovery of model data from a `.cpmmodel` buffer.
//!
//! The [`Extractor`] combines the scanners in [`crate::scanner`] into an
//! [`ExtractionResult`]: one model document (recovered or fallback), the
//! embedded PNG textures in offset order, and metadata derived from the
//! source name. Malformed regions are skipped, never reported as errors.

use crate::model::ModelData;
use crate::scanner::{find_json_object, find_png_images};
use std::path::Path;
use tracing::debug;

/// A recovered image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    /// Synthesized entry name, `texture_<index>.png`
    pub name: String,
    /// Raw PNG bytes, signature through `IEND` checksum
    pub data: Vec<u8>,
    /// Offset of the PNG signature in the source buffer
    pub offset: usize,
}

impl Texture {
    /// Builds the synthesized name for the texture at `index`
    pub fn name_for(index: usize) -> String {
        format!("texture_{index}.png")
    }
}

/// Facts about the source file, derived from its name and size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMetadata {
    /// Final path component of the source name
    pub filename: String,
    /// Filename without its last extension
    pub model_name: String,
    /// Length of the source buffer in bytes
    pub file_size: usize,
}

impl SourceMetadata {
    /// Derives metadata from a source name (a bare filename or a path)
    pub fn from_source(source_name: &str, file_size: usize) -> Self {
        let path = Path::new(source_name);
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source_name.to_string());
        let model_name = Path::new(&filename)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            filename,
            model_name,
            file_size,
        }
    }
}

/// Everything recovered from one source buffer
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    /// Model description
    pub model: ModelData,
    /// Recovered images in ascending offset order
    pub textures: Vec<Texture>,
    /// Source metadata
    pub metadata: SourceMetadata,
}

/// Configuration for the extractor
#[derive(Debug, Clone, Default)]
pub struct ExtractorConfig {
    /// Emit a diagnostic event for every recovered item
    pub debug: bool,
}

impl ExtractorConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether diagnostic events are emitted
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Recovers model data from opaque `.cpmmodel` bytes
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractorConfig,
}

impl Extractor {
    /// Creates a new extractor with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new extractor with custom configuration
    pub fn with_config(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Extract the model document and textures from `data`.
    ///
    /// `source_name` only feeds [`SourceMetadata`]; it is never scanned.
    /// Returns `None` when there is nothing to extract from (an empty
    /// buffer), which callers report as a failed extraction.
    pub fn extract(&self, data: &[u8], source_name: &str) -> Option<ExtractionResult> {
        if data.is_empty() {
            debug!("{} is empty, nothing to extract", source_name);
            return None;
        }

        if self.config.debug {
            debug!("File size: {} bytes", data.len());
        }

        let model = match find_json_object(data) {
            Some(found) => {
                if self.config.debug {
                    debug!(
                        "Found JSON at offset {}, size: {}",
                        found.range.start,
                        found.range.len()
                    );
                }
                ModelData::recovered(found.range.start, found.document)
            }
            None => ModelData::fallback(),
        };

        if self.config.debug && !model.is_recovered() {
            debug!("No JSON found, using fallback model structure");
        }

        let textures: Vec<Texture> = find_png_images(data)
            .into_iter()
            .enumerate()
            .map(|(index, image)| {
                let texture = Texture {
                    name: Texture::name_for(index),
                    data: image.slice(data).to_vec(),
                    offset: image.range.start,
                };
                if self.config.debug {
                    debug!(
                        "Found texture {} at offset {}, size: {} bytes",
                        index,
                        texture.offset,
                        texture.data.len()
                    );
                }
                texture
            })
            .collect();

        let metadata = SourceMetadata::from_source(source_name, data.len());

        if self.config.debug {
            debug!(
                "Extraction complete: model keys={}, textures={}",
                model.document().len(),
                textures.len()
            );
        }

        Some(ExtractionResult {
            model,
            textures,
            metadata,
        })
    }
}
