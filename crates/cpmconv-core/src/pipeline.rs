//! Single-file conversion: read, extract, package.

use crate::error::{Error, Result};
use crate::extractor::{ExtractionResult, Extractor, ExtractorConfig};
use crate::packager::{Packager, PackagerConfig};
use crate::{MODEL_EXTENSION, PROJECT_EXTENSION};
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Configuration shared by every stage of a conversion
#[derive(Debug, Clone, Default)]
pub struct ConverterConfig {
    /// Emit diagnostic events from the extractor and packager
    pub debug: bool,
    /// Keep a partially written archive when packaging fails
    pub keep_partial_output: bool,
}

impl ConverterConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether diagnostic events are emitted
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets whether a partial archive survives a packaging failure
    pub fn keep_partial_output(mut self, keep: bool) -> Self {
        self.keep_partial_output = keep;
        self
    }
}

/// Outcome of a successful conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    /// Source `.cpmmodel` path
    pub input: PathBuf,
    /// Written `.cpmproject` path
    pub output: PathBuf,
    /// Size of the source file in bytes
    pub source_size: usize,
    /// Whether the model document came from the source
    pub model_recovered: bool,
    /// Images found in the source
    pub textures_found: usize,
    /// Texture entries written to the archive
    pub textures_written: usize,
}

/// Converts `.cpmmodel` files into `.cpmproject` archives
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConverterConfig,
    extractor: Extractor,
    packager: Packager,
}

impl Converter {
    /// Creates a new converter with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new converter with custom configuration
    pub fn with_config(config: ConverterConfig) -> Self {
        let extractor = Extractor::with_config(ExtractorConfig::new().debug(config.debug));
        let packager = Packager::with_config(PackagerConfig::new().debug(config.debug));
        Self {
            config,
            extractor,
            packager,
        }
    }

    /// Returns true if `path` names a `.cpmmodel` file (case-insensitive)
    pub fn has_model_extension(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(MODEL_EXTENSION))
    }

    /// Checks the conversion preconditions on `input`
    pub fn validate_input(input: &Path) -> Result<()> {
        if !input.exists() {
            return Err(Error::input_not_found(input));
        }
        if !Self::has_model_extension(input) {
            return Err(Error::invalid_extension(input, MODEL_EXTENSION));
        }
        Ok(())
    }

    /// Output path used when none is given: the input with its extension
    /// replaced by `.cpmproject`
    pub fn default_output_path(input: &Path) -> PathBuf {
        input.with_extension(PROJECT_EXTENSION)
    }

    /// Run the extractor on an in-memory buffer
    pub fn extract(&self, data: &[u8], source_name: &str) -> Result<ExtractionResult> {
        self.extractor
            .extract(data, source_name)
            .ok_or_else(|| Error::extraction_failed(source_name))
    }

    /// Convert an in-memory buffer, writing the archive into `writer`
    pub fn convert_bytes<W: Write + Seek>(
        &self,
        data: &[u8],
        source_name: &str,
        writer: W,
    ) -> Result<usize> {
        let result = self.extract(data, source_name)?;
        self.packager.package(&result, writer)
    }

    /// Convert the file at `input`.
    ///
    /// Input errors are returned before the file is read. When packaging
    /// fails the partial archive is removed unless
    /// [`ConverterConfig::keep_partial_output`] is set.
    pub fn convert(&self, input: &Path, output: Option<&Path>) -> Result<ConversionReport> {
        Self::validate_input(input)?;

        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| Self::default_output_path(input));

        info!("Converting {} -> {}", input.display(), output.display());

        let data = std::fs::read(input).map_err(|e| Error::file_read(input, e))?;
        let source_name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.display().to_string());

        let result = self.extract(&data, &source_name)?;
        debug!(
            "Extracted {} texture(s) from {}, model recovered: {}",
            result.textures.len(),
            source_name,
            result.model.is_recovered()
        );

        let textures_written = match self.packager.package_to_path(&result, &output) {
            Ok(written) => written,
            Err(e) => {
                if !self.config.keep_partial_output && output.exists() {
                    if let Err(remove) = std::fs::remove_file(&output) {
                        warn!(
                            "Failed to remove partial archive {}: {}",
                            output.display(),
                            remove
                        );
                    }
                }
                return Err(e);
            }
        };

        Ok(ConversionReport {
            input: input.to_path_buf(),
            output,
            source_size: data.len(),
            model_recovered: result.model.is_recovered(),
            textures_found: result.textures.len(),
            textures_written,
        })
    }
}
