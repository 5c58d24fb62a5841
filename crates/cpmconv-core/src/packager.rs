//! `.cpmproject` archive assembly.
//!
//! ## Layout
//!
//! ```text
//! project.json         project record
//! model.json           recovered model, or the default project model
//! textures/<name>      one entry per non-empty texture, or textures/.keep
//! animations/.keep     always present, always empty
//! ```
//!
//! Every entry is deflated and stamped with the fixed DOS epoch, so the same
//! [`ExtractionResult`] always produces the same archive bytes.

use crate::error::{Error, Result};
use crate::extractor::ExtractionResult;
use crate::model::default_project_model;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use tracing::debug;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Project format version written to `project.json`
pub const PROJECT_VERSION: &str = "0.6.0";

/// Author recorded in `project.json`
pub const PROJECT_AUTHOR: &str = "CPM Converter";

/// Export version recorded in `project.json`
pub const EXPORT_VERSION: &str = "1.0.0";

/// Name used when the source filename yields no model name
pub const FALLBACK_PROJECT_NAME: &str = "Converted Model";

/// Directory holding texture entries
pub const TEXTURES_DIR: &str = "textures/";

/// Placeholder keeping the texture directory present
pub const TEXTURES_KEEP: &str = "textures/.keep";

/// Placeholder keeping the animation directory present
pub const ANIMATIONS_KEEP: &str = "animations/.keep";

/// Contents of `project.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    /// Project format version
    pub version: String,
    /// Display name of the model
    pub name: String,
    /// Human-readable origin of the project
    pub description: String,
    /// Tool that produced the project
    pub author: String,
    /// Exporter version
    pub export_version: String,
}

impl ProjectInfo {
    /// Builds the project record for an extraction result
    pub fn for_result(result: &ExtractionResult) -> Self {
        let metadata = &result.metadata;
        let name = if metadata.model_name.is_empty() {
            FALLBACK_PROJECT_NAME.to_string()
        } else {
            metadata.model_name.clone()
        };

        Self {
            version: PROJECT_VERSION.to_string(),
            name,
            description: format!("Converted from {}", metadata.filename),
            author: PROJECT_AUTHOR.to_string(),
            export_version: EXPORT_VERSION.to_string(),
        }
    }
}

/// Archive path for a texture name
pub fn texture_entry_path(name: &str) -> String {
    if name.starts_with(TEXTURES_DIR) {
        name.to_string()
    } else {
        format!("{TEXTURES_DIR}{name}")
    }
}

/// Configuration for the packager
#[derive(Debug, Clone, Default)]
pub struct PackagerConfig {
    /// Emit a diagnostic event for every entry written
    pub debug: bool,
}

impl PackagerConfig {
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

/// Writes `.cpmproject` archives
#[derive(Debug, Clone, Default)]
pub struct Packager {
    config: PackagerConfig,
}

impl Packager {
    /// Creates a new packager with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new packager with custom configuration
    pub fn with_config(config: PackagerConfig) -> Self {
        Self { config }
    }

    fn entry_options() -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default())
    }

    /// Write the archive for `result` into `writer`.
    ///
    /// Returns the number of texture entries written.
    pub fn package<W: Write + Seek>(&self, result: &ExtractionResult, writer: W) -> Result<usize> {
        let mut zip = ZipWriter::new(writer);
        let options = Self::entry_options();

        let project = ProjectInfo::for_result(result);
        write_entry(&mut zip, "project.json", &serde_json::to_vec_pretty(&project)?, options)?;
        self.log_entry("project.json");

        let model_json = if result.model.has_parts() {
            serde_json::to_vec_pretty(result.model.document())?
        } else {
            debug!("Model has no parts, writing default project model");
            serde_json::to_vec_pretty(&default_project_model())?
        };
        write_entry(&mut zip, "model.json", &model_json, options)?;
        self.log_entry("model.json");

        let mut written = 0;
        for texture in result.textures.iter().filter(|t| !t.data.is_empty()) {
            let path = texture_entry_path(&texture.name);
            write_entry(&mut zip, &path, &texture.data, options)?;
            self.log_entry(&path);
            written += 1;
        }

        if written == 0 {
            write_entry(&mut zip, TEXTURES_KEEP, &[], options)?;
        }
        write_entry(&mut zip, ANIMATIONS_KEEP, &[], options)?;

        zip.finish()?;

        if self.config.debug {
            debug!("Created project archive with {} textures", written);
        }

        Ok(written)
    }

    /// Write the archive for `result` to a file at `path`.
    ///
    /// The file handle is flushed and closed before returning, on success
    /// and on failure alike. A failed write may leave a partial file behind.
    pub fn package_to_path(&self, result: &ExtractionResult, path: &Path) -> Result<usize> {
        let file = File::create(path).map_err(|e| Error::file_write(path, e))?;
        let mut writer = BufWriter::new(file);

        let written = self.package(result, &mut writer)?;

        writer.flush().map_err(|e| Error::file_write(path, e))?;
        Ok(written)
    }

    fn log_entry(&self, path: &str) {
        if self.config.debug {
            debug!("Added {}", path);
        }
    }
}

fn write_entry<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    path: &str,
    contents: &[u8],
    options: SimpleFileOptions,
) -> Result<()> {
    zip.start_file(path, options)?;
    zip.write_all(contents).map_err(ZipError::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{SourceMetadata, Texture};
    use crate::model::{Document, ModelData};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn result_with(model: ModelData, textures: Vec<Texture>) -> ExtractionResult {
        ExtractionResult {
            model,
            textures,
            metadata: SourceMetadata::from_source("knight.cpmmodel", 10),
        }
    }

    fn texture(name: &str, data: &[u8]) -> Texture {
        Texture {
            name: name.to_string(),
            data: data.to_vec(),
            offset: 0,
        }
    }

    fn build(result: &ExtractionResult) -> (usize, ZipArchive<Cursor<Vec<u8>>>) {
        let mut buffer = Cursor::new(Vec::new());
        let written = Packager::new().package(result, &mut buffer).unwrap();
        let archive = ZipArchive::new(Cursor::new(buffer.into_inner())).unwrap();
        (written, archive)
    }

    fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> Vec<u8> {
        let mut entry = archive.by_name(name).unwrap();
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).unwrap();
        contents
    }

    fn read_json(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> Value {
        serde_json::from_slice(&read_entry(archive, name)).unwrap()
    }

    #[test]
    fn test_project_info() {
        let result = result_with(ModelData::fallback(), vec![]);
        let info = ProjectInfo::for_result(&result);

        assert_eq!(info.name, "knight");
        assert_eq!(info.description, "Converted from knight.cpmmodel");

        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["exportVersion"], json!("1.0.0"));
        assert_eq!(value["version"], json!("0.6.0"));
        assert_eq!(value["author"], json!("CPM Converter"));
    }

    #[test]
    fn test_project_name_fallback() {
        let mut result = result_with(ModelData::fallback(), vec![]);
        result.metadata.model_name.clear();
        assert_eq!(ProjectInfo::for_result(&result).name, "Converted Model");
    }

    #[test]
    fn test_texture_entry_path() {
        assert_eq!(texture_entry_path("texture_0.png"), "textures/texture_0.png");
        assert_eq!(texture_entry_path("textures/skin.png"), "textures/skin.png");
    }

    #[test]
    fn test_default_layout() {
        let (written, mut archive) = build(&result_with(ModelData::fallback(), vec![]));

        assert_eq!(written, 0);
        let names: Vec<_> = archive.file_names().map(str::to_string).collect();
        assert_eq!(names.len(), 4);
        assert!(names.contains(&TEXTURES_KEEP.to_string()));
        assert!(names.contains(&ANIMATIONS_KEEP.to_string()));

        let model = read_json(&mut archive, "model.json");
        assert_eq!(model, Value::Object(default_project_model()));
        assert!(read_entry(&mut archive, ANIMATIONS_KEEP).is_empty());
    }

    #[test]
    fn test_recovered_model_written_verbatim() {
        let document: Document = serde_json::from_str(
            r#"{"version":1,"parts":[{"id":"head","name":"Голова"}],"extra":{"k":[1,2]}}"#,
        )
        .unwrap();
        let result = result_with(ModelData::recovered(0, document.clone()), vec![]);
        let (_, mut archive) = build(&result);

        let raw = read_entry(&mut archive, "model.json");
        assert_eq!(raw, serde_json::to_vec_pretty(&document).unwrap());
        assert!(String::from_utf8(raw).unwrap().contains("Голова"));
    }

    #[test]
    fn test_wide_integers_written_exactly() {
        let source = br#"{"parts":[{"id":"head","seed":123456789012345678901234567890}]}"#;
        let result = crate::extractor::Extractor::new()
            .extract(source, "knight.cpmmodel")
            .unwrap();
        let (_, mut archive) = build(&result);

        let text = String::from_utf8(read_entry(&mut archive, "model.json")).unwrap();
        assert!(text.contains("123456789012345678901234567890"));
    }

    #[test]
    fn test_model_without_parts_replaced() {
        let document: Document = serde_json::from_str(r#"{"version":4,"parts":[]}"#).unwrap();
        let (_, mut archive) = build(&result_with(ModelData::recovered(0, document), vec![]));

        let model = read_json(&mut archive, "model.json");
        assert_eq!(model["version"], json!(11));
    }

    #[test]
    fn test_textures_written_and_empty_skipped() {
        let textures = vec![
            texture("texture_0.png", b"first"),
            texture("texture_1.png", b""),
            texture("textures/texture_2.png", b"third"),
        ];
        let (written, mut archive) = build(&result_with(ModelData::fallback(), textures));

        assert_eq!(written, 2);
        assert_eq!(read_entry(&mut archive, "textures/texture_0.png"), b"first");
        assert_eq!(read_entry(&mut archive, "textures/texture_2.png"), b"third");
        assert!(archive.by_name("textures/texture_1.png").is_err());
        assert!(archive.by_name(TEXTURES_KEEP).is_err());
        assert!(archive.by_name(ANIMATIONS_KEEP).is_ok());
    }

    #[test]
    fn test_only_empty_textures_writes_keep() {
        let textures = vec![texture("texture_0.png", b"")];
        let (written, mut archive) = build(&result_with(ModelData::fallback(), textures));

        assert_eq!(written, 0);
        assert!(archive.by_name(TEXTURES_KEEP).is_ok());
    }

    #[test]
    fn test_output_is_deterministic() {
        let result = result_with(ModelData::fallback(), vec![texture("texture_0.png", b"png")]);

        let mut first = Cursor::new(Vec::new());
        let mut second = Cursor::new(Vec::new());
        Packager::new().package(&result, &mut first).unwrap();
        Packager::new().package(&result, &mut second).unwrap();

        assert_eq!(first.into_inner(), second.into_inner());
    }

    #[test]
    fn test_package_to_unwritable_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("missing").join("out.cpmproject");
        let err = Packager::new()
            .package_to_path(&result_with(ModelData::fallback(), vec![]), &target)
            .unwrap_err();
        assert!(err.is_packaging_error());
    }
}
