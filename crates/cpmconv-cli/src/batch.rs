//! Directory conversion.
//!
//! Every file is converted independently on a rayon pool. Outcomes are
//! collected and counted after the pool joins, so one file failing never
//! affects another.

use anyhow::{bail, Context, Result};
use cpmconv_core::{ConversionReport, Converter, PROJECT_EXTENSION};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, trace};
use walkdir::WalkDir;

/// Options for a batch run
#[derive(Debug, Clone, Default)]
pub(crate) struct BatchOptions {
    /// Descend into subdirectories
    pub(crate) recursive: bool,
    /// Worker threads (0 = one per CPU)
    pub(crate) jobs: usize,
}

/// Totals for a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct BatchSummary {
    pub(crate) total: usize,
    pub(crate) success: usize,
    pub(crate) failed: usize,
    pub(crate) failed_files: Vec<PathBuf>,
}

/// Collect `.cpmmodel` files under `directory`, sorted by path
pub(crate) fn collect_models(directory: &Path, recursive: bool) -> Vec<PathBuf> {
    let max_depth = if recursive { usize::MAX } else { 1 };

    let mut files: Vec<PathBuf> = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| {
            let keep = Converter::has_model_extension(path);
            if !keep {
                trace!("Skipping {}", path.display());
            }
            keep
        })
        .collect();

    files.sort();
    files
}

/// Output path for `input`, mirroring its position below `input_root`
pub(crate) fn output_path_for(input: &Path, input_root: &Path, output_root: &Path) -> PathBuf {
    let relative = input
        .strip_prefix(input_root)
        .unwrap_or_else(|_| Path::new(input.file_name().unwrap_or_default()));
    output_root.join(relative).with_extension(PROJECT_EXTENSION)
}

/// Convert every `.cpmmodel` file in `input_dir`.
///
/// Archives go to `output_dir`, or next to their sources when it is `None`.
pub(crate) fn batch_convert(
    converter: &Converter,
    input_dir: &Path,
    output_dir: Option<&Path>,
    options: &BatchOptions,
) -> Result<BatchSummary> {
    if !input_dir.exists() {
        bail!("Directory does not exist: {}", input_dir.display());
    }
    if !input_dir.is_dir() {
        bail!("Path is not a directory: {}", input_dir.display());
    }

    let output_dir = output_dir.unwrap_or(input_dir);
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let files = collect_models(input_dir, options.recursive);
    let mut summary = BatchSummary {
        total: files.len(),
        ..BatchSummary::default()
    };

    if files.is_empty() {
        println!("No .cpmmodel files found in {}", input_dir.display());
        return Ok(summary);
    }

    println!("Found {} .cpmmodel file(s) to convert", files.len());

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.jobs)
        .build()
        .context("Failed to start worker pool")?;

    let outcomes: Vec<(PathBuf, bool)> = pool.install(|| {
        files
            .par_iter()
            .map(|input| {
                let output = output_path_for(input, input_dir, output_dir);
                (input.clone(), convert_one(converter, input, &output))
            })
            .collect()
    });

    for (input, ok) in outcomes {
        if ok {
            summary.success += 1;
        } else {
            summary.failed += 1;
            summary.failed_files.push(input);
        }
    }

    info!(
        "Batch complete: {} total, {} succeeded, {} failed",
        summary.total, summary.success, summary.failed
    );

    Ok(summary)
}

fn convert_one(converter: &Converter, input: &Path, output: &Path) -> bool {
    debug!("Processing {}", input.display());

    if let Some(parent) = output.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            error!("Failed to create directory {}: {}", parent.display(), e);
            return false;
        }
    }

    match converter.convert(input, Some(output)) {
        Ok(report) => {
            print_report(&report);
            true
        }
        Err(e) => {
            error!("Error processing {}: {}", input.display(), e);
            false
        }
    }
}

/// Print the outcome of a successful conversion
pub(crate) fn print_report(report: &ConversionReport) {
    println!("{}", format_report(report));
}

fn format_report(report: &ConversionReport) -> String {
    format!(
        "Converted {} -> {} ({} texture(s) extracted, {} written, model {})",
        report.input.display(),
        report.output.display(),
        report.textures_found,
        report.textures_written,
        if report.model_recovered {
            "recovered"
        } else {
            "default"
        }
    )
}
