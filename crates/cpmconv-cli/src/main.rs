//! cpmconv - Convert Custom Player Models `.cpmmodel` files into
//! `.cpmproject` archives
//!
//! This tool recovers the embedded model description and textures from
//! `.cpmmodel` containers and repackages them in the project layout the
//! editor can open.

mod batch;

use anyhow::{bail, Context, Result};
use batch::{batch_convert, print_report, BatchOptions};
use clap::{Args, Parser, Subcommand};
use cpmconv_core::{analyze, Analysis, Converter, ConverterConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, Level};
use tracing_subscriber::EnvFilter;

/// Brace offsets listed by `analyze`
const SHOWN_BRACES: usize = 5;

/// Strings listed by `analyze`
const SHOWN_STRINGS: usize = 10;

/// Characters shown per string by `analyze`
const STRING_PREVIEW_CHARS: usize = 50;

/// Convert Custom Player Models .cpmmodel files into .cpmproject archives
#[derive(Parser, Debug)]
#[command(name = "cpmconv")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Report every recovered item and archive entry
    #[arg(long, global = true, env = "CPMCONV_DEBUG")]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a single .cpmmodel file
    Convert(ConvertArgs),
    /// Convert every .cpmmodel file in a directory
    Batch(BatchArgs),
    /// Print a diagnostic dump of a .cpmmodel file
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Path to the .cpmmodel file
    input: PathBuf,

    /// Output .cpmproject path (default: next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Keep a partially written archive if packaging fails
    #[arg(long)]
    keep_partial: bool,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Directory containing .cpmmodel files
    directory: PathBuf,

    /// Output directory (default: the input directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Descend into subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Worker threads (0 = one per CPU)
    #[arg(short, long, default_value = "0")]
    jobs: usize,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Path to the .cpmmodel file
    input: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match (cli.verbose, cli.debug) {
        (0, false) => Level::WARN,
        (1, false) => Level::INFO,
        (0..=2, _) => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .init();

    match &cli.command {
        Command::Convert(args) => run_convert(&cli, args),
        Command::Batch(args) => run_batch(&cli, args),
        Command::Analyze(args) => run_analyze(args),
    }
}

fn run_convert(cli: &Cli, args: &ConvertArgs) -> Result<()> {
    // Precondition failures are reported as errors, not as a failed conversion
    Converter::validate_input(&args.input)?;

    let config = ConverterConfig::new()
        .debug(cli.debug)
        .keep_partial_output(args.keep_partial);
    let converter = Converter::with_config(config);

    if !convert_file(&converter, &args.input, args.output.as_deref()) {
        bail!("Conversion failed: {}", args.input.display());
    }
    Ok(())
}

/// Convert one file, reporting the outcome instead of returning an error
fn convert_file(converter: &Converter, input: &Path, output: Option<&Path>) -> bool {
    match converter.convert(input, output) {
        Ok(report) => {
            print_report(&report);
            true
        }
        Err(e) => {
            error!("Conversion of {} failed: {}", input.display(), e);
            false
        }
    }
}

fn run_batch(cli: &Cli, args: &BatchArgs) -> Result<()> {
    let converter = Converter::with_config(ConverterConfig::new().debug(cli.debug));
    let options = BatchOptions {
        recursive: args.recursive,
        jobs: args.jobs,
    };

    let summary = batch_convert(
        &converter,
        &args.directory,
        args.output.as_deref(),
        &options,
    )?;

    println!(
        "Total: {}, succeeded: {}, failed: {}",
        summary.total, summary.success, summary.failed
    );
    for file in &summary.failed_files {
        println!("  failed: {}", file.display());
    }

    Ok(())
}

fn run_analyze(args: &AnalyzeArgs) -> Result<()> {
    if !args.input.is_file() {
        bail!("Input file does not exist: {}", args.input.display());
    }

    let data = fs::read(&args.input)
        .with_context(|| format!("Failed to read input file: {}", args.input.display()))?;

    println!("Analyzing {}", args.input.display());
    for line in render_analysis(&analyze(&data)) {
        println!("{}", line);
    }
    Ok(())
}

fn render_analysis(analysis: &Analysis) -> Vec<String> {
    let mut lines = vec![
        format!("Size: {} bytes", analysis.size),
        format!("blake3: {}", analysis.fingerprint),
        String::new(),
        format!("First {} bytes (hex):", analysis.head.len()),
    ];

    lines.extend(
        analysis
            .head_rows()
            .map(|(offset, bytes)| format!("{:04x}: {}", offset, hex::encode(bytes))),
    );

    lines.push(String::new());
    lines.push(format!(
        "Potential JSON blocks: {}",
        analysis.brace_offsets.len()
    ));
    lines.extend(
        analysis
            .brace_offsets
            .iter()
            .take(SHOWN_BRACES)
            .map(|pos| format!("  offset {} (0x{:x})", pos, pos)),
    );

    lines.push(String::new());
    lines.push(format!("PNG images: {}", analysis.png_offsets.len()));
    lines.extend(
        analysis
            .png_offsets
            .iter()
            .enumerate()
            .map(|(i, pos)| format!("  PNG {}: offset {} (0x{:x})", i + 1, pos, pos)),
    );

    lines.push(String::new());
    lines.push(format!("Readable strings: {}", analysis.strings.len()));
    lines.extend(analysis.strings.iter().take(SHOWN_STRINGS).map(|s| {
        let preview: String = s.text.chars().take(STRING_PREVIEW_CHARS).collect();
        format!("  {:04x}: '{}'", s.offset, preview)
    }));

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_convert_file_reports_outcome() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.cpmmodel");
        let empty = dir.path().join("empty.cpmmodel");
        fs::write(&good, br#"{"parts":[{"id":"head"}]}"#).unwrap();
        fs::write(&empty, b"").unwrap();

        let converter = Converter::new();
        assert!(convert_file(&converter, &good, None));
        assert!(!convert_file(&converter, &empty, None));
    }

    #[test]
    fn test_converted_archive_contents() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("knight.cpmmodel");
        fs::write(&input, b"\x00opaque\x00").unwrap();

        assert!(convert_file(&Converter::new(), &input, None));

        let file = fs::File::open(dir.path().join("knight.cpmproject")).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let mut project = String::new();
        archive
            .by_name("project.json")
            .unwrap()
            .read_to_string(&mut project)
            .unwrap();
        assert!(project.contains("\"name\": \"knight\""));
    }

    #[test]
    fn test_render_analysis() {
        let mut data = b"xx{\"a\":1}".to_vec();
        data.extend_from_slice(cpmconv_core::scanner::PNG_SIGNATURE);

        let lines = render_analysis(&analyze(&data));
        assert!(lines.contains(&"0000: 78787b2261223a317d89504e470d0a1a".to_string()));
        assert!(lines.contains(&"  offset 2 (0x2)".to_string()));
        assert!(lines.contains(&"  PNG 1: offset 9 (0x9)".to_string()));
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
