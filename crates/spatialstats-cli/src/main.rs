//! Command-line interface for `spatialstats`, a spatial statistics toolkit.
//!
//! This binary provides a user-friendly CLI to interact with the [`spatialstats_core`]
//! library: computing minimum bounding rectangles of `GeoJSON` features,
//! inspecting datasets, browsing the statistics process registry and
//! converting Rogerson's R result documents.
//!
//! # Architecture
//!
//! The CLI is built using [`clap`] for argument parsing and [`tracing`] for structured logging.
//! It acts as a thin façade that parses arguments, configures logging, and delegates
//! to command handlers.
//!
//! # Available Commands
//!
//! - `min-rect` - Replace each feature's geometry with its minimum bounding rectangle
//! - `info` - Display dataset information and schema
//! - `processes` - List the registered statistics processes
//! - `describe` - Show the inputs and outputs of one process
//! - `rogerson-xml` - Encode or decode a Rogerson's R result document

mod display;

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use tracing::{Level, debug, info};
use tracing_log::LogTracer;
use tracing_subscriber::FmtSubscriber;

use spatialstats_core::SpatialStatsError;
use spatialstats_core::geojson::GeoJsonWriterOptions;
use spatialstats_core::operations::{self, MinimumRectangleOptions};
use spatialstats_core::processes::{get_processes, require_process};
use spatialstats_core::rogerson::{self, RogersonRResult};

#[derive(Parser)]
#[command(
    name = "spatialstats",
    version,
    about = "Spatial statistics feature transformations in Rust",
    long_about = "spatialstats computes per-feature geometry transformations, describes the\n\
                  available statistics processes and converts their result documents."
)]
/// Command-line arguments and options for the `spatialstats` CLI.
///
/// This struct defines the top-level CLI interface, including global flags for
/// logging verbosity and the subcommand to execute.
struct Cli {
    /// Enable verbose (INFO level) logging output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug (DEBUG level) logging output with detailed diagnostics.
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the `spatialstats` CLI.
#[derive(Subcommand)]
enum Commands {
    /// Replaces each feature's geometry with its minimum bounding rectangle.
    ///
    /// Reads a `GeoJSON` dataset and writes a `GeoJSON` dataset with the same
    /// features, ids and properties, each geometry rewritten.
    MinRect {
        /// Path to the input `GeoJSON` dataset.
        #[arg(short, long, value_name = "DATASET")]
        input: PathBuf,

        /// Path for the output `GeoJSON` dataset.
        #[arg(short, long, value_name = "DATASET")]
        output: PathBuf,

        /// Enclose all parts of a multi-part geometry in a single rectangle.
        #[arg(long)]
        single_part: bool,

        /// Only write features with these ids (comma separated).
        #[arg(long, value_name = "ID", value_delimiter = ',')]
        ids: Option<Vec<String>>,

        /// Indent the output.
        #[arg(long)]
        pretty: bool,

        /// Write newline-delimited features instead of a `FeatureCollection`.
        #[arg(long, conflicts_with = "pretty")]
        seq: bool,
    },

    /// Displays information about a `GeoJSON` dataset.
    Info {
        /// Path to the input `GeoJSON` dataset.
        #[arg(value_name = "DATASET")]
        input: PathBuf,
    },

    /// Lists all registered statistics processes.
    Processes,

    /// Shows the inputs and outputs of a process.
    Describe {
        /// Process name, bare or qualified (e.g. `statistics:DelaunayTriangulation`).
        #[arg(value_name = "PROCESS")]
        name: String,
    },

    /// Encodes or decodes a global Rogerson's R result document.
    RogersonXml {
        #[command(subcommand)]
        action: RogersonAction,
    },
}

/// Rogerson's R document actions.
#[derive(Subcommand)]
enum RogersonAction {
    /// Writes a result document to standard output.
    Encode {
        /// Feature type the statistic was computed over.
        #[arg(long)]
        type_name: String,
        /// Weight attribute.
        #[arg(long)]
        property_name: String,
        /// Observed R index.
        #[arg(long, allow_hyphen_values = true)]
        observed: f64,
        /// Expected R index.
        #[arg(long, allow_hyphen_values = true)]
        expected: f64,
        /// Variance of R.
        #[arg(long)]
        variance: f64,
        /// Standard score.
        #[arg(long, allow_hyphen_values = true)]
        z_score: f64,
        /// Probability.
        #[arg(long)]
        p_value: f64,
    },

    /// Reads a result document and prints its fields.
    Decode {
        /// Path to the XML document.
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
}

/// Entry point for the `spatialstats` command-line interface.
///
/// This function parses command-line arguments, configures the logging system based on
/// verbosity flags, and dispatches to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if command execution fails or if the logging system cannot be initialized.
fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity flags
    let log_level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    // Bridge logs from the `log` crate to the `tracing` ecosystem.
    LogTracer::init()?;

    // Standard output is reserved for command output.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::MinRect {
            input,
            output,
            single_part,
            ids,
            pretty,
            seq,
        } => {
            let options = MinimumRectangleOptions {
                single_part,
                ids,
                writer: GeoJsonWriterOptions::new()
                    .with_pretty_print(pretty)
                    .with_feature_collection(!seq),
            };
            handle_min_rect(&input, &output, &options)?;
        },
        Commands::Info { input } => {
            info!("Displaying info for {}", input.display());
            handle_info(&input)?;
        },
        Commands::Processes => {
            handle_processes();
        },
        Commands::Describe { name } => {
            handle_describe(&name)?;
        },
        Commands::RogersonXml { action } => match action {
            RogersonAction::Encode {
                type_name,
                property_name,
                observed,
                expected,
                variance,
                z_score,
                p_value,
            } => {
                let result = RogersonRResult {
                    type_name,
                    property_name,
                    observed_index: observed,
                    expected_index: expected,
                    variance,
                    z_score,
                    p_value,
                };
                print!("{}", handle_rogerson_encode(&result)?);
            },
            RogersonAction::Decode { input } => {
                handle_rogerson_decode(&input)?;
            },
        },
    }

    Ok(())
}

/// Converts a library error into a report carrying its user message and,
/// when available, a recovery suggestion.
fn report(err: SpatialStatsError) -> anyhow::Error {
    match err.recovery_suggestion() {
        Some(suggestion) => anyhow!("{}\n\n{suggestion}", err.user_message()),
        None => anyhow!(err.user_message()),
    }
}

fn handle_min_rect(input: &Path, output: &Path, options: &MinimumRectangleOptions) -> Result<()> {
    info!("Minimum rectangle command:");
    info!("Input: {}", input.display());
    info!("Output: {}", output.display());
    debug!("Single part: {}", options.single_part);
    debug!("Ids: {:?}", options.ids);

    let written = operations::minimum_rectangle(input, output, options).map_err(report)?;
    println!("Wrote {written} feature(s) to {}", output.display());
    Ok(())
}

fn handle_info(input: &Path) -> Result<()> {
    let info = operations::dataset_info(input).map_err(report)?;
    display::display_dataset_info(&info);
    Ok(())
}

fn handle_processes() {
    display::display_processes(&get_processes());
}

fn handle_describe(name: &str) -> Result<()> {
    let process = require_process(name).map_err(report)?;
    debug!("Describing {}", process.qualified_name());
    display::display_process(&process);
    Ok(())
}

fn handle_rogerson_encode(result: &RogersonRResult) -> Result<String> {
    let mut xml = rogerson::encode(result).map_err(report)?;
    xml.push('\n');
    Ok(xml)
}

fn handle_rogerson_decode(input: &Path) -> Result<()> {
    let result = rogerson::read_file(input).map_err(report)?;
    display::display_rogerson(&result);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_describe_known_process() {
        assert!(handle_describe("statistics:GlobalRogersonsR").is_ok());
    }

    #[test]
    fn test_handle_describe_unknown_process() {
        let result = handle_describe("Kriging");
        assert!(result.is_err());
        let message = result.unwrap_err().to_string();
        assert!(message.starts_with("Process 'Kriging' not found."));
        assert!(message.contains("  - FeatureToMinimumRectangle"));
        assert!(message.contains("spatialstats processes"));
    }

    #[test]
    fn test_handle_rogerson_encode() -> Result<()> {
        let result = RogersonRResult {
            type_name: "stations".to_string(),
            property_name: "rainfall".to_string(),
            observed_index: 0.5,
            expected_index: 0.25,
            variance: 0.01,
            z_score: -1.5,
            p_value: 0.13,
        };
        let xml = handle_rogerson_encode(&result)?;
        assert!(xml.ends_with("</GlobalRogersonsR>\n"));
        assert_eq!(rogerson::decode(&xml).map_err(report)?, result);
        Ok(())
    }

    #[test]
    fn test_handle_rogerson_decode_missing_file() {
        let result = handle_rogerson_decode(Path::new("does-not-exist.xml"));
        let message = result.unwrap_err().to_string();
        assert!(message.starts_with("File not found: does-not-exist.xml"));
        assert!(message.contains("Check that the file path is correct"));
    }

    #[test]
    fn test_handle_info_missing_file() {
        let result = handle_info(Path::new("does-not-exist.geojson"));
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("File not found: does-not-exist.geojson")
        );
    }

    #[test]
    fn test_cli_parses_min_rect_ids() {
        let cli = Cli::try_parse_from([
            "spatialstats",
            "min-rect",
            "-i",
            "in.geojson",
            "-o",
            "out.geojson",
            "--ids",
            "a,b",
            "--single-part",
        ])
        .unwrap();
        let Commands::MinRect {
            ids, single_part, ..
        } = cli.command
        else {
            panic!("expected min-rect")
        };
        assert_eq!(ids, Some(vec!["a".to_string(), "b".to_string()]));
        assert!(single_part);
    }

    #[test]
    fn test_cli_rejects_pretty_with_seq() {
        let result = Cli::try_parse_from([
            "spatialstats",
            "min-rect",
            "-i",
            "in.geojson",
            "-o",
            "out.geojson",
            "--pretty",
            "--seq",
        ]);
        assert!(result.is_err());
    }
}
