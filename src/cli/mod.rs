//! # CLI Module
//!
//! Command-line front end for the hashing library.
//!
//! ## Usage
//! ```bash
//! # Hash images with the default algorithm (dHash)
//! imghash hash photo.jpg other.png
//!
//! # Pick an algorithm and emit JSON
//! imghash hash -a pdq photo.jpg --output json
//!
//! # Distance between two images
//! imghash compare -a phash a.jpg b.jpg
//! imghash compare -a hog a.jpg b.jpg --metric l1
//!
//! # List the available algorithms
//! imghash list
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use image_hashes::core::hash::HashValue;
use image_hashes::core::hasher::{batch, HashAlgorithm, HashAlgorithmKind, HasherConfig};
use image_hashes::core::similarity::Metric;
use image_hashes::error::{ConfigError, HashError, Result};
use std::path::{Path, PathBuf};

/// imghash - perceptual image hashes from the command line
#[derive(Parser, Debug)]
#[command(name = "imghash")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Hash one or more image files
    Hash {
        /// Image files to hash
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Hash algorithm to use
        #[arg(short, long, default_value = "dhash")]
        algorithm: HashAlgorithmKind,

        /// Resize target as WIDTHxHEIGHT
        #[arg(short, long, value_parser = parse_size)]
        size: Option<(u32, u32)>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
    /// Hash two images and print their distance
    Compare {
        first: PathBuf,
        second: PathBuf,

        /// Hash algorithm to use
        #[arg(short, long, default_value = "dhash")]
        algorithm: HashAlgorithmKind,

        /// Distance metric (defaults to the algorithm's own)
        #[arg(short, long)]
        metric: Option<Metric>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
    /// List the available algorithms
    List,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (hash values only)
    Minimal,
}

/// Parses `WIDTHxHEIGHT`, or a single number for a square size.
fn parse_size(s: &str) -> std::result::Result<(u32, u32), String> {
    let parse = |v: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|_| format!("invalid size '{}': expected WIDTHxHEIGHT", s))
    };
    match s.split_once(['x', 'X']) {
        Some((width, height)) => Ok((parse(width)?, parse(height)?)),
        None => {
            let side = parse(s)?;
            Ok((side, side))
        }
    }
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Hash {
            files,
            algorithm,
            size,
            output,
        } => run_hash(&files, algorithm, size, output),
        Commands::Compare {
            first,
            second,
            algorithm,
            metric,
            output,
        } => run_compare(&first, &second, algorithm, metric, output),
        Commands::List => {
            run_list();
            Ok(())
        }
    }
}

fn build_hasher(
    algorithm: HashAlgorithmKind,
    size: Option<(u32, u32)>,
    metric: Option<Metric>,
) -> std::result::Result<Box<dyn HashAlgorithm>, ConfigError> {
    let mut config = HasherConfig::new().algorithm(algorithm);
    if let Some((width, height)) = size {
        config = config.size(width, height);
    }
    if let Some(metric) = metric {
        config = config.metric(metric);
    }
    config.build()
}

fn run_hash(
    files: &[PathBuf],
    algorithm: HashAlgorithmKind,
    size: Option<(u32, u32)>,
    output: OutputFormat,
) -> Result<()> {
    let hasher = build_hasher(algorithm, size, None)?;
    let results = batch::hash_files(hasher.as_ref(), files);

    match output {
        OutputFormat::Pretty => print_pretty_hashes(algorithm, files, &results),
        OutputFormat::Json => print_json_hashes(algorithm, files, &results),
        OutputFormat::Minimal => {
            for result in results.iter().flatten() {
                println!("{}", format_hash(result));
            }
        }
    }
    Ok(())
}

fn run_compare(
    first: &Path,
    second: &Path,
    algorithm: HashAlgorithmKind,
    metric: Option<Metric>,
    output: OutputFormat,
) -> Result<()> {
    let hasher = build_hasher(algorithm, None, metric)?;
    let a = hasher.hash_file(first)?;
    let b = hasher.hash_file(second)?;
    let distance = hasher.compare(&a, &b)?;

    match output {
        OutputFormat::Pretty => {
            let term = Term::stdout();
            term.write_line(&format!(
                "{} {} vs {}",
                style(algorithm).bold().cyan(),
                first.display(),
                second.display()
            ))
            .ok();
            term.write_line(&format!(
                "  {} {}",
                style(format!("{}:", hasher.metric())).dim(),
                style(format!("{:.6}", distance)).yellow()
            ))
            .ok();
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "algorithm": algorithm.to_string(),
                "metric": hasher.metric().to_string(),
                "first": first,
                "second": second,
                "distance": distance,
            });
            print_json(&output);
        }
        OutputFormat::Minimal => println!("{}", distance),
    }
    Ok(())
}

fn run_list() {
    let term = Term::stdout();
    for kind in HashAlgorithmKind::ALL {
        term.write_line(&format!(
            "  {} {}",
            style(format!("{:<16}", kind)).bold(),
            style(kind.description()).dim()
        ))
        .ok();
    }
}

/// Binary hashes print as hex, numeric descriptors in brackets.
fn format_hash(hash: &HashValue) -> String {
    match hash {
        HashValue::Binary(bits) => bits.to_hex(),
        other => other.to_string(),
    }
}

fn print_pretty_hashes(
    algorithm: HashAlgorithmKind,
    files: &[PathBuf],
    results: &[std::result::Result<HashValue, HashError>],
) {
    let term = Term::stdout();
    term.write_line(&format!(
        "{} {}",
        style(algorithm).bold().cyan(),
        style(algorithm.description()).dim()
    ))
    .ok();

    for (path, result) in files.iter().zip(results) {
        let line = match result {
            Ok(hash) => format!("  {} {}", style(path.display()).bold(), format_hash(hash)),
            Err(e) => format!(
                "  {} {} {}",
                style("✗").red().bold(),
                path.display(),
                style(e).red()
            ),
        };
        term.write_line(&line).ok();
    }
}

fn print_json_hashes(
    algorithm: HashAlgorithmKind,
    files: &[PathBuf],
    results: &[std::result::Result<HashValue, HashError>],
) {
    let output = serde_json::json!({
        "algorithm": algorithm.to_string(),
        "results": files.iter().zip(results).map(|(path, result)| match result {
            Ok(hash) => serde_json::json!({ "path": path, "hash": hash }),
            Err(e) => serde_json::json!({ "path": path, "error": e.to_string() }),
        }).collect::<Vec<_>>()
    });
    print_json(&output);
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("failed to serialize output: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_sizes() {
        assert_eq!(parse_size("16x8"), Ok((16, 8)));
        assert_eq!(parse_size("32"), Ok((32, 32)));
        assert!(parse_size("axb").is_err());
    }

    #[test]
    fn parses_algorithm_and_metric() {
        let cli = Cli::try_parse_from(["imghash", "compare", "-a", "hog", "a.png", "b.png", "-m", "l1"])
            .unwrap();
        match cli.command {
            Commands::Compare {
                algorithm, metric, ..
            } => {
                assert_eq!(algorithm, HashAlgorithmKind::Hog);
                assert!(matches!(metric, Some(Metric::L1)));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_algorithm() {
        assert!(Cli::try_parse_from(["imghash", "hash", "-a", "sha256", "a.png"]).is_err());
    }
}
