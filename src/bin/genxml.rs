//! genxml CLI
//!
//! Validates, formats and exports genxml schema files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use genxml::{
    lint_document, parse, save_with, serialize_with, Checksum, GenxmlConfig, LintWarning,
    ParseError,
};
use serde::Serialize;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "genxml")]
#[command(about = "Validate, format and export genxml schema files")]
#[command(version)]
struct Cli {
    /// Configuration file layered over genxml.toml and GENXML__* variables
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse files (or directories of *.xml) and report every problem
    Validate {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Emit a JSON report instead of text
        #[arg(long)]
        json: bool,
    },

    /// Rewrite a file in canonical form
    Fmt {
        path: PathBuf,
        /// Write here instead of in place
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Only check; print a diff and exit 1 if the file is not canonical
        #[arg(long)]
        check: bool,
        /// Write even if nodes were dropped by parse errors
        #[arg(long)]
        force: bool,
    },

    /// Dump the parsed document model as JSON
    Export {
        path: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config {
        /// Write it to this file instead
        #[arg(long)]
        write: Option<String>,
    },
}

#[derive(Serialize)]
struct FileReport {
    path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    fatal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    checksum: Option<Checksum>,
    structures: usize,
    enumerates: usize,
    errors: Vec<ParseError>,
    warnings: Vec<LintWarning>,
}

impl FileReport {
    fn failed(&self) -> bool {
        self.fatal.is_some() || !self.errors.is_empty()
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = GenxmlConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Validate { paths, json } => {
            let reports: Vec<FileReport> = collect_files(&paths)?
                .into_iter()
                .map(|path| validate_file(path, &config))
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                for report in &reports {
                    print_report(report);
                }
            }

            let failed = reports.iter().filter(|r| r.failed()).count();
            if !json {
                println!();
                println!("{} file(s) checked, {} with errors", reports.len(), failed);
            }
            if failed > 0 && config.validation.fail_on_errors {
                std::process::exit(1);
            }
            Ok(())
        }

        Commands::Fmt {
            path,
            output,
            check,
            force,
        } => {
            let original = fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let outcome = parse(&original)?;
            if !outcome.is_clean() {
                for error in &outcome.errors {
                    eprintln!("  ❌ {}", error);
                }
                if !force {
                    bail!(
                        "{} has {} error(s); formatting would drop nodes (use --force)",
                        path.display(),
                        outcome.errors.len()
                    );
                }
            }

            let options = config.write_options();
            if check {
                if Checksum::is_canonical(&original, &outcome.document, &options) {
                    println!("✅ {} is canonical", path.display());
                    return Ok(());
                }
                let canonical = serialize_with(&outcome.document, &options);
                let label = path.display().to_string();
                let diff = TextDiff::from_lines(&original, &canonical);
                print!(
                    "{}",
                    diff.unified_diff().header(&label, &format!("{} (canonical)", label))
                );
                std::process::exit(1);
            }

            let target = output.unwrap_or_else(|| path.clone());
            save_with(&outcome.document, &target, &options)?;
            println!("✅ Formatted {} -> {}", path.display(), target.display());
            Ok(())
        }

        Commands::Export { path, output } => {
            let outcome = genxml::load(&path)?;
            for error in &outcome.errors {
                eprintln!("  ⚠️  {}", error);
            }
            let json = serde_json::to_string_pretty(&outcome.document)?;
            match output {
                Some(output) => {
                    fs::write(&output, &json)
                        .with_context(|| format!("writing {}", output.display()))?;
                    println!("✅ Exported to {}", output.display());
                }
                None => println!("{}", json),
            }
            Ok(())
        }

        Commands::Config { write } => {
            match write {
                Some(path) => {
                    config.save(&path).with_context(|| format!("writing {}", path))?;
                    println!("✅ Configuration written to {}", path);
                }
                None => print!("{}", config.to_toml()?),
            }
            Ok(())
        }
    }
}

/// Expand directories into their `*.xml` files, sorted by name
fn collect_files(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.with_context(|| format!("walking {}", path.display()))?;
                if entry.file_type().is_file() && is_xml(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn is_xml(path: &Path) -> bool {
    path.extension().map(|ext| ext == "xml").unwrap_or(false)
}

fn validate_file(path: PathBuf, config: &GenxmlConfig) -> FileReport {
    match genxml::load(&path) {
        Ok(outcome) => {
            let warnings = if config.validation.lint_duplicates {
                lint_document(&outcome.document).warnings
            } else {
                Vec::new()
            };
            FileReport {
                checksum: Some(Checksum::of_document(&outcome.document)),
                fatal: None,
                structures: outcome.document.structures.len(),
                enumerates: outcome.document.enumerates.len(),
                errors: outcome.errors,
                warnings,
                path,
            }
        }
        Err(e) => FileReport {
            path,
            fatal: Some(e.to_string()),
            checksum: None,
            structures: 0,
            enumerates: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
        },
    }
}

fn print_report(report: &FileReport) {
    if let Some(fatal) = &report.fatal {
        println!("❌ {} - {}", report.path.display(), fatal);
        return;
    }

    let status = if report.errors.is_empty() { "✅" } else { "❌" };
    println!(
        "{} {} - {} struct(s), {} enum(s)",
        status,
        report.path.display(),
        report.structures,
        report.enumerates
    );
    for error in &report.errors {
        println!("   └─ {}", error);
    }
    for warning in &report.warnings {
        println!("   ⚠️  [{}] {} at {}", warning.code, warning.message, warning.path);
    }
}
