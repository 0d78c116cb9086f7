//! Validate demo files and directories of demos.
//!
//! Each document is validated independently; the command exits non-zero if
//! any document is invalid, enabling use in CI pipelines.

use std::io::{IsTerminal, stdout};
use std::path::PathBuf;
use std::process;

use clap::{Args, ValueEnum};
use color_eyre::eyre::{Context, Result};
use color_print::cprintln;

use demolint::{
    BatchReport, Settings, batch, settings,
    snippet::Source,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Annotated, human readable output.
    #[default]
    Text,

    /// A single JSON document with per-demo results and totals.
    Json,
}

#[derive(Args, Clone, Debug)]
pub struct Config {
    /// Demo files or directories to validate. Defaults to the current directory.
    #[arg()]
    pub paths: Vec<PathBuf>,

    /// Glob matched against file names inside directories (e.g. `*.txt`).
    #[arg(long)]
    pub pattern: Option<String>,

    /// Descend into subdirectories.
    #[arg(short, long)]
    pub recursive: bool,

    /// Warn about `WAIT` actions longer than this many seconds.
    #[arg(long)]
    pub max_wait: Option<f64>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t)]
    pub format: Format,

    /// Only print documents that have errors.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Config {
    /// Apply command line overrides on top of the loaded settings.
    fn resolve(&self, mut settings: Settings) -> Settings {
        if let Some(pattern) = &self.pattern {
            settings.pattern = pattern.clone();
        }
        if self.recursive {
            settings.recursive = true;
        }
        if let Some(max_wait) = self.max_wait {
            settings.max_wait_seconds = max_wait;
        }
        settings
    }
}

pub fn main(config: Config) -> Result<()> {
    let settings = config.resolve(settings::load().context("load settings")?);
    let paths = if config.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        config.paths.clone()
    };

    let report = batch::validate_paths(&paths, &settings).context("validate demos")?;

    match config.format {
        Format::Json => {
            let json = serde_json::to_string_pretty(&report).context("serialize report")?;
            println!("{json}");
        }
        Format::Text => print_text(&report, config.quiet),
    }

    if report.is_valid() {
        Ok(())
    } else {
        process::exit(1);
    }
}

fn print_text(report: &BatchReport, quiet: bool) {
    if report.total() == 0 {
        println!("No demo files found.");
        return;
    }

    let styled = stdout().is_terminal();
    for (id, document) in report.documents() {
        let result = &document.report;
        if quiet && result.is_valid {
            continue;
        }

        if result.is_valid {
            cprintln!("<green>✓</green> {id}");
        } else {
            cprintln!("<red>✗</red> {id}");
        }

        if result.errors.is_empty() && result.warnings.is_empty() {
            continue;
        }

        let origin = document.path.display().to_string();
        match &document.source {
            Some(source) => {
                let snippet = Source::from(source.as_str()).annotate(&origin, result, styled);
                println!("{snippet}");
            }
            None => {
                for diagnostic in result.diagnostics() {
                    println!("  {}: {diagnostic}", diagnostic.severity);
                }
            }
        }
        println!();
    }

    let summary = format!(
        "{} {}: {} passed, {} failed",
        report.total(),
        if report.total() == 1 { "demo" } else { "demos" },
        report.passed(),
        report.failed()
    );
    if report.is_valid() {
        cprintln!("<green>✓</green> {}", summary);
    } else {
        cprintln!("<red>✗</red> {}", summary);
    }
}
