//! Demolint checks GUI-automation demos before agents replay them.

use color_eyre::{Result, Section};
use tracing::{instrument, level_filters::LevelFilter};

mod cmd;

use clap::{Parser, Subcommand};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Demolint checks GUI-automation demos.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate demo files or directories of demos.
    Validate(cmd::validate::Config),

    /// Print a demo as parsed, in JSON.
    Parse(cmd::parse::Config),

    /// Display the action grammar reference.
    Grammar(cmd::grammar::Config),

    /// Display the effective settings.
    Settings(cmd::settings::Config),
}

#[instrument]
fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    // Validation output goes to stdout; logs go to stderr and are quiet by
    // default so the output stays machine readable.
    //
    // Examples:
    // - `DEMOLINT_LOG=debug` to log per-document parse and validation details
    // - `DEMOLINT_LOG=info` to log batch summaries
    tracing_subscriber::registry()
        .with(ErrorLayer::default())
        .with(
            fmt::layer()
                .with_level(true)
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .pretty()
                .with_writer(std::io::stderr),
        )
        .with(
            EnvFilter::builder()
                .with_env_var("DEMOLINT_LOG")
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .init();

    match cli.command {
        Commands::Validate(config) => cmd::validate::main(config),
        Commands::Parse(config) => cmd::parse::main(config),
        Commands::Grammar(config) => cmd::grammar::main(config),
        Commands::Settings(config) => cmd::settings::main(config),
    }
    .suggestion("Run `demolint grammar` for the demo format and action reference.")
}
