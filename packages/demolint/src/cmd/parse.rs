//! Print a demo as parsed.

use std::fs::read_to_string;
use std::path::PathBuf;

use clap::Args;
use color_eyre::eyre::{Context, Result};

use demolint::Demo;

#[derive(Args, Clone, Debug)]
pub struct Config {
    /// Path to the demo file.
    pub path: PathBuf,

    /// Print compact JSON on one line.
    #[arg(long)]
    pub compact: bool,
}

pub fn main(config: Config) -> Result<()> {
    let content = read_to_string(&config.path)
        .with_context(|| format!("read demo file: {:?}", config.path))?;
    let demo = Demo::parse(content);

    let json = if config.compact {
        serde_json::to_string(&demo)
    } else {
        serde_json::to_string_pretty(&demo)
    }
    .context("serialize demo")?;

    println!("{json}");
    Ok(())
}
