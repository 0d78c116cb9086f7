//! Display the effective settings.

use clap::Args;
use color_eyre::eyre::{Context, Result};

use demolint::settings;

#[derive(Args, Clone, Debug)]
pub struct Config {}

pub fn main(_config: Config) -> Result<()> {
    match settings::user_file() {
        Some(path) => println!("# user settings: {}", path.display()),
        None => println!("# user settings: unavailable on this platform"),
    }
    println!("# project settings: {}", settings::PROJECT_FILE);

    let settings = settings::load().context("load settings")?;
    let yaml = serde_yaml::to_string(&settings).context("serialize settings")?;
    println!("{yaml}");
    Ok(())
}
