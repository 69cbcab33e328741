// ============================================================================
// main.rs — pwa-icons CLI entry point
// ============================================================================

use std::process;

use clap::Parser;
use colored::*;
use pwa_icons::{GeneratorConfig, IconOptions};

fn load_config(options: &IconOptions) -> anyhow::Result<GeneratorConfig> {
    let mut config = GeneratorConfig::load_or_default(options.config.as_deref())?;
    options.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn main() {
    let options = IconOptions::parse();

    let config = match load_config(&options) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {:#}", "✗ Error:".red().bold(), e);
            process::exit(1);
        }
    };

    if options.print_config {
        match config.to_toml_string() {
            Ok(toml) => print!("{}", toml),
            Err(e) => {
                eprintln!("{} {:#}", "✗ Error:".red().bold(), e);
                process::exit(1);
            }
        }
        return;
    }

    process::exit(pwa_icons::run(&config, options.verbosity()));
}
