// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the survey-launcher project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Main entry point for the survey launcher web server

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use survey_launcher::config::{self, Config};
use survey_launcher::web::{build_rocket, figment_from_config};

/// Launch surveys on a survey runner with signed and encrypted tokens
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Web server port (default: 8000)
    #[arg(short = 'p')]
    port: Option<u16>,

    /// Web server address (default: 0.0.0.0)
    #[arg(short = 'a')]
    address: Option<String>,

    /// Survey runner base URL
    #[arg(long)]
    survey_runner_url: Option<String>,

    /// Path to configuration file (YAML format)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to a configuration to validate and exit
    #[arg(long)]
    validate_config: Option<PathBuf>,

    /// Output the configuration schema as JSON and exit
    #[arg(long)]
    show_config_schema: bool,

    /// Enable verbose logging (debug level)
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Disable all logging output
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

#[rocket::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.quiet {
        log::LevelFilter::Off
    } else if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if args.show_config_schema {
        return config::output_config_schema();
    }

    if let Some(validate_path) = args.validate_config {
        if !validate_path.exists() {
            return Err(anyhow::anyhow!(
                "Configuration file does not exist: {}",
                validate_path.display()
            ));
        }

        Config::from_file(&validate_path)
            .map_err(|err| anyhow::anyhow!("Configuration validation failed: {}", err))?;
        println!("Configuration file is valid: {}", validate_path.display());
        return Ok(());
    }

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("config.yaml"));
    let mut config = Config::from_file(&config_path)?;
    config.apply_env();
    config.apply_args(args.port, args.address.clone(), args.survey_runner_url.clone());

    info!(
        "Listening on {}:{}, launching into {}",
        config.launcher.address, config.launcher.port, config.services.survey_runner_url
    );

    let config = Arc::new(config);
    let rocket = build_rocket(figment_from_config(&config), config.clone())
        .context("Failed to build web server")?;
    rocket
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Web server failed: {}", e))?;

    Ok(())
}
