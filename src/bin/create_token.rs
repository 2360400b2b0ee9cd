// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the survey-launcher project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use survey_launcher::auth::{ClaimSource, LaunchValues, TokenService};
use survey_launcher::config::Config;
use survey_launcher::surveys::SchemaResolver;

/// Create a launch token manually
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Path to configuration file
    #[clap(short = 'c', long = "config", default_value = "config.yaml")]
    config_path: PathBuf,

    /// Name of an available schema, e.g. 1_0005.json
    #[clap(short = 's', long, conflicts_with = "url", required_unless_present = "url")]
    schema: Option<String>,

    /// URL of a schema document to launch instead of a named schema
    #[clap(long)]
    url: Option<String>,

    /// Claim override as NAME=VALUE; repeat for several values
    #[clap(long = "value", value_name = "NAME=VALUE")]
    values: Vec<String>,

    /// Print the survey runner session URL instead of the bare token
    #[clap(long)]
    session_url: bool,

    /// Suppress output messages, only token is printed
    #[clap(short = 'q', long)]
    quiet: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::from_file(&args.config_path)?;
    config.apply_env();
    let config = Arc::new(config);

    let values = parse_values(&args.values)?;
    let resolver = SchemaResolver::new(&config.services)?;

    let schema = match (&args.schema, &args.url) {
        (_, Some(url)) => resolver.resolve_by_url(url).await?,
        (Some(name), None) => {
            let schema = resolver.resolve_by_name(name).await?;
            resolver.with_required_metadata(schema).await?
        }
        (None, None) => return Err(anyhow!("Either --schema or --url is required")),
    };

    let token = TokenService::new(config.clone())
        .issue_for(ClaimSource::Query(&values), &schema)
        .context("Failed to create token")?;

    let output = if args.session_url {
        format!(
            "{}/session?token={}",
            config.services.survey_runner_url.trim_end_matches('/'),
            token
        )
    } else {
        token
    };

    if args.quiet {
        print!("{}", output);
    } else {
        println!("✅ Token created successfully!");
        println!("📋 Schema: {} (eq_id {}, form_type {})", schema.name, schema.eq_id, schema.form_type);
        println!("🎫 Token: {}", output);
    }

    Ok(())
}

fn parse_values(raw: &[String]) -> Result<LaunchValues> {
    raw.iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .ok_or_else(|| anyhow!("Invalid --value '{}': expected NAME=VALUE", pair))
        })
        .collect::<Result<Vec<_>>>()
        .map(|pairs| pairs.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_values_keeps_repeats() {
        let raw = vec![
            "roles=dumper".to_string(),
            "roles=flusher".to_string(),
            "display_address=1 High St, A=B".to_string(),
        ];
        let values = parse_values(&raw).unwrap();
        assert_eq!(values.all("roles"), ["dumper".to_string(), "flusher".to_string()]);
        assert_eq!(values.first("display_address"), Some("1 High St, A=B"));
    }

    #[test]
    fn test_parse_values_rejects_missing_separator() {
        let err = parse_values(&["user_id".to_string()]).unwrap_err();
        assert!(err.to_string().contains("expected NAME=VALUE"));
    }
}
