// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the survey-launcher project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration utilities
//!
//! This module provides utility functions for working with configuration
//! settings, including validation and schema management.

use anyhow::{Context, Result};
use log::debug;
use url::Url;

use super::Config;

/// Output the embedded JSON schema to the console.
///
/// This function is called when the `--show-config-schema` flag is provided
/// on the command line.
///
/// # Example
///
/// ```bash
/// ./survey_launcher --show-config-schema > config_schema.json
/// ```
pub fn output_config_schema() -> Result<()> {
    let schema_str = include_str!("../../resources/config.schema.json");

    let schema: serde_json::Value =
        serde_json::from_str(schema_str).context("Failed to parse JSON schema")?;

    let formatted_schema =
        serde_json::to_string_pretty(&schema).context("Failed to format JSON schema")?;

    println!("{}", formatted_schema);

    Ok(())
}

/// Check if a string is a valid IP address
///
/// Validates that a string represents a valid IPv4 or IPv6 address,
/// or is one of the special values like "localhost" or "0.0.0.0".
pub fn is_valid_ip_address(addr: &str) -> bool {
    if addr.parse::<std::net::IpAddr>().is_ok() {
        return true;
    }

    matches!(addr, "localhost" | "::" | "::0" | "0.0.0.0")
}

/// Validates the configuration against additional rules that aren't covered by the JSON schema.
///
/// Every configured service location must be an absolute http(s) URL and the
/// bind address must be an IP address.
pub fn validate_specific_rules(config: &Config) -> Result<()> {
    if !is_valid_ip_address(&config.launcher.address) {
        anyhow::bail!(
            "Invalid launcher address '{}': expected an IP address",
            config.launcher.address
        );
    }

    let services = &config.services;
    check_http_url("services.survey_runner_url", &services.survey_runner_url)?;
    check_http_url(
        "launcher.account_service_url",
        &config.launcher.account_service_url,
    )?;

    let optional = [
        (
            "services.survey_runner_schema_url",
            &services.survey_runner_schema_url,
        ),
        ("services.survey_register_url", &services.survey_register_url),
        ("services.schema_validator_url", &services.schema_validator_url),
    ];
    for (name, value) in optional {
        if let Some(value) = value {
            check_http_url(name, value)?;
        }
    }

    if services.http_timeout_secs == 0 {
        anyhow::bail!("services.http_timeout_secs must be greater than zero");
    }

    debug!("Configuration passed specific validation rules");
    Ok(())
}

fn check_http_url(name: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).with_context(|| format!("{} is not a valid URL: {}", name, value))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => anyhow::bail!("{} must use http or https, got '{}'", name, scheme),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_ip_address() {
        assert!(is_valid_ip_address("127.0.0.1"));
        assert!(is_valid_ip_address("::1"));
        assert!(is_valid_ip_address("localhost"));
        assert!(!is_valid_ip_address("not-an-address"));
    }

    #[test]
    fn test_default_config_passes_rules() {
        assert!(validate_specific_rules(&Config::default()).is_ok());
    }

    #[test]
    fn test_rejects_non_http_register() {
        let mut config = Config::default();
        config.services.survey_register_url = Some("ftp://register".to_string());
        let err = validate_specific_rules(&config).unwrap_err();
        assert!(err.to_string().contains("survey_register_url"));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let mut config = Config::default();
        config.services.http_timeout_secs = 0;
        assert!(validate_specific_rules(&config).is_err());
    }
}
