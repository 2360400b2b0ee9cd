// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the survey-launcher project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration management for the survey launcher
//!
//! This module provides functionality for loading, validating, and applying
//! configuration settings for the launcher. The configuration is backed by a
//! YAML file and validated against a JSON schema for robustness.
//!
//! ## Configuration Structure
//!
//! - `launcher`: Settings for the launcher web server and launch defaults
//! - `services`: Locations of the survey runner, schema register and validator
//! - `keys`: Paths to the PEM files used to sign and encrypt launch tokens
//!
//! ## Override Order
//!
//! 1. Values from the YAML file (or defaults when the file does not exist)
//! 2. Environment variables (`Config::apply_env`)
//! 3. Command line arguments (`Config::apply_args`)
//!
//! ## Usage
//!
//! ```no_run
//! use survey_launcher::config::Config;
//! use std::path::Path;
//!
//! // Load config from file, creates a default if not found
//! let mut config = Config::from_file(Path::new("config.yaml")).unwrap();
//! config.apply_env();
//! config.apply_args(Some(8001), Some("127.0.0.1".to_string()), None);
//!
//! println!("Runner: {}", config.services.survey_runner_url);
//! ```

pub mod keys;
pub mod launcher;
pub mod services;
pub mod utils;

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, error};
use serde::{Deserialize, Serialize};

pub use keys::KeysConfig;
pub use launcher::LauncherConfig;
pub use services::{RegisterApi, ServicesConfig};
pub use utils::{is_valid_ip_address, output_config_schema};

/// Root configuration structure for the survey launcher.
///
/// Constructed once at startup and shared (behind an `Arc`) with every
/// component that needs it. Library code never reads settings from the
/// process environment directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Settings for the launcher web server and the claim defaults it owns.
    #[serde(default)]
    pub launcher: LauncherConfig,

    /// Locations of the external services the launcher talks to.
    #[serde(default)]
    pub services: ServicesConfig,

    /// Key material used to sign and encrypt launch tokens.
    #[serde(default)]
    pub keys: KeysConfig,
}

impl Config {
    /// Helper method to create a sample config file when validation fails
    fn create_sample_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        let sample_path = path.with_extension("sample.yaml");
        debug!("Creating sample configuration file at {:?}", sample_path);

        if let Some(parent) = sample_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).with_context(|| {
                    format!(
                        "Failed to create parent directory for sample config at {:?}",
                        parent
                    )
                })?;
            }
        }

        Self::default()
            .save_to_file(&sample_path)
            .with_context(|| format!("Failed to save sample config to {:?}", sample_path))?;

        error!(
            "Sample configuration file created at {:?}\nPlease edit and rename it",
            sample_path
        );
        Ok(())
    }

    /// Load configuration from a file
    ///
    /// When the file does not exist a default configuration is written to
    /// `path` and returned. Existing files are validated against the embedded
    /// JSON schema before being deserialized; on failure a
    /// `<name>.sample.yaml` file holding the defaults is written next to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid YAML, does
    /// not satisfy the schema, or fails the additional rules in
    /// [`utils::validate_specific_rules`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(
                "Configuration file not found at {:?}, creating default",
                path
            );
            let default_config = Self::default();
            default_config.save_to_file(path)?;
            return Ok(default_config);
        }

        debug!("Loading configuration from {:?}", path);
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file at {:?}", path))?;

        Self::from_yaml_str(&contents).or_else(|err| {
            if let Err(sample_err) = Self::create_sample_config(path) {
                error!("Failed to create sample config: {}", sample_err);
            }
            Err(err.context(format!("Invalid configuration in {}", path.display())))
        })
    }

    /// Parse and validate a configuration from YAML text
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let yaml_value: serde_yml::Value =
            serde_yml::from_str(contents).context("Failed to parse YAML configuration")?;

        let json_value =
            serde_json::to_value(&yaml_value).context("Failed to convert YAML to JSON")?;

        let schema_str = include_str!("../../resources/config.schema.json");
        let schema: serde_json::Value =
            serde_json::from_str(schema_str).context("Failed to parse JSON schema")?;

        let validator = jsonschema::draft202012::options()
            .should_validate_formats(true)
            .build(&schema)?;

        if let Err(error) = validator.validate(&json_value) {
            error!("Configuration validation error before deserialization");
            anyhow::bail!("Configuration validation failed: {}", error);
        }

        debug!("Schema validation passed, deserializing into Config structure");
        let config: Config =
            serde_yml::from_str(contents).context("Failed to deserialize configuration")?;

        utils::validate_specific_rules(&config)?;

        Ok(config)
    }

    /// Save the configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml =
            serde_yml::to_string(self).context("Failed to serialize configuration to YAML")?;

        let mut file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create config file at {:?}", path.as_ref()))?;

        file.write_all(yaml.as_bytes())
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Apply the environment variables understood by earlier launcher
    /// deployments.
    ///
    /// | Variable | Setting |
    /// |---|---|
    /// | `GO_LAUNCH_A_SURVEY_LISTEN_HOST` | `launcher.address` |
    /// | `GO_LAUNCH_A_SURVEY_LISTEN_PORT` | `launcher.port` |
    /// | `ACCOUNT_SERVICE_URL` | `launcher.account_service_url` |
    /// | `SURVEY_RUNNER_URL` | `services.survey_runner_url` |
    /// | `SURVEY_RUNNER_SCHEMA_URL` | `services.survey_runner_schema_url` |
    /// | `SURVEY_REGISTER_URL` | `services.survey_register_url` |
    /// | `SCHEMA_VALIDATOR_URL` | `services.schema_validator_url` |
    /// | `JWT_SIGNING_KEY_PATH` | `keys.signing_key_path` |
    /// | `JWT_ENCRYPTION_KEY_PATH` | `keys.encryption_key_path` |
    pub fn apply_env(&mut self) {
        self.apply_vars(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Empty values clear optional settings, matching how the variables were
    /// used to switch services off.
    pub fn apply_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("GO_LAUNCH_A_SURVEY_LISTEN_HOST") {
            debug!("Overriding listen address from environment: {}", host);
            self.launcher.address = host;
        }
        if let Some(port) = lookup("GO_LAUNCH_A_SURVEY_LISTEN_PORT") {
            match port.parse::<u16>() {
                Ok(port) => self.launcher.port = port,
                Err(_) => error!("Ignoring invalid GO_LAUNCH_A_SURVEY_LISTEN_PORT: {}", port),
            }
        }
        if let Some(url) = lookup("ACCOUNT_SERVICE_URL") {
            self.launcher.account_service_url = url;
        }
        if let Some(url) = lookup("SURVEY_RUNNER_URL") {
            debug!("Overriding survey runner URL from environment: {}", url);
            self.services.survey_runner_url = url;
        }
        if let Some(url) = lookup("SURVEY_RUNNER_SCHEMA_URL") {
            self.services.survey_runner_schema_url = non_empty(url);
        }
        if let Some(url) = lookup("SURVEY_REGISTER_URL") {
            self.services.survey_register_url = non_empty(url);
        }
        if let Some(url) = lookup("SCHEMA_VALIDATOR_URL") {
            self.services.schema_validator_url = non_empty(url);
        }
        if let Some(path) = lookup("JWT_SIGNING_KEY_PATH") {
            self.keys.signing_key_path = path.into();
        }
        if let Some(path) = lookup("JWT_ENCRYPTION_KEY_PATH") {
            self.keys.encryption_key_path = path.into();
        }
    }

    /// Apply command line arguments to override configuration values.
    ///
    /// Only values that are explicitly provided override the existing
    /// configuration.
    ///
    /// # Parameters
    ///
    /// * `port` - TCP port for the launcher web server
    /// * `address` - Network address for the launcher to bind to
    /// * `survey_runner_url` - Base URL of the survey runner
    pub fn apply_args(
        &mut self,
        port: Option<u16>,
        address: Option<String>,
        survey_runner_url: Option<String>,
    ) {
        if let Some(port) = port {
            debug!("Overriding port from command line: {}", port);
            self.launcher.port = port;
        }
        if let Some(address) = address {
            debug!("Overriding address from command line: {}", address);
            self.launcher.address = address;
        }
        if let Some(url) = survey_runner_url {
            debug!("Overriding survey runner URL from command line: {}", url);
            self.services.survey_runner_url = url;
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_settings() {
        let config = Config::default();
        assert_eq!(config.launcher.address, "0.0.0.0");
        assert_eq!(config.launcher.port, 8000);
        assert_eq!(config.services.survey_runner_url, "http://localhost:5000");
        assert_eq!(config.services.http_timeout_secs, 5);
        assert!(config.services.survey_register_url.is_none());
        assert!(config
            .keys
            .signing_key_path
            .ends_with("sdc-user-authentication-signing-rrm-private-key.pem"));
    }

    #[test]
    fn test_apply_vars_overrides_and_clears() {
        let mut config = Config::default();
        config.services.schema_validator_url = Some("http://validator".to_string());

        let vars: HashMap<&str, &str> = [
            ("GO_LAUNCH_A_SURVEY_LISTEN_PORT", "9000"),
            ("SURVEY_RUNNER_URL", "http://runner:5000"),
            ("SURVEY_REGISTER_URL", "http://register"),
            ("SCHEMA_VALIDATOR_URL", ""),
            ("JWT_SIGNING_KEY_PATH", "/keys/signing.pem"),
        ]
        .into_iter()
        .collect();
        config.apply_vars(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.launcher.port, 9000);
        assert_eq!(config.services.survey_runner_url, "http://runner:5000");
        assert_eq!(
            config.services.survey_register_url.as_deref(),
            Some("http://register")
        );
        assert!(config.services.schema_validator_url.is_none());
        assert_eq!(
            config.keys.signing_key_path,
            std::path::PathBuf::from("/keys/signing.pem")
        );
    }

    #[test]
    fn test_invalid_port_variable_is_ignored() {
        let mut config = Config::default();
        config.apply_vars(|name| {
            (name == "GO_LAUNCH_A_SURVEY_LISTEN_PORT").then(|| "eighty".to_string())
        });
        assert_eq!(config.launcher.port, 8000);
    }

    #[test]
    fn test_apply_args_only_overrides_given_values() {
        let mut config = Config::default();
        config.apply_args(Some(8081), None, Some("http://runner".to_string()));
        assert_eq!(config.launcher.port, 8081);
        assert_eq!(config.launcher.address, "0.0.0.0");
        assert_eq!(config.services.survey_runner_url, "http://runner");
    }

    #[test]
    fn test_from_yaml_str_with_partial_sections() {
        let yaml = r#"
services:
  survey_runner_url: "http://runner.example:5000"
  survey_register_url: "http://register.example"
  register_api: legacy
"#;
        let config = Config::from_yaml_str(yaml).unwrap();
        assert_eq!(
            config.services.survey_runner_url,
            "http://runner.example:5000"
        );
        assert_eq!(config.services.register_api, RegisterApi::Legacy);
        assert_eq!(config.launcher.port, 8000);
    }

    #[test]
    fn test_from_yaml_str_rejects_unknown_register_api() {
        let yaml = r#"
services:
  register_api: soap
"#;
        assert!(Config::from_yaml_str(yaml).is_err());
    }
}
