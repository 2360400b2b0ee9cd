// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the survey-launcher project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! External service configuration
//!
//! The launcher consumes three HTTP services: the survey runner (which also
//! serves schemas), an optional questionnaire register, and an optional
//! schema validator.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which register API the launcher talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegisterApi {
    /// `GET {register}/questionnaires/published`, a JSON array of published
    /// questionnaires.
    #[default]
    Published,
    /// `GET {register}`, a HAL document embedding a `schemas` list.
    Legacy,
}

/// Locations and client settings for external services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// Base URL of the survey runner; tokens are sent to
    /// `{survey_runner_url}/session`.
    #[serde(default = "default_survey_runner_url")]
    pub survey_runner_url: String,

    /// Base URL used to fetch schemas from the runner. Falls back to
    /// `survey_runner_url` when unset.
    #[serde(default)]
    pub survey_runner_schema_url: Option<String>,

    /// Whether `GET {runner_schema_url}/schemas` is queried when listing
    /// available schemas.
    #[serde(default)]
    pub list_runner_schemas: bool,

    /// Base URL of the questionnaire register. No register lookups happen
    /// when unset.
    #[serde(default)]
    pub survey_register_url: Option<String>,

    /// Flavour of the register API.
    #[serde(default)]
    pub register_api: RegisterApi,

    /// Base URL of the schema validator. Schemas fetched by URL are not
    /// validated when unset.
    #[serde(default)]
    pub schema_validator_url: Option<String>,

    /// Timeout applied to every outbound request, in seconds.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_survey_runner_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_http_timeout_secs() -> u64 {
    5
}

impl ServicesConfig {
    /// The base URL schemas are fetched from.
    pub fn runner_schema_url(&self) -> &str {
        self.survey_runner_schema_url
            .as_deref()
            .unwrap_or(&self.survey_runner_url)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            survey_runner_url: default_survey_runner_url(),
            survey_runner_schema_url: None,
            list_runner_schemas: false,
            survey_register_url: None,
            register_api: RegisterApi::default(),
            schema_validator_url: None,
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}
