// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the survey-launcher project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Launcher web server configuration

use serde::{Deserialize, Serialize};

/// Configuration for the launcher web server.
///
/// Besides network binding, this section owns the launcher-level value that
/// ends up in every token: the account service URL the survey runner links
/// back to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// The network address the server will bind to. Default is "0.0.0.0".
    #[serde(default = "default_address")]
    pub address: String,

    /// The TCP port the launcher listens on. Default is 8000.
    #[serde(default = "default_port")]
    pub port: u16,

    /// The server name reported in HTTP headers and logs.
    #[serde(default = "default_name")]
    pub name: String,

    /// Default value of the `account_service_url` claim.
    #[serde(default = "default_account_service_url")]
    pub account_service_url: String,
}

fn default_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_name() -> String {
    format!("SurveyLauncher/{}", env!("CARGO_PKG_VERSION"))
}

fn default_account_service_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            name: default_name(),
            account_service_url: default_account_service_url(),
        }
    }
}
