// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the survey-launcher project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Launch page rendering

use handlebars::Handlebars;
use serde_json::json;

use super::error::LaunchError;
use crate::auth::ClaimSet;
use crate::config::Config;
use crate::surveys::SchemaDescriptor;

const LAUNCH_TEMPLATE: &str = "launch";

/// Render the launch form listing `schemas`, pre-filled from `defaults`.
pub fn render_launch_page(
    config: &Config,
    schemas: &[SchemaDescriptor],
    defaults: &ClaimSet,
) -> Result<String, LaunchError> {
    let mut handlebars = Handlebars::new();
    handlebars
        .register_template_string(
            LAUNCH_TEMPLATE,
            include_str!("../../resources/templates/launch.hbs"),
        )
        .map_err(|e| LaunchError::Render(e.to_string()))?;

    let fields: Vec<_> = defaults
        .form_fields()
        .into_iter()
        .map(|(name, value)| json!({ "name": name, "value": value }))
        .collect();

    let data = json!({
        "title": config.launcher.name,
        "survey_runner_url": config.services.survey_runner_url,
        "schemas": schemas,
        "fields": fields,
        "role": defaults.roles.first().cloned().unwrap_or_default(),
    });

    handlebars
        .render(LAUNCH_TEMPLATE, &data)
        .map_err(|e| LaunchError::Render(e.to_string()))
}
