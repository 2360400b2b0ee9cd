// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the survey-launcher project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Route handlers
//!
//! | route | purpose |
//! |---|---|
//! | `GET /` | launch form |
//! | `POST /` | launch or flush a named schema |
//! | `GET /quick-launch?url=…` | launch a schema given by URL |
//! | `GET /schemas` | available schemas as JSON |
//! | `GET /metadata?schema=…` | metadata a schema declares, with defaults |

use std::sync::Arc;

use log::info;
use rocket::response::content::RawHtml;
use rocket::response::Redirect;
use rocket::serde::json::Json;
use rocket::tokio::task::spawn_blocking;
use rocket::{get, post, State};
use serde::Serialize;

use super::error::LaunchError;
use super::page::render_launch_page;
use super::request_guard::RawQueryString;
use crate::auth::{ClaimSource, LaunchValues, TokenService};
use crate::config::Config;
use crate::surveys::{SchemaDescriptor, SchemaResolver};

/// What the launch form asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchAction {
    /// Start the survey: `301` to `/session`.
    Launch,
    /// Submit the survey as-is: `307` to `/flush`.
    Flush,
}

impl LaunchAction {
    /// The action named by the submitted buttons. Flush wins when both are
    /// present; empty values count as absent.
    pub fn from_values(values: &LaunchValues) -> Result<Self, LaunchError> {
        let pressed = |key: &str| values.first(key).is_some_and(|v| !v.is_empty());
        if pressed("action_flush") {
            Ok(LaunchAction::Flush)
        } else if pressed("action_launch") {
            Ok(LaunchAction::Launch)
        } else {
            Err(LaunchError::InvalidAction)
        }
    }

    fn redirect(self, runner_url: &str, token: &str) -> Redirect {
        let base = runner_url.trim_end_matches('/');
        match self {
            LaunchAction::Launch => Redirect::moved(format!("{}/session?token={}", base, token)),
            LaunchAction::Flush => Redirect::temporary(format!("{}/flush?token={}", base, token)),
        }
    }
}

/// Render the launch form
#[get("/")]
pub async fn launch_page(
    config: &State<Arc<Config>>,
    resolver: &State<SchemaResolver>,
    tokens: &State<TokenService>,
) -> Result<RawHtml<String>, LaunchError> {
    let schemas = resolver.available_schemas().await;
    let placeholder = SchemaDescriptor::from_filename("");
    let defaults = tokens.claims_for(ClaimSource::Defaults, schemas.first().unwrap_or(&placeholder));
    render_launch_page(config, &schemas, &defaults).map(RawHtml)
}

/// Issue a token for the submitted form and redirect to the survey runner
///
/// The body is `application/x-www-form-urlencoded`; `schema` names one of
/// the available schemas and `action_launch` or `action_flush` picks the
/// runner endpoint. Every other field feeds the claims.
#[post("/", data = "<body>")]
pub async fn launch(
    body: String,
    config: &State<Arc<Config>>,
    resolver: &State<SchemaResolver>,
    tokens: &State<TokenService>,
) -> Result<Redirect, LaunchError> {
    let values =
        LaunchValues::from_urlencoded(&body).map_err(|e| LaunchError::Malformed(e.to_string()))?;
    info!("Request: {}", values.to_urlencoded());

    let action = LaunchAction::from_values(&values)?;
    let name = values
        .first("schema")
        .ok_or(LaunchError::MissingParameter("schema"))?;

    let schema = resolver.resolve_by_name(name).await?;
    let schema = resolver.with_required_metadata(schema).await?;

    let tokens = tokens.inner().clone();
    let token = spawn_blocking(move || tokens.issue_for(ClaimSource::Form(&values), &schema))
        .await
        .map_err(|e| LaunchError::Worker(e.to_string()))??;

    Ok(action.redirect(&config.services.survey_runner_url, &token))
}

/// Launch the schema at `url` with defaults for anything not in the query
#[get("/quick-launch")]
pub async fn quick_launch(
    raw_query: RawQueryString,
    config: &State<Arc<Config>>,
    resolver: &State<SchemaResolver>,
    tokens: &State<TokenService>,
) -> Result<Redirect, LaunchError> {
    let values = raw_query
        .values()
        .map_err(|e| LaunchError::Malformed(e.to_string()))?;
    let url = values
        .first("url")
        .filter(|url| !url.is_empty())
        .ok_or(LaunchError::MissingParameter("url"))?;
    info!("Quick launch request for {}", url);

    let schema = resolver.resolve_by_url(url).await?;

    // Key reads and RSA work stay off the async workers
    let tokens = tokens.inner().clone();
    let token = spawn_blocking(move || tokens.issue_for(ClaimSource::Query(&values), &schema))
        .await
        .map_err(|e| LaunchError::Worker(e.to_string()))??;

    let runner = config.services.survey_runner_url.trim_end_matches('/');
    Ok(Redirect::found(format!("{}/session?token={}", runner, token)))
}

/// List available schemas
#[get("/schemas")]
pub async fn list_schemas(resolver: &State<SchemaResolver>) -> Json<Vec<SchemaDescriptor>> {
    Json(resolver.available_schemas().await)
}

/// One metadata field a schema declares, with the value the form would
/// pre-fill.
#[derive(Debug, Serialize)]
pub struct MetadataDefault {
    pub name: String,
    pub validator: String,
    pub default: String,
}

/// Metadata declared by the named schema
#[get("/metadata?<schema>")]
pub async fn schema_metadata(
    schema: &str,
    resolver: &State<SchemaResolver>,
    tokens: &State<TokenService>,
) -> Result<Json<Vec<MetadataDefault>>, LaunchError> {
    let descriptor = resolver.resolve_by_name(schema).await?;
    let metadata = resolver.required_metadata(&descriptor).await?;

    let defaults = tokens
        .claims_for(ClaimSource::Defaults, &descriptor)
        .string_claims();
    let fields = metadata
        .into_iter()
        .map(|field| {
            let default = if field.is_boolean() {
                "false".to_string()
            } else {
                defaults.get(&field.name).cloned().unwrap_or_default()
            };
            MetadataDefault {
                name: field.name,
                validator: field.validator,
                default,
            }
        })
        .collect();

    Ok(Json(fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_selection() {
        let launch = LaunchValues::from_urlencoded("action_launch=Open+Survey").unwrap();
        assert_eq!(LaunchAction::from_values(&launch).unwrap(), LaunchAction::Launch);

        let both =
            LaunchValues::from_urlencoded("action_launch=Open&action_flush=Flush").unwrap();
        assert_eq!(LaunchAction::from_values(&both).unwrap(), LaunchAction::Flush);

        let empty = LaunchValues::from_urlencoded("action_launch=").unwrap();
        assert!(matches!(
            LaunchAction::from_values(&empty),
            Err(LaunchError::InvalidAction)
        ));
    }
}
