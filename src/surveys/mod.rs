// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the survey-launcher project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Schema resolution
//!
//! The launcher needs three things from a questionnaire schema: its `eq_id`,
//! its `form_type` and, for schemas not bundled with the survey runner, the
//! URL the runner should load it from. [`SchemaResolver`] obtains them from:
//!
//! - the built-in list of schema files ([`builtin`]),
//! - the survey runner's own listing ([`runner`]), when enabled,
//! - the survey register ([`register`]), when configured,
//! - or any schema URL given directly (quick launch).
//!
//! All outbound calls share one [`reqwest::Client`] with the configured
//! timeout.

pub mod builtin;
pub mod register;
pub mod runner;
pub mod schema;

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::config::ServicesConfig;

pub use builtin::{builtin_schemas, BUILTIN_SCHEMAS};
pub use schema::{extract_eq_id_form_type, MetadataField, QuestionnaireSchema, SchemaDescriptor};

/// Errors raised while listing, fetching or validating schemas.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Survey not found: {name}")]
    NotFound { name: String },

    #[error("Failed to create HTTP client: {source}")]
    Client {
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to load Schema from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to load Schema from {url}: HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("Schema failed validation: {reason}")]
    Validation { reason: String },

    #[error("Failed to unmarshal Schema from {url}: {reason}")]
    Unmarshal { url: String, reason: String },
}

/// Looks up launchable schemas. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SchemaResolver {
    client: Client,
    services: ServicesConfig,
}

impl SchemaResolver {
    /// Create a resolver for the services described in `services`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Client`] if the HTTP client cannot be built.
    pub fn new(services: &ServicesConfig) -> Result<Self, SchemaError> {
        let client = Client::builder()
            .timeout(services.http_timeout())
            .build()
            .map_err(|source| SchemaError::Client { source })?;
        Ok(Self {
            client,
            services: services.clone(),
        })
    }

    /// Every launchable schema: built-in files, then the runner listing, then
    /// the register. A listing that cannot be fetched is skipped with a
    /// warning. The first entry wins when names collide.
    pub async fn available_schemas(&self) -> Vec<SchemaDescriptor> {
        let mut schemas = builtin_schemas();

        if self.services.list_runner_schemas {
            let url = self.services.runner_schema_url();
            match runner::fetch_runner_schemas(&self.client, url).await {
                Ok(listed) => schemas.extend(listed),
                Err(e) => warn!("Skipping survey runner schema listing: {}", e),
            }
        }

        if let Some(register_url) = &self.services.survey_register_url {
            match register::fetch_register_schemas(
                &self.client,
                register_url,
                self.services.register_api,
            )
            .await
            {
                Ok(listed) => schemas.extend(listed),
                Err(e) => warn!("Skipping schema register {}: {}", register_url, e),
            }
        }

        let mut seen = HashSet::new();
        schemas.retain(|schema| seen.insert(schema.name.clone()));
        schemas
    }

    /// Find an available schema by its display name.
    pub async fn resolve_by_name(&self, name: &str) -> Result<SchemaDescriptor, SchemaError> {
        self.available_schemas()
            .await
            .into_iter()
            .find(|schema| schema.name == name)
            .ok_or_else(|| SchemaError::NotFound {
                name: name.to_string(),
            })
    }

    /// Fetch a schema document from `url` and describe it.
    ///
    /// The document is validated first when a validator is configured. The
    /// returned URL gains a `?bust=<timestamp>` suffix when `url` carries no
    /// query, so the runner does not serve a cached copy.
    pub async fn resolve_by_url(&self, url: &str) -> Result<SchemaDescriptor, SchemaError> {
        let body = get_bytes(&self.client, url).await?;
        self.validate_schema(&body).await?;

        let document: QuestionnaireSchema =
            serde_json::from_slice(&body).map_err(|e| SchemaError::Unmarshal {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        info!(
            "Resolved schema {} as eq_id={} form_type={}",
            url, document.eq_id, document.form_type
        );

        Ok(SchemaDescriptor {
            name: url.to_string(),
            eq_id: document.eq_id,
            form_type: document.form_type,
            url: Some(cache_busted(url, Utc::now())),
            metadata: document.metadata,
        })
    }

    /// Submit a schema document to the configured validator.
    ///
    /// Succeeds without a request when no validator is configured.
    pub async fn validate_schema(&self, body: &[u8]) -> Result<(), SchemaError> {
        let Some(validator) = &self.services.schema_validator_url else {
            return Ok(());
        };
        let url = format!("{}/validate", validator.trim_end_matches('/'));
        debug!("Validating schema with {}", url);

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_vec())
            .send()
            .await
            .map_err(|e| SchemaError::Validation {
                reason: e.to_string(),
            })?;

        if response.status() == StatusCode::OK {
            return Ok(());
        }

        let reason = response
            .text()
            .await
            .unwrap_or_else(|e| e.to_string());
        Err(SchemaError::Validation { reason })
    }

    /// The `metadata` list a schema declares.
    ///
    /// The document is read from the schema URL, or from the survey runner
    /// by `eq_id` and `form_type` when the schema has no URL.
    pub async fn required_metadata(
        &self,
        schema: &SchemaDescriptor,
    ) -> Result<Vec<MetadataField>, SchemaError> {
        let url = match &schema.url {
            Some(url) => url.clone(),
            None => runner::runner_schema_document_url(self.services.runner_schema_url(), schema),
        };
        info!("Loading metadata from schema: {}", url);

        let document: QuestionnaireSchema = get_json(&self.client, &url).await?;
        Ok(document.metadata)
    }

    /// Describe `schema` together with its declared metadata.
    ///
    /// Descriptors that already carry metadata are returned as they are.
    ///
    /// # Errors
    ///
    /// Any failure of [`SchemaResolver::required_metadata`]; a schema whose
    /// metadata cannot be read is not launchable.
    pub async fn with_required_metadata(
        &self,
        schema: SchemaDescriptor,
    ) -> Result<SchemaDescriptor, SchemaError> {
        if !schema.metadata.is_empty() {
            return Ok(schema);
        }
        let metadata = self.required_metadata(&schema).await?;
        debug!("{} declares {} metadata fields", schema.name, metadata.len());
        Ok(schema.with_metadata(metadata))
    }
}

/// Append `?bust=YYYYMMDDhhmmss` to `url` unless it already has a query.
pub fn cache_busted(url: &str, now: DateTime<Utc>) -> String {
    if url.contains('?') {
        url.to_string()
    } else {
        format!("{}?bust={}", url, now.format("%Y%m%d%H%M%S"))
    }
}

/// GET `url`, rejecting any status other than 200.
pub(crate) async fn get_bytes(client: &Client, url: &str) -> Result<Vec<u8>, SchemaError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| SchemaError::Fetch {
            url: url.to_string(),
            source,
        })?;

    if response.status() != StatusCode::OK {
        return Err(SchemaError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let body = response.bytes().await.map_err(|source| SchemaError::Fetch {
        url: url.to_string(),
        source,
    })?;
    Ok(body.to_vec())
}

/// GET `url` and decode its JSON body.
pub(crate) async fn get_json<T: serde::de::DeserializeOwned>(
    client: &Client,
    url: &str,
) -> Result<T, SchemaError> {
    let body = get_bytes(client, url).await?;
    serde_json::from_slice(&body).map_err(|e| SchemaError::Unmarshal {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
