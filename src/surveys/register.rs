// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the survey-launcher project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Survey register listings
//!
//! Two listing formats are supported, selected by `services.register_api`:
//!
//! * `published`: `GET {register}/questionnaires/published` returns a JSON
//!   array of published questionnaires. Each one expands into one launchable
//!   schema per published version.
//! * `legacy`: `GET {register}` returns a HAL document whose
//!   `_embedded.schemas` lists schema files with a `self` link.

use chrono::DateTime;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;

use super::schema::{extract_eq_id_form_type, SchemaDescriptor};
use super::{get_json, SchemaError};
use crate::config::RegisterApi;

/// One entry of the published questionnaires listing.
#[derive(Debug, Clone, Deserialize)]
pub struct PublishedQuestionnaire {
    #[serde(default)]
    pub registry_id: String,
    pub survey_id: String,
    pub form_type: String,
    pub title: String,
    #[serde(rename = "lastPublished")]
    pub last_published: String,
    pub survey_version: VersionCount,
    #[serde(default)]
    pub eq_id: Option<String>,
}

/// `survey_version` is sent as a string but older registers send a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum VersionCount {
    Number(u32),
    Text(String),
}

impl VersionCount {
    fn count(&self) -> Option<u32> {
        match self {
            VersionCount::Number(n) => Some(*n),
            VersionCount::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HalListing {
    #[serde(rename = "_embedded", default)]
    embedded: HalEmbedded,
}

#[derive(Debug, Default, Deserialize)]
struct HalEmbedded {
    #[serde(default)]
    schemas: Vec<HalSchema>,
}

#[derive(Debug, Deserialize)]
struct HalSchema {
    name: String,
    #[serde(rename = "_links", default)]
    links: HalLinks,
}

#[derive(Debug, Default, Deserialize)]
struct HalLinks {
    #[serde(rename = "self")]
    this: Option<HalLink>,
}

#[derive(Debug, Deserialize)]
struct HalLink {
    href: String,
}

/// Fetch the register listing in the configured format.
pub async fn fetch_register_schemas(
    client: &Client,
    register_url: &str,
    api: RegisterApi,
) -> Result<Vec<SchemaDescriptor>, SchemaError> {
    let base = register_url.trim_end_matches('/');
    match api {
        RegisterApi::Published => {
            let url = format!("{}/questionnaires/published", base);
            let entries: Vec<PublishedQuestionnaire> = get_json(client, &url).await?;
            Ok(published_descriptors(base, &entries))
        }
        RegisterApi::Legacy => {
            let listing: HalListing = get_json(client, register_url).await?;
            Ok(legacy_descriptors(listing))
        }
    }
}

/// Expand published questionnaires into one descriptor per version.
pub fn published_descriptors(
    register_url: &str,
    entries: &[PublishedQuestionnaire],
) -> Vec<SchemaDescriptor> {
    let base = register_url.trim_end_matches('/');
    let mut schemas = Vec::new();

    for entry in entries {
        let Some(versions) = entry.survey_version.count() else {
            warn!(
                "Skipping register entry {}_{}: invalid survey_version {:?}",
                entry.survey_id, entry.form_type, entry.survey_version
            );
            continue;
        };
        let published = publication_date(&entry.last_published);
        let eq_id = entry
            .eq_id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| entry.survey_id.clone());

        for version in 1..=versions {
            schemas.push(SchemaDescriptor {
                name: format!(
                    "{}_{} {} (v{} - {})",
                    entry.survey_id, entry.form_type, entry.title, version, published
                ),
                eq_id: eq_id.clone(),
                form_type: entry.form_type.clone(),
                url: Some(format!(
                    "{}/questionnaire/{}/{}/{}",
                    base, entry.survey_id, entry.form_type, version
                )),
                metadata: Vec::new(),
            });
        }
    }

    debug!("Register lists {} published schema versions", schemas.len());
    schemas
}

fn legacy_descriptors(listing: HalListing) -> Vec<SchemaDescriptor> {
    listing
        .embedded
        .schemas
        .into_iter()
        .map(|schema| {
            let (eq_id, form_type) = extract_eq_id_form_type(&schema.name);
            SchemaDescriptor {
                url: schema.links.this.map(|link| link.href),
                name: schema.name,
                eq_id,
                form_type,
                metadata: Vec::new(),
            }
        })
        .collect()
}

/// `dd/mm/yyyy` of an RFC 3339 timestamp, or the raw value if it does not parse.
fn publication_date(last_published: &str) -> String {
    match DateTime::parse_from_rfc3339(last_published) {
        Ok(date) => date.format("%d/%m/%Y").to_string(),
        Err(e) => {
            warn!("Unparseable lastPublished '{}': {}", last_published, e);
            last_published.to_string()
        }
    }
}
