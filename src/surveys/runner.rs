// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the survey-launcher project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Schema listing and schema documents served by the survey runner.

use reqwest::Client;

use super::schema::SchemaDescriptor;
use super::{get_json, SchemaError};

/// `GET {runner_schema_url}/schemas`: the schema file names the runner serves.
pub async fn fetch_runner_schemas(
    client: &Client,
    runner_schema_url: &str,
) -> Result<Vec<SchemaDescriptor>, SchemaError> {
    let url = format!("{}/schemas", runner_schema_url.trim_end_matches('/'));
    let names: Vec<String> = get_json(client, &url).await?;
    Ok(names
        .iter()
        .map(|name| SchemaDescriptor::from_filename(name))
        .collect())
}

/// Where the runner serves the document of a schema it knows by id.
pub fn runner_schema_document_url(runner_schema_url: &str, schema: &SchemaDescriptor) -> String {
    format!(
        "{}/schemas/{}/{}",
        runner_schema_url.trim_end_matches('/'),
        schema.eq_id,
        schema.form_type
    )
}
