// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the survey-launcher project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Schema descriptors
//!
//! A [`SchemaDescriptor`] is the small piece of a questionnaire schema the
//! launcher needs to build claims: its identifier, form type and, when it
//! came from a URL, where the runner can fetch it.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// `<eq_id>_<form_type>[.json]`, e.g. `1_0005.json` or `mbs_0111.json`.
static EQ_ID_FORM_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<eq_id>[a-z0-9]+)_(?P<form_type>\w+)").expect("valid eq_id regex")
});

/// Validator name that marks a metadata field as boolean.
pub const BOOLEAN_VALIDATOR: &str = "boolean";

/// One entry of a schema's `metadata` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataField {
    pub name: String,
    #[serde(default)]
    pub validator: String,
}

impl MetadataField {
    pub fn is_boolean(&self) -> bool {
        self.validator == BOOLEAN_VALIDATOR
    }
}

/// Minimal description of a launchable schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    /// Name shown in the launch page and used for name lookups.
    pub name: String,
    pub eq_id: String,
    pub form_type: String,
    /// Where the schema can be fetched, if it is not served by the runner
    /// under `/schemas/{eq_id}/{form_type}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Metadata fields the schema declares; empty until fetched.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<MetadataField>,
}

impl SchemaDescriptor {
    /// Descriptor for a schema file served by the runner.
    ///
    /// Names that do not follow the `<eq_id>_<form_type>` convention yield
    /// empty identifiers.
    pub fn from_filename(filename: &str) -> Self {
        let (eq_id, form_type) = extract_eq_id_form_type(filename);
        Self {
            name: filename.to_string(),
            eq_id,
            form_type,
            url: None,
            metadata: Vec::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Vec<MetadataField>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Split a schema name into `(eq_id, form_type)`.
pub fn extract_eq_id_form_type(name: &str) -> (String, String) {
    let stem = name.strip_suffix(".json").unwrap_or(name);
    match EQ_ID_FORM_TYPE.captures(stem) {
        Some(caps) => (caps["eq_id"].to_string(), caps["form_type"].to_string()),
        None => (String::new(), String::new()),
    }
}

/// The parts of a schema document the launcher reads.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionnaireSchema {
    pub eq_id: String,
    pub form_type: String,
    #[serde(default)]
    pub metadata: Vec<MetadataField>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_prefix() {
        let schema = SchemaDescriptor::from_filename("161_0005.json");
        assert_eq!(schema.eq_id, "161");
        assert_eq!(schema.form_type, "0005");
        assert_eq!(schema.name, "161_0005.json");
        assert!(schema.url.is_none());
    }

    #[test]
    fn test_alphanumeric_prefix_and_word_suffix() {
        assert_eq!(
            extract_eq_id_form_type("census_household.json"),
            ("census".to_string(), "household".to_string())
        );
        assert_eq!(
            extract_eq_id_form_type("test_big_list_naughty_strings.json"),
            ("test".to_string(), "big_list_naughty_strings".to_string())
        );
        assert_eq!(
            extract_eq_id_form_type("1_0102refresh"),
            ("1".to_string(), "0102refresh".to_string())
        );
    }

    #[test]
    fn test_non_matching_name() {
        assert_eq!(
            extract_eq_id_form_type("Uppercase_0001.json"),
            (String::new(), String::new())
        );
        assert_eq!(
            extract_eq_id_form_type("nounderscore.json"),
            (String::new(), String::new())
        );
    }

    #[test]
    fn test_schema_document_without_metadata() {
        let schema: QuestionnaireSchema =
            serde_json::from_str(r#"{"eq_id":"123-456-789","form_type":"002"}"#).unwrap();
        assert_eq!(schema.eq_id, "123-456-789");
        assert!(schema.metadata.is_empty());
    }

    #[test]
    fn test_boolean_metadata() {
        let schema: QuestionnaireSchema = serde_json::from_str(
            r#"{"eq_id":"1","form_type":"0005","metadata":[
                {"name":"sexual_identity","validator":"boolean"},
                {"name":"ru_ref","validator":"string"}]}"#,
        )
        .unwrap();
        assert!(schema.metadata[0].is_boolean());
        assert!(!schema.metadata[1].is_boolean());
    }
}
