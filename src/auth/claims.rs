// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the survey-launcher project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Launch token claims
//!
//! This module defines the [`ClaimSet`] carried by a launch token and the
//! [`ClaimsBuilder`] that assembles it from three sources:
//!
//! 1. hard defaults for every recognized field,
//! 2. caller-supplied values (a submitted form, or a quick-launch query),
//! 3. the [`SchemaDescriptor`] of the schema being launched,
//!
//! plus freshly generated token metadata (`iat`, `exp`, `jti`, `tx_id`).
//!
//! Fields not listed in [`RECOGNIZED_CLAIMS`] are dropped unless the schema
//! enumerates them in its `metadata` list, in which case they are carried in
//! [`ClaimSet::extra`].
//!
//! ## Defaults
//!
//! | claim | default |
//! |---|---|
//! | `user_id` | `UNKNOWN` |
//! | `period_id` | `201605` |
//! | `period_str` | `May 2017` |
//! | `collection_exercise_sid` | new UUIDv4 |
//! | `ru_ref` | `12346789012A` |
//! | `ru_name`, `trad_as` | `ESSENTIAL ENTERPRISE LTD.` |
//! | `ref_p_start_date` / `ref_p_end_date` | `2016-05-01` / `2016-05-31` |
//! | `return_by` | `2016-06-12` |
//! | `employmentDate` | `2016-06-10` |
//! | `region_code` / `language_code` | `GB-ENG` / `en` |
//! | `case_id` | new UUIDv4 |
//! | `case_ref` | `1000000000000001` |
//! | `display_address` | `68 Abingdon Road, Goathill, PE12 5EH` |
//! | `country_code` | `E` |
//! | `started_at` | issue date, `YYYY-MM-DD` |
//! | `roles` | `["dumper"]` |
//! | `account_service_url` | `launcher.account_service_url` (not overridable from a query) |
//! | `sexual_identity` | `false` |

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::values::LaunchValues;
use crate::config::LauncherConfig;
use crate::surveys::SchemaDescriptor;

/// How long a launch token stays valid. Not configurable from input.
pub const TOKEN_LIFETIME: TimeDelta = TimeDelta::minutes(10);

/// Every claim name the builder owns. Input keys outside this list are
/// dropped unless the schema's metadata enumerates them.
pub const RECOGNIZED_CLAIMS: &[&str] = &[
    "iat",
    "exp",
    "jti",
    "tx_id",
    "user_id",
    "period_id",
    "period_str",
    "collection_exercise_sid",
    "ru_ref",
    "ru_name",
    "trad_as",
    "ref_p_start_date",
    "ref_p_end_date",
    "return_by",
    "employmentDate",
    "region_code",
    "language_code",
    "case_id",
    "case_ref",
    "display_address",
    "country_code",
    "started_at",
    "roles",
    "account_service_url",
    "sexual_identity",
    "eq_id",
    "form_type",
    "survey_url",
];

/// Claims a caller can meaningfully edit on the launch form, in display order.
pub const FORM_FIELDS: &[&str] = &[
    "user_id",
    "period_id",
    "period_str",
    "collection_exercise_sid",
    "ru_ref",
    "ru_name",
    "trad_as",
    "ref_p_start_date",
    "ref_p_end_date",
    "return_by",
    "employmentDate",
    "region_code",
    "language_code",
    "case_id",
    "case_ref",
    "display_address",
    "country_code",
    "account_service_url",
];

const DEFAULT_ROLE: &str = "dumper";

/// Value of a claim that is not one of the typed fields of [`ClaimSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaimValue {
    Flag(bool),
    Text(String),
    List(Vec<String>),
}

/// The full set of claims carried by a launch token.
///
/// Serialized in field declaration order, extra claims last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSet {
    /// Issued at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, always `iat` + [`TOKEN_LIFETIME`].
    pub exp: i64,
    /// Unique token id.
    pub jti: String,
    /// Unique transaction id.
    pub tx_id: String,

    pub user_id: String,
    pub period_id: String,
    pub period_str: String,
    pub collection_exercise_sid: String,
    pub ru_ref: String,
    pub ru_name: String,
    pub trad_as: String,
    pub ref_p_start_date: String,
    pub ref_p_end_date: String,
    pub return_by: String,
    #[serde(rename = "employmentDate")]
    pub employment_date: String,
    pub region_code: String,
    pub language_code: String,
    pub case_id: String,
    pub case_ref: String,
    pub display_address: String,
    pub country_code: String,
    pub started_at: String,
    pub roles: Vec<String>,
    pub account_service_url: String,
    pub sexual_identity: bool,

    pub eq_id: String,
    pub form_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub survey_url: Option<String>,

    /// Claims enumerated by the schema's metadata that have no typed field.
    #[serde(flatten)]
    pub extra: BTreeMap<String, ClaimValue>,
}

/// Where caller-supplied values come from.
///
/// The source decides how absent boolean fields are read: a submitted form
/// uses checkbox semantics (absent means unticked), a query falls back to the
/// field default.
#[derive(Debug, Clone, Copy)]
pub enum ClaimSource<'a> {
    /// No caller input at all.
    Defaults,
    /// Values from the launch form.
    Form(&'a LaunchValues),
    /// Values from a quick-launch query, defaults for the rest.
    Query(&'a LaunchValues),
}

impl<'a> ClaimSource<'a> {
    fn values(&self) -> Option<&'a LaunchValues> {
        match self {
            ClaimSource::Defaults => None,
            ClaimSource::Form(values) | ClaimSource::Query(values) => Some(values),
        }
    }

    fn text(&self, key: &str) -> Option<String> {
        self.values()
            .and_then(|values| values.first(key))
            .map(str::to_string)
    }

    fn flag(&self, key: &str, default: bool) -> bool {
        match self {
            ClaimSource::Defaults => default,
            ClaimSource::Query(values) => values.first(key).map(parse_bool).unwrap_or(default),
            ClaimSource::Form(values) => values.first(key).map(parse_bool).unwrap_or(false),
        }
    }
}

/// Truthiness of a submitted boolean value.
///
/// `1`, `t` and the usual spellings of `true` are true, as is `on`, which
/// browsers send for a ticked checkbox without a value attribute.
pub fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "t" | "T" | "TRUE" | "true" | "True" | "on")
}

/// Assembles [`ClaimSet`]s.
#[derive(Debug, Clone)]
pub struct ClaimsBuilder {
    account_service_url: String,
}

impl ClaimsBuilder {
    pub fn new(config: &LauncherConfig) -> Self {
        Self {
            account_service_url: config.account_service_url.clone(),
        }
    }

    /// Build a claim set issued now.
    pub fn build(&self, source: ClaimSource<'_>, schema: &SchemaDescriptor) -> ClaimSet {
        self.build_at(source, schema, Utc::now())
    }

    /// Build a claim set issued at `issued`.
    pub fn build_at(
        &self,
        source: ClaimSource<'_>,
        schema: &SchemaDescriptor,
        issued: DateTime<Utc>,
    ) -> ClaimSet {
        let text = |key: &str, default: &str| source.text(key).unwrap_or_else(|| default.to_string());
        let generated = |key: &str| {
            source
                .text(key)
                .unwrap_or_else(|| Uuid::new_v4().to_string())
        };

        let roles = match source.values().map(|values| values.all("roles")) {
            Some(roles) if !roles.is_empty() => roles.to_vec(),
            _ => vec![DEFAULT_ROLE.to_string()],
        };

        let extra = schema
            .metadata
            .iter()
            .filter(|field| !RECOGNIZED_CLAIMS.contains(&field.name.as_str()))
            .map(|field| {
                let value = if field.is_boolean() {
                    ClaimValue::Flag(source.flag(&field.name, false))
                } else {
                    ClaimValue::Text(source.text(&field.name).unwrap_or_default())
                };
                (field.name.clone(), value)
            })
            .collect();

        ClaimSet {
            iat: issued.timestamp(),
            exp: (issued + TOKEN_LIFETIME).timestamp(),
            jti: Uuid::new_v4().to_string(),
            tx_id: Uuid::new_v4().to_string(),

            user_id: text("user_id", "UNKNOWN"),
            period_id: text("period_id", "201605"),
            period_str: text("period_str", "May 2017"),
            collection_exercise_sid: generated("collection_exercise_sid"),
            ru_ref: text("ru_ref", "12346789012A"),
            ru_name: text("ru_name", "ESSENTIAL ENTERPRISE LTD."),
            trad_as: text("trad_as", "ESSENTIAL ENTERPRISE LTD."),
            ref_p_start_date: text("ref_p_start_date", "2016-05-01"),
            ref_p_end_date: text("ref_p_end_date", "2016-05-31"),
            return_by: text("return_by", "2016-06-12"),
            employment_date: text("employmentDate", "2016-06-10"),
            region_code: text("region_code", "GB-ENG"),
            language_code: text("language_code", "en"),
            case_id: generated("case_id"),
            case_ref: text("case_ref", "1000000000000001"),
            display_address: text("display_address", "68 Abingdon Road, Goathill, PE12 5EH"),
            country_code: text("country_code", "E"),
            started_at: text("started_at", &issued.format("%Y-%m-%d").to_string()),
            roles,
            // Quick launches always link back to the configured account service
            account_service_url: match source {
                ClaimSource::Query(_) => self.account_service_url.clone(),
                _ => text("account_service_url", &self.account_service_url),
            },
            sexual_identity: source.flag("sexual_identity", false),

            eq_id: schema.eq_id.clone(),
            form_type: schema.form_type.clone(),
            survey_url: schema.url.clone(),

            extra,
        }
    }
}

impl ClaimSet {
    /// Every string-valued claim, keyed by its serialized name.
    pub fn string_claims(&self) -> BTreeMap<String, String> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(claims)) => claims
                .into_iter()
                .filter_map(|(name, value)| match value {
                    serde_json::Value::String(text) => Some((name, text)),
                    _ => None,
                })
                .collect(),
            _ => BTreeMap::new(),
        }
    }

    /// `(name, value)` pairs for the editable form fields, in display order.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let claims = self.string_claims();
        FORM_FIELDS
            .iter()
            .map(|name| (*name, claims.get(*name).cloned().unwrap_or_default()))
            .collect()
    }
}
