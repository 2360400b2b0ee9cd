// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the survey-launcher project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Multi-valued launch input
//!
//! Launch values arrive as urlencoded form bodies or query strings where a
//! key may repeat. `LaunchValues` keeps every value in arrival order; the
//! claims builder only ever reads the first one, except for `roles`.

use std::collections::BTreeMap;

/// Input values keyed by field name, each holding every supplied value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchValues(BTreeMap<String, Vec<String>>);

impl LaunchValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `application/x-www-form-urlencoded` body or query string.
    ///
    /// # Errors
    ///
    /// Returns the underlying decoding error for malformed input.
    pub fn from_urlencoded(input: &str) -> Result<Self, serde_urlencoded::de::Error> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(input)?;
        Ok(pairs.into_iter().collect())
    }

    /// Append a value for `key`.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_default().push(value.into());
    }

    /// First value supplied for `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Every value supplied for `key`, empty when absent.
    pub fn all(&self, key: &str) -> &[String] {
        self.0.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Re-encode as an urlencoded string, for request logging.
    pub fn to_urlencoded(&self) -> String {
        let pairs: Vec<(&str, &str)> = self
            .0
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |v| (key.as_str(), v.as_str())))
            .collect();
        serde_urlencoded::to_string(pairs).unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LaunchValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = LaunchValues::new();
        for (key, value) in iter {
            values.push(key, value);
        }
        values
    }
}
