// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the survey-launcher project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use rocket::request::{FromRequest, Outcome};
use rocket::Request;

use crate::auth::LaunchValues;

/// Request guard exposing the undecoded query string of a request.
///
/// Quick-launch accepts arbitrary, possibly repeated, claim names in its
/// query, which Rocket's typed query parameters cannot express. Requests
/// without a query yield an empty string.
///
/// ```
/// use rocket::get;
/// use survey_launcher::web::request_guard::RawQueryString;
///
/// #[get("/echo")]
/// fn echo(raw_query: RawQueryString) -> String {
///     raw_query.as_str().to_string()
/// }
/// # fn main() {}
/// ```
#[derive(Debug, Clone, Default)]
pub struct RawQueryString(pub String);

impl RawQueryString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the query into multi-valued launch input.
    pub fn values(&self) -> Result<LaunchValues, serde_urlencoded::de::Error> {
        LaunchValues::from_urlencoded(&self.0)
    }
}

impl AsRef<str> for RawQueryString {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for RawQueryString {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let query = req
            .uri()
            .query()
            .map(|query| query.to_string())
            .unwrap_or_default();
        Outcome::Success(RawQueryString(query))
    }
}
