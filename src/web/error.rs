// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the survey-launcher project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use std::io::Cursor;

use log::error;
use rocket::http::{ContentType, Status};
use rocket::response::{self, Responder};
use rocket::{Request, Response};
use thiserror::Error;

use crate::auth::TokenError;
use crate::surveys::SchemaError;

/// Failure of a launch request.
///
/// Rendered as a plain-text body: `400` for malformed input, `500` when the
/// schema or token pipeline fails.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Invalid Action")]
    InvalidAction,

    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Malformed request: {0}")]
    Malformed(String),

    #[error("{0}")]
    Schema(#[from] SchemaError),

    #[error("Token generation failed: {0}")]
    Token(#[from] TokenError),

    #[error("Failed to render launch page: {0}")]
    Render(String),

    #[error("Token worker failed: {0}")]
    Worker(String),
}

impl LaunchError {
    pub fn status(&self) -> Status {
        match self {
            LaunchError::InvalidAction
            | LaunchError::MissingParameter(_)
            | LaunchError::Malformed(_) => Status::BadRequest,
            _ => Status::InternalServerError,
        }
    }
}

impl<'r> Responder<'r, 'static> for LaunchError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        error!("{} {} failed: {}", req.method(), req.uri(), self);

        let body = self.to_string();
        Response::build()
            .status(status)
            .header(ContentType::Plain)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(LaunchError::InvalidAction.status(), Status::BadRequest);
        assert_eq!(
            LaunchError::MissingParameter("url").status(),
            Status::BadRequest
        );
        let not_found = LaunchError::from(SchemaError::NotFound {
            name: "x.json".to_string(),
        });
        assert_eq!(not_found.status(), Status::InternalServerError);
        assert_eq!(not_found.to_string(), "Survey not found: x.json");
        assert_eq!(
            LaunchError::Worker("cancelled".to_string()).status(),
            Status::InternalServerError
        );
    }
}
