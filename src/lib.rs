// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the survey-launcher project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Survey launcher library
//!
//! Issues signed and encrypted launch tokens for questionnaire schemas and
//! hands them to a survey runner.
//!
//! - [`config`]: YAML configuration with environment and CLI overrides
//! - [`surveys`]: schema listing and resolution
//! - [`auth`]: key loading, claims assembly and token issuance
//! - [`web`]: the Rocket routes

pub mod auth;
pub mod config;
pub mod surveys;
pub mod web;
