// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the survey-launcher project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! HTTP surface of the launcher
//!
//! Thin Rocket layer over [`crate::surveys`] and [`crate::auth`]: handlers
//! parse input, resolve the schema, issue a token and redirect the browser to
//! the survey runner.

pub mod error;
pub mod handlers;
pub mod page;
pub mod request_guard;
pub mod server;

pub use error::LaunchError;
pub use server::{build_rocket, figment_from_config};
