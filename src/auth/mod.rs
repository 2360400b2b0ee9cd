// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the survey-launcher project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Launch token pipeline
//!
//! - [`keys`]: loading the signing and encryption keys
//! - [`values`]: multi-valued form and query input
//! - [`claims`]: turning input into a [`ClaimSet`]
//! - [`issuer`]: signing and encrypting a [`ClaimSet`] into a token

pub mod claims;
pub mod issuer;
pub mod keys;
pub mod values;

pub use claims::{ClaimSet, ClaimSource, ClaimValue, ClaimsBuilder};
pub use issuer::{issue, open, JweHeader, TokenError, TokenService};
pub use keys::{EncryptionKey, KeyLoadError, KeyMaterial, SigningKey};
pub use values::LaunchValues;
