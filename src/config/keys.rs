// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the survey-launcher project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Token key configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Paths to the PEM files used for launch tokens.
///
/// Keys can be generated with the `launcher_keygen` binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeysConfig {
    /// RSA private key (PKCS#1 PEM) used to sign tokens.
    #[serde(default = "default_signing_key_path")]
    pub signing_key_path: PathBuf,

    /// RSA public key (PKIX PEM) of the survey runner, used to encrypt tokens.
    #[serde(default = "default_encryption_key_path")]
    pub encryption_key_path: PathBuf,
}

fn default_signing_key_path() -> PathBuf {
    PathBuf::from("jwt-test-keys/sdc-user-authentication-signing-rrm-private-key.pem")
}

fn default_encryption_key_path() -> PathBuf {
    PathBuf::from("jwt-test-keys/sdc-user-authentication-encryption-sr-public-key.pem")
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            signing_key_path: default_signing_key_path(),
            encryption_key_path: default_encryption_key_path(),
        }
    }
}
