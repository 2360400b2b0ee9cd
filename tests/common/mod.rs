// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the survey-launcher project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Shared fixtures for integration tests: logger, key files and configs.

#![allow(dead_code)]

use std::fs;
use std::sync::Once;

use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::pkcs8::EncodePublicKey;
use rsa::{RsaPrivateKey, RsaPublicKey};
use survey_launcher::config::Config;
use tempfile::TempDir;

static INIT: Once = Once::new();

/// Setup logger for tests
pub fn setup() {
    INIT.call_once(|| {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .init();
    });
}

/// A signing and an encryption key pair written to a temporary directory.
pub struct TestKeys {
    pub dir: TempDir,
    pub signing_private: RsaPrivateKey,
    pub encryption_private: RsaPrivateKey,
}

impl TestKeys {
    pub fn generate() -> Self {
        let mut rng = rsa::rand_core::OsRng;
        let signing_private =
            RsaPrivateKey::new(&mut rng, 2048).expect("Failed to generate signing key");
        let encryption_private =
            RsaPrivateKey::new(&mut rng, 2048).expect("Failed to generate encryption key");

        let dir = tempfile::tempdir().expect("Failed to create key directory");
        fs::write(
            dir.path().join("signing.pem"),
            signing_private.to_pkcs1_pem(LineEnding::LF).unwrap().as_bytes(),
        )
        .unwrap();
        fs::write(
            dir.path().join("encryption.pem"),
            RsaPublicKey::from(&encryption_private)
                .to_public_key_pem(LineEnding::LF)
                .unwrap(),
        )
        .unwrap();

        Self {
            dir,
            signing_private,
            encryption_private,
        }
    }

    pub fn verification_key(&self) -> RsaPublicKey {
        RsaPublicKey::from(&self.signing_private)
    }

    /// Default configuration pointing at these keys and at `runner_url`.
    pub fn config(&self, runner_url: &str) -> Config {
        let mut config = Config::default();
        config.services.survey_runner_url = runner_url.to_string();
        config.keys.signing_key_path = self.dir.path().join("signing.pem");
        config.keys.encryption_key_path = self.dir.path().join("encryption.pem");
        config
    }
}
