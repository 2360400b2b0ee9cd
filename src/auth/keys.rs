// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the survey-launcher project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Token Key Loading
//!
//! This module loads the two RSA keys a launch token needs:
//!
//! * the launcher's **signing** private key (PKCS#1 PEM, PKCS#8 accepted),
//! * the survey runner's **encryption** public key (PKIX PEM).
//!
//! Each key is labelled with a key identifier (`kid`) that the runner uses
//! to pick the matching key on its side:
//!
//! * encryption kid: hex SHA-1 of the PEM file exactly as read,
//! * signing kid: hex SHA-1 of the PKIX `PUBLIC KEY` PEM re-encoding of the
//!   public half of the signing key.
//!
//! Keys are read from disk on every call; nothing is cached.
//!
//! ## Example
//!
//! ```rust,no_run
//! use survey_launcher::auth::keys::KeyMaterial;
//! use survey_launcher::config::KeysConfig;
//!
//! let keys = KeyMaterial::load(&KeysConfig::default()).unwrap();
//! println!("signing kid: {}", keys.signing.kid);
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use rsa::pkcs1::{DecodeRsaPrivateKey, LineEnding};
use rsa::pkcs8::der::pem;
use rsa::pkcs8::spki::SubjectPublicKeyInfoRef;
use rsa::pkcs8::{DecodePrivateKey, EncodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha1::{Digest, Sha1};
use thiserror::Error;

use crate::config::KeysConfig;

/// Role carried by errors about the signing key.
pub const SIGNING_ROLE: &str = "signing";
/// Role carried by errors about the encryption key.
pub const ENCRYPTION_ROLE: &str = "encryption";

/// Errors raised while loading key material.
///
/// The variant names the step that failed; the caller aborts the request.
#[derive(Debug, Error)]
pub enum KeyLoadError {
    #[error("read: Failed to read {role} key from file: {}", path.display())]
    Read {
        role: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("decode: Failed to decode {role} key PEM: {reason}")]
    Decode { role: &'static str, reason: String },

    #[error("parse: Failed to parse {role} key from PEM: {reason}")]
    Parse { role: &'static str, reason: String },

    #[error("cast: Failed to cast {role} key to an RSA key")]
    Cast { role: &'static str },

    #[error("marshal: Failed to marshal public key: {reason}")]
    Marshal { reason: String },
}

impl KeyLoadError {
    /// Which key failed: `"signing"` or `"encryption"`.
    pub fn role(&self) -> &'static str {
        match self {
            KeyLoadError::Read { role, .. }
            | KeyLoadError::Decode { role, .. }
            | KeyLoadError::Parse { role, .. }
            | KeyLoadError::Cast { role } => *role,
            // Only the signing key is re-encoded
            KeyLoadError::Marshal { .. } => SIGNING_ROLE,
        }
    }
}

/// RSA private key used to sign launch tokens, with its key identifier.
#[derive(Clone)]
pub struct SigningKey {
    pub key: RsaPrivateKey,
    pub kid: String,
}

/// RSA public key used to encrypt launch tokens, with its key identifier.
#[derive(Clone)]
pub struct EncryptionKey {
    pub key: RsaPublicKey,
    pub kid: String,
}

// Key material stays out of logs.
impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("key", &"<RsaPrivateKey>")
            .field("kid", &self.kid)
            .finish()
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("key", &"<RsaPublicKey>")
            .field("kid", &self.kid)
            .finish()
    }
}

/// Both keys needed to issue one token.
#[derive(Debug, Clone)]
pub struct KeyMaterial {
    pub signing: SigningKey,
    pub encryption: EncryptionKey,
}

impl KeyMaterial {
    /// Load both keys from the paths in `config`.
    ///
    /// # Errors
    ///
    /// Returns the first [`KeyLoadError`] encountered, signing key first.
    pub fn load(config: &KeysConfig) -> Result<Self, KeyLoadError> {
        Ok(Self {
            signing: load_signing_key(&config.signing_key_path)?,
            encryption: load_encryption_key(&config.encryption_key_path)?,
        })
    }
}

/// Lowercase hex SHA-1 of `bytes`.
pub fn key_id(bytes: &[u8]) -> String {
    hex::encode(Sha1::digest(bytes))
}

/// Load the signing key from a PEM file.
///
/// # Errors
///
/// * [`KeyLoadError::Read`] if the file cannot be read
/// * [`KeyLoadError::Decode`] if the file holds no PEM block
/// * [`KeyLoadError::Parse`] if the block is not an RSA private key
/// * [`KeyLoadError::Marshal`] if the public half cannot be re-encoded
pub fn load_signing_key(path: impl AsRef<Path>) -> Result<SigningKey, KeyLoadError> {
    let data = read_key_file(SIGNING_ROLE, path.as_ref())?;
    signing_key_from_pem(&data)
}

/// Build a [`SigningKey`] from PEM bytes already in memory.
pub fn signing_key_from_pem(data: &[u8]) -> Result<SigningKey, KeyLoadError> {
    let (label, der) = decode_pem(SIGNING_ROLE, data)?;

    let key = match label.as_str() {
        "PRIVATE KEY" => RsaPrivateKey::from_pkcs8_der(&der).map_err(|e| KeyLoadError::Parse {
            role: SIGNING_ROLE,
            reason: e.to_string(),
        })?,
        _ => RsaPrivateKey::from_pkcs1_der(&der).map_err(|e| KeyLoadError::Parse {
            role: SIGNING_ROLE,
            reason: e.to_string(),
        })?,
    };

    let public_pem = RsaPublicKey::from(&key)
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| KeyLoadError::Marshal {
            reason: e.to_string(),
        })?;
    let kid = key_id(public_pem.as_bytes());
    debug!("Loaded signing key with kid {}", kid);

    Ok(SigningKey { key, kid })
}

/// Load the encryption key from a PEM file.
///
/// # Errors
///
/// * [`KeyLoadError::Read`] if the file cannot be read
/// * [`KeyLoadError::Decode`] if the file holds no PEM block
/// * [`KeyLoadError::Parse`] if the block is not a SubjectPublicKeyInfo
/// * [`KeyLoadError::Cast`] if the SubjectPublicKeyInfo holds a non-RSA key
pub fn load_encryption_key(path: impl AsRef<Path>) -> Result<EncryptionKey, KeyLoadError> {
    let data = read_key_file(ENCRYPTION_ROLE, path.as_ref())?;
    encryption_key_from_pem(&data)
}

/// Build an [`EncryptionKey`] from PEM bytes already in memory.
pub fn encryption_key_from_pem(data: &[u8]) -> Result<EncryptionKey, KeyLoadError> {
    let (_label, der) = decode_pem(ENCRYPTION_ROLE, data)?;

    let spki =
        SubjectPublicKeyInfoRef::try_from(der.as_slice()).map_err(|e| KeyLoadError::Parse {
            role: ENCRYPTION_ROLE,
            reason: e.to_string(),
        })?;

    if spki.algorithm.oid != rsa::pkcs1::ALGORITHM_OID {
        return Err(KeyLoadError::Cast { role: ENCRYPTION_ROLE });
    }

    let key = RsaPublicKey::try_from(spki).map_err(|e| KeyLoadError::Parse {
        role: ENCRYPTION_ROLE,
        reason: e.to_string(),
    })?;

    let kid = key_id(data);
    debug!("Loaded encryption key with kid {}", kid);

    Ok(EncryptionKey { key, kid })
}

fn read_key_file(role: &'static str, path: &Path) -> Result<Vec<u8>, KeyLoadError> {
    fs::read(path).map_err(|source| KeyLoadError::Read {
        role,
        path: path.to_path_buf(),
        source,
    })
}

fn decode_pem(role: &'static str, data: &[u8]) -> Result<(String, Vec<u8>), KeyLoadError> {
    pem::decode_vec(data)
        .map(|(label, der)| (label.to_string(), der))
        .map_err(|e| KeyLoadError::Decode {
            role,
            reason: e.to_string(),
        })
}
