// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the survey-launcher project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Launch token issuance
//!
//! A launch token is a JWS nested inside a JWE:
//!
//! 1. the [`ClaimSet`] is signed with RS256 using the launcher's signing key,
//!    header `{alg: RS256, typ: JWT, kid}`;
//! 2. the compact JWS is encrypted for the survey runner: a fresh 256-bit
//!    content key is wrapped with RSA-OAEP (SHA-1) under the runner's public
//!    key, and the JWS is sealed with AES-256-GCM using a fresh 96-bit IV and
//!    the encoded protected header as additional authenticated data.
//!
//! The result is the compact serialization
//! `header.encrypted_key.iv.ciphertext.tag`, every segment base64url without
//! padding.
//!
//! [`open`] performs the inverse and is what the survey runner would do on
//! receipt.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use survey_launcher::auth::{ClaimSource, TokenService};
//! use survey_launcher::config::Config;
//! use survey_launcher::surveys::SchemaDescriptor;
//!
//! let service = TokenService::new(Arc::new(Config::default()));
//! let schema = SchemaDescriptor::from_filename("1_0005.json");
//! let token = service.issue_for(ClaimSource::Defaults, &schema).unwrap();
//! assert_eq!(token.split('.').count(), 5);
//! ```

use std::sync::Arc;

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::{debug, info};
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::pkcs8::EncodePublicKey;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use thiserror::Error;

use super::claims::{ClaimSet, ClaimSource, ClaimsBuilder};
use super::keys::{KeyLoadError, KeyMaterial, ENCRYPTION_ROLE};
use crate::config::Config;
use crate::surveys::SchemaDescriptor;

/// Key management algorithm of the outer JWE.
pub const KEY_ALGORITHM: &str = "RSA-OAEP";
/// Content encryption algorithm of the outer JWE.
pub const CONTENT_ENCRYPTION: &str = "A256GCM";

const IV_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Errors raised while issuing or opening a launch token.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Failed to load signing key: {source}")]
    SigningKey {
        #[source]
        source: KeyLoadError,
    },

    #[error("Failed to load encryption key: {source}")]
    EncryptionKey {
        #[source]
        source: KeyLoadError,
    },

    #[error("Failed to create signer: {reason}")]
    Signer { reason: String },

    #[error("Failed to create encrypter: {reason}")]
    Encryptor { reason: String },

    #[error("Failed to sign claims: {reason}")]
    Signing { reason: String },

    #[error("Failed to encrypt token: {reason}")]
    Encryption { reason: String },

    #[error("Failed to decrypt token: {reason}")]
    Decryption { reason: String },

    #[error("Failed to verify token signature: {reason}")]
    Verification { reason: String },
}

/// Protected header of the outer JWE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JweHeader {
    pub alg: String,
    pub enc: String,
    pub kid: String,
    pub typ: String,
    pub cty: String,
}

impl JweHeader {
    fn new(kid: &str) -> Self {
        Self {
            alg: KEY_ALGORITHM.to_string(),
            enc: CONTENT_ENCRYPTION.to_string(),
            kid: kid.to_string(),
            typ: "JWT".to_string(),
            cty: "JWT".to_string(),
        }
    }

    /// Decode the protected header of a compact JWE without decrypting it.
    pub fn from_token(token: &str) -> Result<Self, TokenError> {
        let encoded = token.split('.').next().unwrap_or_default();
        let bytes = decode_segment("protected header", encoded)?;
        serde_json::from_slice(&bytes).map_err(|e| TokenError::Decryption {
            reason: format!("invalid protected header: {}", e),
        })
    }
}

/// Sign `claims` and encrypt the result into a compact JWE.
///
/// # Errors
///
/// Each step that can fail maps to its own [`TokenError`] variant; no partial
/// token is ever returned.
pub fn issue(claims: &ClaimSet, keys: &KeyMaterial) -> Result<String, TokenError> {
    let jws = sign(claims, keys)?;
    let token = encrypt(jws.as_bytes(), &keys.encryption.key, &keys.encryption.kid)?;
    info!("Issued launch token: {}", token);
    Ok(token)
}

fn sign(claims: &ClaimSet, keys: &KeyMaterial) -> Result<String, TokenError> {
    let pem = keys
        .signing
        .key
        .to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| TokenError::Signer {
            reason: e.to_string(),
        })?;
    let encoding_key =
        EncodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| TokenError::Signer {
            reason: e.to_string(),
        })?;

    let mut header = Header::new(Algorithm::RS256);
    header.typ = Some("JWT".to_string());
    header.kid = Some(keys.signing.kid.clone());

    jsonwebtoken::encode(&header, claims, &encoding_key).map_err(|e| TokenError::Signing {
        reason: e.to_string(),
    })
}

fn encrypt(plaintext: &[u8], key: &RsaPublicKey, kid: &str) -> Result<String, TokenError> {
    let header = serde_json::to_vec(&JweHeader::new(kid)).map_err(|e| TokenError::Encryptor {
        reason: e.to_string(),
    })?;
    let encoded_header = URL_SAFE_NO_PAD.encode(header);

    let cek = Aes256Gcm::generate_key(&mut OsRng);
    let encrypted_key = key
        .encrypt(&mut rsa::rand_core::OsRng, Oaep::new::<Sha1>(), cek.as_slice())
        .map_err(|e| TokenError::Encryptor {
            reason: e.to_string(),
        })?;

    let cipher = Aes256Gcm::new(&cek);
    let iv = Aes256Gcm::generate_nonce(&mut OsRng);
    let mut ciphertext = cipher
        .encrypt(
            &iv,
            Payload {
                msg: plaintext,
                aad: encoded_header.as_bytes(),
            },
        )
        .map_err(|e| TokenError::Encryption {
            reason: e.to_string(),
        })?;

    // aes-gcm appends the tag to the ciphertext
    let tag = ciphertext.split_off(ciphertext.len() - TAG_LEN);

    Ok(format!(
        "{}.{}.{}.{}.{}",
        encoded_header,
        URL_SAFE_NO_PAD.encode(encrypted_key),
        URL_SAFE_NO_PAD.encode(iv),
        URL_SAFE_NO_PAD.encode(ciphertext),
        URL_SAFE_NO_PAD.encode(tag),
    ))
}

/// Decrypt a compact JWE, returning the nested compact JWS.
pub fn decrypt(token: &str, decryption_key: &RsaPrivateKey) -> Result<String, TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    let [encoded_header, encrypted_key, iv, ciphertext, tag] = segments[..] else {
        return Err(TokenError::Decryption {
            reason: format!("expected 5 segments, found {}", segments.len()),
        });
    };

    let header = JweHeader::from_token(token)?;
    if header.alg != KEY_ALGORITHM || header.enc != CONTENT_ENCRYPTION {
        return Err(TokenError::Decryption {
            reason: format!("unsupported algorithms {}/{}", header.alg, header.enc),
        });
    }

    let encrypted_key = decode_segment("encrypted key", encrypted_key)?;
    let iv = decode_segment("iv", iv)?;
    let mut sealed = decode_segment("ciphertext", ciphertext)?;
    sealed.extend(decode_segment("tag", tag)?);

    if iv.len() != IV_LEN {
        return Err(TokenError::Decryption {
            reason: format!("iv must be {} bytes, found {}", IV_LEN, iv.len()),
        });
    }

    let cek = decryption_key
        .decrypt(Oaep::new::<Sha1>(), &encrypted_key)
        .map_err(|e| TokenError::Decryption {
            reason: e.to_string(),
        })?;
    let cipher = Aes256Gcm::new_from_slice(&cek).map_err(|e| TokenError::Decryption {
        reason: e.to_string(),
    })?;

    let plaintext = cipher
        .decrypt(
            Nonce::from_slice(&iv),
            Payload {
                msg: &sealed,
                aad: encoded_header.as_bytes(),
            },
        )
        .map_err(|e| TokenError::Decryption {
            reason: e.to_string(),
        })?;

    String::from_utf8(plaintext).map_err(|e| TokenError::Decryption {
        reason: e.to_string(),
    })
}

/// Decrypt and verify a launch token, recovering its claims.
///
/// `decryption_key` is the private half of the encryption key,
/// `verification_key` the public half of the signing key.
pub fn open(
    token: &str,
    decryption_key: &RsaPrivateKey,
    verification_key: &RsaPublicKey,
) -> Result<ClaimSet, TokenError> {
    let jws = decrypt(token, decryption_key)?;

    let pem = verification_key
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| TokenError::Verification {
            reason: e.to_string(),
        })?;
    let decoding_key =
        DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| TokenError::Verification {
            reason: e.to_string(),
        })?;

    let validation = Validation::new(Algorithm::RS256);
    let data = jsonwebtoken::decode::<ClaimSet>(&jws, &decoding_key, &validation).map_err(|e| {
        TokenError::Verification {
            reason: e.to_string(),
        }
    })?;

    Ok(data.claims)
}

fn decode_segment(name: &str, segment: &str) -> Result<Vec<u8>, TokenError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| TokenError::Decryption {
            reason: format!("invalid {} encoding: {}", name, e),
        })
}

/// Loads keys, builds claims and issues a token for one launch.
#[derive(Debug, Clone)]
pub struct TokenService {
    config: Arc<Config>,
    claims: ClaimsBuilder,
}

impl TokenService {
    pub fn new(config: Arc<Config>) -> Self {
        let claims = ClaimsBuilder::new(&config.launcher);
        Self { config, claims }
    }

    /// Read both keys from disk. Called for every token.
    pub fn load_keys(&self) -> Result<KeyMaterial, TokenError> {
        KeyMaterial::load(&self.config.keys).map_err(|source| match source.role() {
            ENCRYPTION_ROLE => TokenError::EncryptionKey { source },
            _ => TokenError::SigningKey { source },
        })
    }

    /// Build the claims for `schema` from `source` without issuing.
    pub fn claims_for(&self, source: ClaimSource<'_>, schema: &SchemaDescriptor) -> ClaimSet {
        self.claims.build(source, schema)
    }

    /// Build claims for `schema` from `source` and issue a token.
    pub fn issue_for(
        &self,
        source: ClaimSource<'_>,
        schema: &SchemaDescriptor,
    ) -> Result<String, TokenError> {
        let keys = self.load_keys()?;
        let claims = self.claims.build(source, schema);
        debug!(
            "Issuing token for eq_id={} form_type={} tx_id={}",
            claims.eq_id, claims.form_type, claims.tx_id
        );
        issue(&claims, &keys)
    }
}
