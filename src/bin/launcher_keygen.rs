// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the survey-launcher project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::pkcs8::EncodePublicKey;
use rsa::{RsaPrivateKey, RsaPublicKey};

use survey_launcher::auth::keys::key_id;

/// Generate the signing and encryption key pairs used by the launcher and a
/// local survey runner
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Directory receiving the four PEM files
    #[clap(long, default_value = "./jwt-test-keys")]
    out_dir: PathBuf,

    /// RSA key length in bits
    #[clap(long, default_value = "2048")]
    length: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create output directory {:?}", args.out_dir))?;

    println!("Generating RSA key pairs with {} bits...", args.length);

    let signing_kid = write_pair(
        &args.out_dir,
        "sdc-user-authentication-signing-rrm",
        args.length,
    )?;
    let encryption_kid = write_pair(
        &args.out_dir,
        "sdc-user-authentication-encryption-sr",
        args.length,
    )?;

    println!();
    println!("Signing kid:    {}", signing_kid);
    println!("Encryption kid: {}", encryption_kid);
    println!();
    println!("The launcher signs with the signing private key and encrypts with the");
    println!("encryption public key; give the other two files to the survey runner.");

    Ok(())
}

/// Write `<prefix>-private-key.pem` (PKCS#1) and `<prefix>-public-key.pem`
/// (PKIX), returning the kid the launcher derives for this pair.
fn write_pair(dir: &Path, prefix: &str, length: usize) -> Result<String> {
    let mut rng = rsa::rand_core::OsRng;

    let private_key =
        RsaPrivateKey::new(&mut rng, length).context("Failed to generate RSA private key")?;
    let public_key = RsaPublicKey::from(&private_key);

    let private_pem = private_key
        .to_pkcs1_pem(LineEnding::LF)
        .context("Failed to encode private key to PEM")?;
    let public_pem = public_key
        .to_public_key_pem(LineEnding::LF)
        .context("Failed to encode public key to PEM")?;

    let private_path = dir.join(format!("{}-private-key.pem", prefix));
    let public_path = dir.join(format!("{}-public-key.pem", prefix));
    write_file(&private_path, private_pem.as_bytes())?;
    write_file(&public_path, public_pem.as_bytes())?;

    println!("Private key written to: {:?}", private_path);
    println!("Public key written to: {:?}", public_path);

    // Both kids hash the PKIX public key PEM exactly as written here
    Ok(key_id(public_pem.as_bytes()))
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create key file at {:?}", path))?;
    file.write_all(contents)
        .with_context(|| format!("Failed to write key file at {:?}", path))
}
