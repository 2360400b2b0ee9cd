// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the survey-launcher project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Rocket server builder and configuration

use std::sync::Arc;

use log::debug;
use rocket::figment::Figment;
use rocket::{routes, Build, Rocket};

use super::handlers::*;
use crate::auth::TokenService;
use crate::config::Config;
use crate::surveys::{SchemaError, SchemaResolver};

/// Rocket configuration for the launcher's bind address, port and name.
pub fn figment_from_config(config: &Config) -> Figment {
    rocket::Config::figment()
        .merge(("ident", config.launcher.name.clone()))
        .merge(("address", config.launcher.address.clone()))
        .merge(("port", config.launcher.port))
}

/// Build a configured Rocket server instance
///
/// Mounts every launcher route and manages the shared configuration, the
/// schema resolver and the token service.
///
/// ### Errors
///
/// Fails only if the resolver's HTTP client cannot be created.
///
/// ### Example
///
/// ```no_run
/// use std::sync::Arc;
/// use survey_launcher::config::Config;
/// use survey_launcher::web::server::{build_rocket, figment_from_config};
///
/// #[rocket::main]
/// async fn main() {
///     let config = Arc::new(Config::default());
///     let rocket = build_rocket(figment_from_config(&config), config).unwrap();
///     let _ = rocket.launch().await;
/// }
/// ```
pub fn build_rocket(figment: Figment, config: Arc<Config>) -> Result<Rocket<Build>, SchemaError> {
    let resolver = SchemaResolver::new(&config.services)?;
    let tokens = TokenService::new(config.clone());
    debug!(
        "Launcher routes use survey runner {}",
        config.services.survey_runner_url
    );

    Ok(rocket::custom(figment)
        .mount(
            "/",
            routes![launch_page, launch, quick_launch, list_schemas, schema_metadata],
        )
        .manage(resolver)
        .manage(tokens)
        .manage(config))
}
