// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config and clients, then start the HTTP server

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use dotenv::dotenv;
use std::sync::Arc;
use storymap_places::config::Config;
use storymap_places::handlers;
use storymap_places::services::{
    CatalogClient, ControllerSettings, GooglePlacesClient, SessionRegistry,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            config.log_level.as_str()
        } else {
            "info,actix_web=info"
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    if let Err(e) = config.validate() {
        log::error!("Configuration error: {}", e);
        anyhow::bail!("invalid configuration: {}", e);
    }

    log::info!("Starting storymap-places service...");
    log::info!("Environment: {}", config.environment);
    log::info!("Catalog backend: {}", config.api_base_url);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Build the shared clients
    let catalog = CatalogClient::from_config(&config).context("building catalog client")?;
    let provider =
        GooglePlacesClient::from_config(&config).context("building place provider client")?;
    log::info!(
        "Provider quota guard: {} requests/second",
        config.provider_requests_per_second
    );

    let registry = web::Data::new(SessionRegistry::new(
        Arc::new(catalog),
        Arc::new(provider),
        ControllerSettings::from_config(&config),
    ));

    // 5. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);

    HttpServer::new(move || {
        App::new()
            .app_data(registry.clone())
            // Middleware
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            // Routes
            .configure(handlers::health_config)
            .configure(handlers::sessions_config)
    })
    .bind(&server_addr)
    .with_context(|| format!("binding {}", server_addr))?
    .run()
    .await?;

    Ok(())
}
