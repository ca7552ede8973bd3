// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, logging and the search pipeline, then start the HTTP server

mod config;
mod errors;
mod handlers;
mod models;
mod services;

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::{anyhow, Context};
use config::{CategoryCatalog, Config};
use handlers::PlacesState;
use services::{start_cleanup_task, ContactDesk, GeocodeCache, SearchPipeline};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration (also loads .env)
    let config = Config::from_env();

    // 2. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", &config.log_level);
    }
    env_logger::init();

    config
        .validate()
        .map_err(|e| anyhow!("Configuration error: {}", e))?;

    log::info!("Starting sensory-places service...");
    log::info!("Environment: {}", config.environment);
    log::info!("Places provider: {}", config.provider);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 3. Geocode cache shared by all searches
    let cache = Arc::new(GeocodeCache::new(config.geocode_cache_ttl()));
    match config.geocode_cache_ttl() {
        Some(ttl) => {
            start_cleanup_task(cache.clone(), ttl);
            log::info!("Geocode cache TTL: {}s", ttl.as_secs());
        }
        None => log::info!("Geocode cache entries never expire"),
    }

    // 4. Pipeline and contact desk
    let places_state = web::Data::new(PlacesState {
        pipeline: SearchPipeline::from_config(&config, cache.clone())
            .context("Failed to build search pipeline")?,
        catalog: CategoryCatalog::for_provider(config.provider),
        default_radius_m: config.default_radius_m,
    });
    let contact_desk = web::Data::new(
        ContactDesk::from_config(&config).context("Failed to build contact relay")?,
    );
    let provider = web::Data::new(config.provider);
    let cache = web::Data::new(cache);

    // 5. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);

    HttpServer::new(move || {
        App::new()
            .app_data(places_state.clone())
            .app_data(contact_desk.clone())
            .app_data(provider.clone())
            .app_data(cache.clone())
            // Middleware
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            // Routes
            .configure(handlers::health_config)
            .configure(handlers::places_config)
            .configure(handlers::contact_config)
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {}", server_addr))?
    .run()
    .await
    .context("HTTP server terminated with an error")
}
