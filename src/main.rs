// src/main.rs
mod config;
mod handlers;
mod models;
mod session;
mod status;
mod storage;
mod utils;

use crate::config::Config;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use governor::RateLimiter;
use log::info;
use models::profile::UserRole;
use session::SessionStore;
use status::{StatusClient, StatusRegistry};
use storage::memory::DirectoryStorage;
use utils::{ListLimiter, StatusLimiter, SubmitLimiter};

fn bootstrap_admin(storage: &DirectoryStorage) {
    let (Ok(username), Ok(password)) = (
        std::env::var("ADMIN_USERNAME"),
        std::env::var("ADMIN_PASSWORD"),
    ) else {
        return;
    };
    match handlers::auth::create_account(storage, &username, &password, None, UserRole::Admin) {
        Ok(profile) => info!("Bootstrapped admin account {}", profile.username),
        Err(e) => log::error!("Failed to bootstrap admin account: {}", e),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger only once at the start
    env_logger::init_from_env(Env::default().default_filter_or("debug"));

    dotenv::dotenv().ok();

    // Load configuration
    let config = Config::from_env();

    // Get bind address and port from environment or use defaults
    let bind_address = std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind = format!("{}:{}", bind_address, port);

    let storage = web::Data::new(DirectoryStorage::new(config.clone()));
    bootstrap_admin(&storage);

    let sessions = web::Data::new(SessionStore::new(config.session_ttl_secs));
    let status_client = web::Data::new(StatusClient::new(&config.status_provider_url));
    let registry = web::Data::new(StatusRegistry::new(
        config.status_jitter_ms,
        status_client.fetcher(),
    ));

    // Set up rate limiters using config
    let list_rate_limiter = web::Data::new(ListLimiter(RateLimiter::keyed(config.list_quota())));
    let submit_rate_limiter =
        web::Data::new(SubmitLimiter(RateLimiter::keyed(config.submit_quota())));
    let status_rate_limiter =
        web::Data::new(StatusLimiter(RateLimiter::keyed(config.status_quota())));

    info!("Starting server on {}", bind);
    HttpServer::new(move || {
        App::new()
            .app_data(storage.clone())
            .app_data(sessions.clone())
            .app_data(status_client.clone())
            .app_data(registry.clone())
            .app_data(list_rate_limiter.clone())
            .app_data(submit_rate_limiter.clone())
            .app_data(status_rate_limiter.clone())
            .configure(handlers::routes)
    })
    .bind(&bind)?
    .run()
    .await
}
