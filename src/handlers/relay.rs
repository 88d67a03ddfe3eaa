// src/handlers/relay.rs
use crate::status::StatusClient;
use crate::utils::{extract_peer_ip, RequestError, StatusLimiter};
use actix_web::{web, HttpResponse};
use actix_web::HttpRequest;
use log::error;
use serde::Deserialize;

use crate::status::relay::RelayEnvelope;

#[derive(Debug, Deserialize)]
pub struct StatusRelayRequest {
    pub server: String,
}

#[derive(Debug, Deserialize)]
pub struct PlayerRelayRequest {
    pub username: String,
}

/// Forwards a status query to the upstream provider. Always answers with a
/// structured envelope; callers never see a transport error.
pub async fn server_status(
    req: HttpRequest,
    client: web::Data<StatusClient>,
    body: web::Json<StatusRelayRequest>,
    rate_limiter: web::Data<StatusLimiter>,
) -> Result<HttpResponse, RequestError> {
    let peer_ip = extract_peer_ip(&req)?;
    if !rate_limiter.0.check_key(&peer_ip).is_ok() {
        error!("Rate limit exceeded for status relay for ip: {}", peer_ip);
        return Err(RequestError::RateLimitExceeded);
    }

    let address = body.server.trim();
    if address.is_empty() {
        return Ok(HttpResponse::BadRequest().json(RelayEnvelope::err("Missing server address")));
    }

    let envelope = client.relay_status(address).await;
    Ok(HttpResponse::Ok().json(envelope))
}

pub async fn player_lookup(
    req: HttpRequest,
    client: web::Data<StatusClient>,
    body: web::Json<PlayerRelayRequest>,
    rate_limiter: web::Data<StatusLimiter>,
) -> Result<HttpResponse, RequestError> {
    let peer_ip = extract_peer_ip(&req)?;
    if !rate_limiter.0.check_key(&peer_ip).is_ok() {
        error!("Rate limit exceeded for player lookup for ip: {}", peer_ip);
        return Err(RequestError::RateLimitExceeded);
    }

    let username = body.username.trim();
    if username.is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": "Missing username",
        })));
    }

    let envelope = client.lookup_player(username).await;
    Ok(HttpResponse::Ok().json(envelope))
}
