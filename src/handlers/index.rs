// src/handlers/index.rs
use actix_web::HttpResponse;
use crate::utils::RequestError;

pub async fn health() -> Result<HttpResponse, RequestError> {
    Ok(HttpResponse::Ok().content_type("application/json").body("{\"status\": \"ok\"}"))
}
