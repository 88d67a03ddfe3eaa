// src/utils.rs
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{clock::DefaultClock, RateLimiter};
use std::fmt;
use std::net::IpAddr;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug)]
pub enum RequestError {
    MissingPeerIp,
    RateLimitExceeded,
    Unauthorized,
    Forbidden,
    NotFound,
    Validation(String),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPeerIp => write!(f, "Failed to extract client IP"),
            Self::RateLimitExceeded => write!(f, "Rate limit exceeded"),
            Self::Unauthorized => write!(f, "Missing or invalid session token"),
            Self::Forbidden => write!(f, "Insufficient permissions"),
            Self::NotFound => write!(f, "Resource not found"),
            Self::Validation(msg) => write!(f, "{}", msg),
        }
    }
}

impl ResponseError for RequestError {
    fn error_response(&self) -> HttpResponse {
        match self {
            Self::RateLimitExceeded => HttpResponse::TooManyRequests().body(self.to_string()),
            Self::Unauthorized => HttpResponse::Unauthorized().body(self.to_string()),
            Self::Forbidden => HttpResponse::Forbidden().body(self.to_string()),
            Self::NotFound => HttpResponse::NotFound().body(self.to_string()),
            _ => HttpResponse::BadRequest().body(self.to_string()),
        }
    }
}

pub type IpRateLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

// Distinct wrapper types so each limiter resolves to its own app_data slot.
pub struct ListLimiter(pub IpRateLimiter);
pub struct SubmitLimiter(pub IpRateLimiter);
pub struct StatusLimiter(pub IpRateLimiter);

pub fn extract_peer_ip(req: &HttpRequest) -> Result<IpAddr, RequestError> {
    // Prefer the first entry of X-Forwarded-For when a proxy is in front.
    if let Some(forwarded_for) = req.headers().get("X-Forwarded-For") {
        if let Ok(ip_str) = forwarded_for.to_str() {
            if let Some(first_ip) = ip_str.split(',').next() {
                if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                    return Ok(ip);
                }
            }
        }
    }

    match req.peer_addr() {
        Some(addr) => Ok(addr.ip()),
        None => Err(RequestError::MissingPeerIp),
    }
}

pub fn now_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn forwarded_header_wins_over_peer_addr() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "203.0.113.9, 10.0.0.1"))
            .peer_addr("127.0.0.1:4000".parse().unwrap())
            .to_http_request();
        let ip = extract_peer_ip(&req).unwrap();
        assert_eq!(ip, "203.0.113.9".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn falls_back_to_peer_addr() {
        let req = TestRequest::default()
            .peer_addr("192.0.2.7:5000".parse().unwrap())
            .to_http_request();
        let ip = extract_peer_ip(&req).unwrap();
        assert_eq!(ip, "192.0.2.7".parse::<IpAddr>().unwrap());
    }
}
