// src/handlers/servers.rs
use crate::models::profile::{Profile, UserRole};
use crate::models::server::{
    paginate, sort_servers, PaginatedResult, ReviewStatus, Server, ServerEdit, ServerFilter,
    ServerForm, ServerType, SortOrder,
};
use crate::session::{current_user, optional_user, SessionStore};
use crate::status::{display, Badge, StatusKey, StatusRegistry, StatusResult};
use crate::storage::memory::DirectoryStorage;
use crate::utils::{extract_peer_ip, now_secs, ListLimiter, RequestError, StatusLimiter, SubmitLimiter};
use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub version: Option<String>,
    pub server_type: Option<ServerType>,
    pub is_pure_public: Option<bool>,
    pub requires_whitelist: Option<bool>,
    pub requires_genuine: Option<bool>,
    pub search: Option<String>,
    pub sort: Option<SortOrder>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Serialize)]
pub struct ServerSummary {
    #[serde(flatten)]
    pub server: Server,
    pub players_display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<Badge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live: Option<StatusResult>,
    pub like_count: usize,
    pub comment_count: usize,
}

/// Folds the live-status overlay and engagement counts into one card.
pub fn summarize(
    storage: &DirectoryStorage,
    registry: &StatusRegistry,
    server: Server,
) -> ServerSummary {
    let live = registry.result_for(&server.id);
    let badge = registry.badge_for(&server.id);
    ServerSummary {
        players_display: display::players_display(&server, live.as_ref()),
        badge,
        like_count: storage.like_count(&server.id),
        comment_count: storage.comment_count(&server.id),
        live,
        server,
    }
}

pub async fn list_servers(
    req: HttpRequest,
    storage: web::Data<DirectoryStorage>,
    registry: web::Data<StatusRegistry>,
    query: web::Query<ListQuery>,
    rate_limiter: web::Data<ListLimiter>,
) -> Result<HttpResponse, RequestError> {
    let peer_ip = extract_peer_ip(&req)?;
    if !rate_limiter.0.check_key(&peer_ip).is_ok() {
        error!("Rate limit exceeded for server list for ip: {}", peer_ip);
        return Err(RequestError::RateLimitExceeded);
    }

    let query = query.into_inner();
    let filter = ServerFilter {
        version: query.version,
        server_type: query.server_type,
        is_pure_public: query.is_pure_public,
        requires_whitelist: query.requires_whitelist,
        requires_genuine: query.requires_genuine,
        search: query.search,
    };

    let mut servers = storage.servers_with_status(ReviewStatus::Approved);
    servers.retain(|server| filter.matches(server));
    sort_servers(&mut servers, query.sort.unwrap_or(SortOrder::Latest));

    debug!("Building server list response with {} servers", servers.len());

    let page = query.page.unwrap_or(1);
    let page_size = query.page_size.unwrap_or(12);
    let result = paginate(servers, page, page_size);
    let result = PaginatedResult {
        data: result
            .data
            .into_iter()
            .map(|server| summarize(&storage, &registry, server))
            .collect::<Vec<_>>(),
        total: result.total,
        page: result.page,
        page_size: result.page_size,
        total_pages: result.total_pages,
    };

    Ok(HttpResponse::Ok().json(result))
}

#[derive(Serialize)]
struct ServerDetailResponse {
    #[serde(flatten)]
    server: Server,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<Profile>,
    players_display: String,
    version_display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    motd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    favicon_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    badge: Option<Badge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    live: Option<StatusResult>,
    like_count: usize,
    favorite_count: usize,
    comment_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_liked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_favorited: Option<bool>,
}

pub async fn get_server(
    req: HttpRequest,
    storage: web::Data<DirectoryStorage>,
    sessions: web::Data<SessionStore>,
    registry: web::Data<StatusRegistry>,
    path: web::Path<String>,
) -> Result<HttpResponse, RequestError> {
    let id = path.into_inner();
    let server = storage.server(&id).ok_or(RequestError::NotFound)?;
    let viewer = optional_user(&req, &sessions, &storage);

    // Unreviewed listings are only visible to their owner and admins.
    if server.status != ReviewStatus::Approved {
        let can_see = viewer
            .as_ref()
            .map(|p| p.id == server.owner_id || p.role == UserRole::Admin)
            .unwrap_or(false);
        if !can_see {
            return Err(RequestError::NotFound);
        }
    } else {
        storage.increment_views(&id);
    }

    let live = registry.result_for(&id);
    let badge = registry.badge_for(&id);
    let response = ServerDetailResponse {
        owner: storage.profile(&server.owner_id),
        players_display: display::players_display(&server, live.as_ref()),
        version_display: display::version_display(&server, live.as_ref()),
        motd: display::motd_display(live.as_ref()),
        favicon_url: display::favicon_display(live.as_ref()),
        badge,
        like_count: storage.like_count(&id),
        favorite_count: storage.favorite_count(&id),
        comment_count: storage.comment_count(&id),
        is_liked: viewer.as_ref().map(|p| storage.is_liked(&id, &p.id)),
        is_favorited: viewer.as_ref().map(|p| storage.is_favorited(&id, &p.id)),
        live,
        server,
    };
    Ok(HttpResponse::Ok().json(response))
}

pub async fn create_server(
    req: HttpRequest,
    storage: web::Data<DirectoryStorage>,
    sessions: web::Data<SessionStore>,
    body: web::Json<ServerForm>,
    rate_limiter: web::Data<SubmitLimiter>,
) -> Result<HttpResponse, RequestError> {
    let peer_ip = extract_peer_ip(&req)?;
    if !rate_limiter.0.check_key(&peer_ip).is_ok() {
        error!("Rate limit exceeded for server submit for ip: {}", peer_ip);
        return Err(RequestError::RateLimitExceeded);
    }

    let owner = current_user(&req, &sessions, &storage)?;
    let form = body.into_inner();
    if let Err(e) = form.validate() {
        error!("Invalid server submission: {}", e);
        return Ok(HttpResponse::BadRequest().body(e));
    }

    let now = now_secs();
    let server = Server {
        id: uuid::Uuid::new_v4().to_string(),
        owner_id: owner.id.clone(),
        name: form.name,
        description: form.description,
        ip_address: form.ip_address,
        port: form.port,
        version: form.version,
        server_type: form.server_type,
        is_pure_public: form.is_pure_public,
        requires_whitelist: form.requires_whitelist,
        requires_genuine: form.requires_genuine,
        max_players: form.max_players,
        online_players: form.online_players,
        status: ReviewStatus::Pending,
        featured: false,
        view_count: 0,
        tags: form.tags,
        created_at: now,
        updated_at: now,
    };

    match storage.add_server(server.clone()) {
        Ok(_) => {
            info!("Server {} submitted by {}", server.id, owner.username);
            Ok(HttpResponse::Ok().json(server))
        }
        Err(e) => {
            error!("Failed to add server: {}", e);
            Ok(HttpResponse::BadRequest().body(e))
        }
    }
}

pub async fn update_server(
    req: HttpRequest,
    storage: web::Data<DirectoryStorage>,
    sessions: web::Data<SessionStore>,
    registry: web::Data<StatusRegistry>,
    path: web::Path<String>,
    body: web::Json<ServerEdit>,
) -> Result<HttpResponse, RequestError> {
    let id = path.into_inner();
    let editor = current_user(&req, &sessions, &storage)?;
    let server = storage.server(&id).ok_or(RequestError::NotFound)?;
    if server.owner_id != editor.id && editor.role != UserRole::Admin {
        return Err(RequestError::Forbidden);
    }

    let mut updated = server.clone();
    updated.apply_edit(body.into_inner(), now_secs());
    if let Err(e) = crate::models::server::validate_fields(
        &updated.name,
        &updated.description,
        &updated.ip_address,
        updated.port,
        &updated.version,
        &updated.tags,
    ) {
        error!("Invalid server edit: {}", e);
        return Ok(HttpResponse::BadRequest().body(e));
    }

    let address_changed =
        updated.ip_address != server.ip_address || updated.port != server.port;

    if editor.role == UserRole::Admin {
        if server.status == ReviewStatus::Approved && address_changed {
            registry.rekey(&id, StatusKey::new(&updated.ip_address, updated.port));
        }
    } else {
        // Owner edits go back through review; stop watching until approved.
        if server.status == ReviewStatus::Approved {
            registry.detach(&id);
        }
        updated.status = ReviewStatus::Pending;
    }

    let committed = storage
        .update_server(&id, |s| *s = updated)
        .map_err(|_| RequestError::NotFound)?;
    Ok(HttpResponse::Ok().json(committed))
}

pub async fn delete_server(
    req: HttpRequest,
    storage: web::Data<DirectoryStorage>,
    sessions: web::Data<SessionStore>,
    registry: web::Data<StatusRegistry>,
    path: web::Path<String>,
) -> Result<HttpResponse, RequestError> {
    let id = path.into_inner();
    let user = current_user(&req, &sessions, &storage)?;
    let server = storage.server(&id).ok_or(RequestError::NotFound)?;
    if server.owner_id != user.id && user.role != UserRole::Admin {
        return Err(RequestError::Forbidden);
    }

    registry.detach(&id);
    storage.remove_server(&id);
    info!("Removed server {} ({})", server.name, id);
    Ok(HttpResponse::Ok().finish())
}

pub async fn user_servers(
    req: HttpRequest,
    storage: web::Data<DirectoryStorage>,
    sessions: web::Data<SessionStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, RequestError> {
    let user_id = path.into_inner();
    let viewer = current_user(&req, &sessions, &storage)?;
    if viewer.id != user_id && viewer.role != UserRole::Admin {
        return Err(RequestError::Forbidden);
    }
    Ok(HttpResponse::Ok().json(storage.servers_by_owner(&user_id)))
}

pub async fn refresh_status(
    req: HttpRequest,
    storage: web::Data<DirectoryStorage>,
    registry: web::Data<StatusRegistry>,
    path: web::Path<String>,
    rate_limiter: web::Data<StatusLimiter>,
) -> Result<HttpResponse, RequestError> {
    let peer_ip = extract_peer_ip(&req)?;
    if !rate_limiter.0.check_key(&peer_ip).is_ok() {
        error!("Rate limit exceeded for status refresh for ip: {}", peer_ip);
        return Err(RequestError::RateLimitExceeded);
    }

    let id = path.into_inner();
    let server = storage.server(&id).ok_or(RequestError::NotFound)?;
    if server.status != ReviewStatus::Approved {
        return Err(RequestError::NotFound);
    }

    if !registry.refresh(&id) {
        // Watcher was never attached (e.g. approved before a restart).
        registry.attach(&id, StatusKey::new(&server.ip_address, server.port));
        registry.refresh(&id);
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "refreshing": true,
        "badge": registry.badge_for(&id),
    })))
}
