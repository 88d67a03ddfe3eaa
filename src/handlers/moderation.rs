// src/handlers/moderation.rs
use crate::models::community::Comment;
use crate::models::profile::{Profile, UserRole};
use crate::models::server::ReviewStatus;
use crate::session::{current_user, require_admin, SessionStore};
use crate::status::{StatusKey, StatusRegistry};
use crate::storage::memory::DirectoryStorage;
use crate::utils::RequestError;
use actix_web::{web, HttpRequest, HttpResponse};
use log::info;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub approve: bool,
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: UserRole,
}

pub async fn pending_servers(
    req: HttpRequest,
    storage: web::Data<DirectoryStorage>,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, RequestError> {
    let admin = current_user(&req, &sessions, &storage)?;
    require_admin(&admin)?;

    let mut servers = storage.servers_with_status(ReviewStatus::Pending);
    servers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(HttpResponse::Ok().json(servers))
}

pub async fn review_server(
    req: HttpRequest,
    storage: web::Data<DirectoryStorage>,
    sessions: web::Data<SessionStore>,
    registry: web::Data<StatusRegistry>,
    path: web::Path<String>,
    body: web::Json<ReviewRequest>,
) -> Result<HttpResponse, RequestError> {
    let admin = current_user(&req, &sessions, &storage)?;
    require_admin(&admin)?;

    let id = path.into_inner();
    let server = storage.server(&id).ok_or(RequestError::NotFound)?;
    if server.status != ReviewStatus::Pending {
        return Ok(HttpResponse::BadRequest().body("Server is not awaiting review"));
    }

    let approved = body.approve;
    let status = if approved {
        ReviewStatus::Approved
    } else {
        ReviewStatus::Rejected
    };
    let committed = storage
        .update_server(&id, |s| s.status = status)
        .map_err(|_| RequestError::NotFound)?;

    if approved {
        // Approved listings get a live-status watcher.
        registry.attach(&id, StatusKey::new(&committed.ip_address, committed.port));
    }

    info!(
        "Server {} {} by {}",
        id,
        if approved { "approved" } else { "rejected" },
        admin.username
    );
    Ok(HttpResponse::Ok().json(committed))
}

#[derive(Serialize)]
struct PendingCommentView {
    #[serde(flatten)]
    comment: Comment,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<Profile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    server_name: Option<String>,
}

pub async fn pending_comments(
    req: HttpRequest,
    storage: web::Data<DirectoryStorage>,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, RequestError> {
    let admin = current_user(&req, &sessions, &storage)?;
    require_admin(&admin)?;

    let comments: Vec<PendingCommentView> = storage
        .pending_comments()
        .into_iter()
        .map(|comment| PendingCommentView {
            user: storage.profile(&comment.user_id),
            server_name: storage.server(&comment.server_id).map(|s| s.name),
            comment,
        })
        .collect();
    Ok(HttpResponse::Ok().json(comments))
}

pub async fn review_comment(
    req: HttpRequest,
    storage: web::Data<DirectoryStorage>,
    sessions: web::Data<SessionStore>,
    path: web::Path<String>,
    body: web::Json<ReviewRequest>,
) -> Result<HttpResponse, RequestError> {
    let admin = current_user(&req, &sessions, &storage)?;
    require_admin(&admin)?;

    let id = path.into_inner();
    if storage.comment(&id).is_none() {
        return Err(RequestError::NotFound);
    }

    if body.approve {
        storage
            .approve_comment(&id)
            .map_err(|_| RequestError::NotFound)?;
    } else {
        // Rejection deletes outright; there is no rejected-comment state.
        storage.remove_comment(&id);
    }
    Ok(HttpResponse::Ok().finish())
}

pub async fn set_role(
    req: HttpRequest,
    storage: web::Data<DirectoryStorage>,
    sessions: web::Data<SessionStore>,
    path: web::Path<String>,
    body: web::Json<RoleRequest>,
) -> Result<HttpResponse, RequestError> {
    let admin = current_user(&req, &sessions, &storage)?;
    require_admin(&admin)?;

    let user_id = path.into_inner();
    storage
        .set_role(&user_id, body.role)
        .map_err(|_| RequestError::NotFound)?;
    info!("Role of {} set to {:?} by {}", user_id, body.role, admin.username);
    Ok(HttpResponse::Ok().finish())
}
