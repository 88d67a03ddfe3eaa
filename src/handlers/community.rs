// src/handlers/community.rs
use crate::models::community::{Comment, CommentForm};
use crate::models::profile::{Profile, UserRole};
use crate::models::server::ReviewStatus;
use crate::session::{current_user, SessionStore};
use crate::status::StatusRegistry;
use crate::storage::memory::DirectoryStorage;
use crate::utils::{now_secs, RequestError};
use actix_web::{web, HttpRequest, HttpResponse};
use log::{error, info};
use serde::Serialize;

fn approved_server(storage: &DirectoryStorage, id: &str) -> Result<(), RequestError> {
    match storage.server(id) {
        Some(server) if server.status == ReviewStatus::Approved => Ok(()),
        _ => Err(RequestError::NotFound),
    }
}

pub async fn like_server(
    req: HttpRequest,
    storage: web::Data<DirectoryStorage>,
    sessions: web::Data<SessionStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, RequestError> {
    let id = path.into_inner();
    let user = current_user(&req, &sessions, &storage)?;
    approved_server(&storage, &id)?;

    match storage.like(&id, &user.id) {
        Ok(_) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "like_count": storage.like_count(&id),
        }))),
        Err(e) => Ok(HttpResponse::BadRequest().body(e)),
    }
}

pub async fn unlike_server(
    req: HttpRequest,
    storage: web::Data<DirectoryStorage>,
    sessions: web::Data<SessionStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, RequestError> {
    let id = path.into_inner();
    let user = current_user(&req, &sessions, &storage)?;
    approved_server(&storage, &id)?;

    match storage.unlike(&id, &user.id) {
        Ok(_) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "like_count": storage.like_count(&id),
        }))),
        Err(e) => Ok(HttpResponse::BadRequest().body(e)),
    }
}

pub async fn favorite_server(
    req: HttpRequest,
    storage: web::Data<DirectoryStorage>,
    sessions: web::Data<SessionStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, RequestError> {
    let id = path.into_inner();
    let user = current_user(&req, &sessions, &storage)?;
    approved_server(&storage, &id)?;

    match storage.favorite(&id, &user.id) {
        Ok(_) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "favorite_count": storage.favorite_count(&id),
        }))),
        Err(e) => Ok(HttpResponse::BadRequest().body(e)),
    }
}

pub async fn unfavorite_server(
    req: HttpRequest,
    storage: web::Data<DirectoryStorage>,
    sessions: web::Data<SessionStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, RequestError> {
    let id = path.into_inner();
    let user = current_user(&req, &sessions, &storage)?;
    approved_server(&storage, &id)?;

    match storage.unfavorite(&id, &user.id) {
        Ok(_) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "favorite_count": storage.favorite_count(&id),
        }))),
        Err(e) => Ok(HttpResponse::BadRequest().body(e)),
    }
}

pub async fn user_favorites(
    req: HttpRequest,
    storage: web::Data<DirectoryStorage>,
    sessions: web::Data<SessionStore>,
    registry: web::Data<StatusRegistry>,
    path: web::Path<String>,
) -> Result<HttpResponse, RequestError> {
    let user_id = path.into_inner();
    let viewer = current_user(&req, &sessions, &storage)?;
    if viewer.id != user_id && viewer.role != UserRole::Admin {
        return Err(RequestError::Forbidden);
    }

    let favorites: Vec<_> = storage
        .favorites_of(&user_id)
        .into_iter()
        .map(|server| super::servers::summarize(&storage, &registry, server))
        .collect();
    Ok(HttpResponse::Ok().json(favorites))
}

#[derive(Serialize)]
struct CommentView {
    #[serde(flatten)]
    comment: Comment,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<Profile>,
}

pub async fn list_comments(
    storage: web::Data<DirectoryStorage>,
    path: web::Path<String>,
) -> Result<HttpResponse, RequestError> {
    let id = path.into_inner();
    approved_server(&storage, &id)?;

    let comments: Vec<CommentView> = storage
        .comments_for(&id)
        .into_iter()
        .map(|comment| CommentView {
            user: storage.profile(&comment.user_id),
            comment,
        })
        .collect();
    Ok(HttpResponse::Ok().json(comments))
}

pub async fn create_comment(
    req: HttpRequest,
    storage: web::Data<DirectoryStorage>,
    sessions: web::Data<SessionStore>,
    path: web::Path<String>,
    body: web::Json<CommentForm>,
) -> Result<HttpResponse, RequestError> {
    let id = path.into_inner();
    let user = current_user(&req, &sessions, &storage)?;
    approved_server(&storage, &id)?;

    let form = body.into_inner();
    if let Err(e) = form.validate() {
        error!("Invalid comment: {}", e);
        return Ok(HttpResponse::BadRequest().body(e));
    }

    let comment = Comment {
        id: uuid::Uuid::new_v4().to_string(),
        server_id: id,
        user_id: user.id.clone(),
        content: form.content,
        // Comments await moderation before they are listed.
        is_approved: false,
        created_at: now_secs(),
    };
    storage.add_comment(comment.clone());
    info!("Comment {} submitted by {}", comment.id, user.username);
    Ok(HttpResponse::Ok().json(comment))
}
