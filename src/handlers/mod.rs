// src/handlers/mod.rs
pub mod auth;
pub mod community;
pub mod index;
pub mod moderation;
pub mod relay;
pub mod servers;

use actix_web::web;

/// Full route table, shared by main and the handler tests.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index::health))
        .route("/auth/signup", web::post().to(auth::signup))
        .route("/auth/signin", web::post().to(auth::signin))
        .route("/auth/signout", web::post().to(auth::signout))
        .route("/auth/me", web::get().to(auth::me))
        .route("/servers", web::get().to(servers::list_servers))
        .route("/servers", web::post().to(servers::create_server))
        .route("/servers/{id}", web::get().to(servers::get_server))
        .route("/servers/{id}", web::put().to(servers::update_server))
        .route("/servers/{id}", web::delete().to(servers::delete_server))
        .route(
            "/servers/{id}/status/refresh",
            web::post().to(servers::refresh_status),
        )
        .route("/servers/{id}/like", web::post().to(community::like_server))
        .route("/servers/{id}/like", web::delete().to(community::unlike_server))
        .route("/servers/{id}/favorite", web::post().to(community::favorite_server))
        .route(
            "/servers/{id}/favorite",
            web::delete().to(community::unfavorite_server),
        )
        .route("/servers/{id}/comments", web::get().to(community::list_comments))
        .route("/servers/{id}/comments", web::post().to(community::create_comment))
        .route("/users/{id}/servers", web::get().to(servers::user_servers))
        .route("/users/{id}/favorites", web::get().to(community::user_favorites))
        .route("/admin/servers/pending", web::get().to(moderation::pending_servers))
        .route(
            "/admin/servers/{id}/review",
            web::post().to(moderation::review_server),
        )
        .route("/admin/comments/pending", web::get().to(moderation::pending_comments))
        .route(
            "/admin/comments/{id}/review",
            web::post().to(moderation::review_comment),
        )
        .route("/admin/users/{id}/role", web::post().to(moderation::set_role))
        .route("/relay/server-status", web::post().to(relay::server_status))
        .route("/relay/player", web::post().to(relay::player_lookup));
}
