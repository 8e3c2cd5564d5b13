//! HTTP handlers and route configuration.

mod admin;
mod auth;
mod health;
mod posts;
mod search;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .route("/search", web::get().to(search::search_all))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            // Post routes
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list_posts))
                    .route("", web::post().to(posts::create_post))
                    .route("/feed/me", web::get().to(posts::my_feed))
                    .route("/{id}", web::get().to(posts::get_post))
                    .route("/{id}", web::put().to(posts::update_post))
                    .route("/{id}", web::delete().to(posts::delete_post))
                    .route("/{id}/like", web::post().to(posts::toggle_like))
                    .route("/{id}/comment", web::post().to(posts::add_comment))
                    .route(
                        "/{id}/toggle-comments",
                        web::patch().to(posts::toggle_comments),
                    )
                    .route("/{id}/toggle-pin", web::patch().to(posts::toggle_pin)),
            )
            // Admin routes
            .service(
                web::scope("/admin").route("/posts/{id}", web::delete().to(admin::delete_post)),
            ),
    );
}
