//! # blog-api
//!
//! The web routing and orchestration layer for rusty-blog.

pub mod cache;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod multipart;
pub mod session;

use actix_web::web;

pub use handlers::AppState;

/// Registers every page route plus the custom 404.
///
/// Trailing slashes are part of each route; `/create` without one is a 404.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    use handlers::{auth, follow, pages, posts};

    cfg.route("/", web::get().to(pages::index))
        .route("/group/{slug}/", web::get().to(posts::group_posts))
        .route("/profile/{username}/", web::get().to(posts::profile))
        .route(
            "/profile/{username}/follow/",
            web::get().to(follow::profile_follow),
        )
        .route(
            "/profile/{username}/unfollow/",
            web::get().to(follow::profile_unfollow),
        )
        .service(
            web::resource("/posts/{post_id}/")
                .route(web::get().to(posts::post_detail))
                .route(web::post().to(posts::add_comment)),
        )
        .service(
            web::resource("/posts/{post_id}/edit/")
                .route(web::get().to(posts::post_edit_form))
                .route(web::post().to(posts::post_edit)),
        )
        .route("/posts/{post_id}/comment/", web::post().to(posts::add_comment))
        .service(
            web::resource("/create/")
                .route(web::get().to(posts::post_create_form))
                .route(web::post().to(posts::post_create)),
        )
        .route("/follow/", web::get().to(follow::follow_index))
        .service(
            web::resource("/auth/login/")
                .route(web::get().to(auth::login_form))
                .route(web::post().to(auth::login)),
        )
        .service(
            web::resource("/auth/logout/")
                .route(web::get().to(auth::logout))
                .route(web::post().to(auth::logout)),
        )
        .service(
            web::resource("/auth/signup/")
                .route(web::get().to(auth::signup_form))
                .route(web::post().to(auth::signup)),
        )
        .route("/about/author/", web::get().to(pages::about_author))
        .route("/about/tech/", web::get().to(pages::about_tech))
        .default_service(web::route().to(pages::not_found));
}
