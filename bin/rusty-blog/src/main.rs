//! # Rusty-Blog Binary
//!
//! The entry point that assembles the application based on compile-time features.

use std::path::PathBuf;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use blog_api::middleware::{security_headers, standard_middleware};
use blog_api::AppState;
use blog_config::Settings;
use secrecy::ExposeSecret;

#[cfg(not(all(feature = "db-sqlite", feature = "storage-local", feature = "auth-simple")))]
compile_error!("rusty-blog needs a database, a media store and an auth provider; enable db-sqlite, storage-local and auth-simple");

// Feature-gated imports
#[cfg(feature = "db-sqlite")]
use blog_db_sqlite::SqliteBlogRepo;

#[cfg(feature = "storage-local")]
use blog_storage_local::LocalMediaStore;

#[cfg(feature = "auth-simple")]
use blog_auth_simple::SimpleAuthProvider;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let settings = Settings::load().context("failed to load settings")?;

    // 1. Database
    #[cfg(feature = "db-sqlite")]
    let repo = SqliteBlogRepo::new(&settings.database.url)
        .await
        .with_context(|| format!("failed to open {}", settings.database.url))?;

    // 2. Media storage
    #[cfg(feature = "storage-local")]
    let store = LocalMediaStore::new(
        PathBuf::from(&settings.media.root),
        settings.media.url_prefix.clone(),
    );

    // 3. Identity
    #[cfg(feature = "auth-simple")]
    let auth = SimpleAuthProvider::new(settings.auth.session_secret.expose_secret())?
        .with_max_age(Duration::from_secs(settings.auth.session_max_age_secs));

    let state = web::Data::new(
        AppState::new(Box::new(repo), Box::new(store), Box::new(auth))
            .with_page_size(settings.posts.page_size)
            .with_cache_ttl(Duration::from_secs(settings.cache.index_ttl_secs))
            .with_login_url(settings.auth.login_url.clone()),
    );

    let media_prefix = settings.media.url_prefix.clone();
    let media_root = settings.media.root.clone();
    let (host, port) = settings.bind_address();
    log::info!("Rusty-Blog starting on http://{host}:{port}");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(standard_middleware())
            .wrap(security_headers())
            .service(actix_files::Files::new(&media_prefix, &media_root))
            .configure(blog_api::configure_routes)
    })
    .bind((host, port))?
    .run()
    .await?;

    Ok(())
}
