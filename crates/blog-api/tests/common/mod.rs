//! Shared fixtures: a real SQLite repo in memory, media in a temp dir and the
//! simple auth provider.

#![allow(dead_code)]

use std::io::Cursor;

use actix_web::cookie::Cookie;
use actix_web::web;
use blog_api::session::SESSION_COOKIE;
use blog_api::AppState;
use blog_auth_simple::SimpleAuthProvider;
use blog_core::models::{Group, Post, User};
use blog_core::traits::{AuthProvider, BlogRepo};
use blog_db_sqlite::SqliteBlogRepo;
use blog_storage_local::LocalMediaStore;
use tempfile::TempDir;

pub const PASSWORD: &str = "s3cret-pass";
pub const BOUNDARY: &str = "----blogtestboundary";

/// Builds the service under test from a `TestApp`.
macro_rules! app {
    ($t:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($t.data.clone())
                .wrap(blog_api::middleware::security_headers())
                .configure(blog_api::configure_routes),
        )
        .await
    };
}

/// GETs `$uri` (optionally with a session cookie) and returns the status and
/// the body as text.
macro_rules! get_page {
    ($app:expr, $uri:expr) => {{
        let req = actix_web::test::TestRequest::get().uri(&$uri).to_request();
        let resp = actix_web::test::call_service(&$app, req).await;
        let status = resp.status();
        let body = actix_web::test::read_body(resp).await;
        (status, String::from_utf8_lossy(&body).into_owned())
    }};
    ($app:expr, $uri:expr, $cookie:expr) => {{
        let req = actix_web::test::TestRequest::get()
            .uri(&$uri)
            .cookie($cookie)
            .to_request();
        let resp = actix_web::test::call_service(&$app, req).await;
        let status = resp.status();
        let body = actix_web::test::read_body(resp).await;
        (status, String::from_utf8_lossy(&body).into_owned())
    }};
}

pub struct TestApp {
    pub data: web::Data<AppState>,
    pub media_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let repo = SqliteBlogRepo::new("sqlite::memory:").await.unwrap();
        let media_dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(media_dir.path().to_path_buf(), "/media".into());
        let auth = SimpleAuthProvider::new("test-secret").unwrap();

        let state = AppState::new(Box::new(repo), Box::new(store), Box::new(auth));
        Self {
            data: web::Data::new(state),
            media_dir,
        }
    }

    pub fn repo(&self) -> &dyn BlogRepo {
        self.data.repo.as_ref()
    }

    pub fn auth(&self) -> &dyn AuthProvider {
        self.data.auth.as_ref()
    }

    pub async fn user(&self, username: &str) -> User {
        let hash = self.auth().hash_password(PASSWORD).await.unwrap();
        let user = User::new(username.to_string(), hash);
        self.repo().create_user(user.clone()).await.unwrap();
        user
    }

    pub fn session(&self, user: &User) -> Cookie<'static> {
        Cookie::new(SESSION_COOKIE, self.auth().issue_session(user.id))
    }

    pub async fn group(&self, slug: &str, title: &str) -> Group {
        let group = Group::new(slug.to_string(), title.to_string(), format!("About {title}"));
        self.repo().create_group(group.clone()).await.unwrap();
        group
    }

    pub async fn post(&self, author: &User, text: &str, group: Option<&Group>) -> Post {
        let post = Post::new(author.id, text.to_string(), group.map(|g| g.id), None);
        self.repo().create_post(post.clone()).await.unwrap();
        post
    }
}

pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(2, 1, image::Rgb([255, 255, 255]));
    let mut out = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}

/// A file part for `multipart_body`.
pub struct FilePart<'a> {
    pub field: &'a str,
    pub filename: &'a str,
    pub content_type: &'a str,
    pub data: &'a [u8],
}

/// Encodes a `multipart/form-data` body; pair it with `multipart_content_type`.
pub fn multipart_body(fields: &[(&str, &str)], file: Option<FilePart<'_>>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(file) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                file.field, file.filename, file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

pub fn location(response: &actix_web::dev::ServiceResponse) -> String {
    response
        .headers()
        .get(actix_web::http::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
