//! # blog-api Handlers
//!
//! This module coordinates the flow between HTTP requests and the core
//! services. Every handler resolves the viewer, calls a service, and renders
//! a template or redirects.

pub mod auth;
pub mod follow;
pub mod pages;
pub mod posts;

use std::time::Duration;

use actix_web::http::header;
use actix_web::HttpResponse;
use askama::Template;
use blog_core::pagination::{PageRequest, Paginator};
use blog_core::traits::{AuthProvider, BlogRepo, MediaStore};
use serde::Deserialize;

use crate::cache::PageCache;
use crate::error::HttpError;

pub const DEFAULT_LOGIN_URL: &str = "/auth/login/";

/// State shared across all Actix-web workers.
pub struct AppState {
    pub repo: Box<dyn BlogRepo>,
    pub store: Box<dyn MediaStore>,
    pub auth: Box<dyn AuthProvider>,
    /// Rendered index pages.
    pub cache: PageCache,
    pub paginator: Paginator,
    pub login_url: String,
}

impl AppState {
    pub fn new(
        repo: Box<dyn BlogRepo>,
        store: Box<dyn MediaStore>,
        auth: Box<dyn AuthProvider>,
    ) -> Self {
        Self {
            repo,
            store,
            auth,
            cache: PageCache::default(),
            paginator: Paginator::default(),
            login_url: DEFAULT_LOGIN_URL.to_string(),
        }
    }

    pub fn with_page_size(mut self, per_page: usize) -> Self {
        self.paginator = Paginator::new(per_page);
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = PageCache::new(ttl);
        self
    }

    pub fn with_login_url(mut self, login_url: impl Into<String>) -> Self {
        self.login_url = login_url.into();
        self
    }
}

/// The `?page=` query parameter, kept raw so that garbage means page 1.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn request(&self) -> PageRequest {
        PageRequest::parse(self.page.as_deref())
    }
}

pub(crate) fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

pub(crate) fn render(template: &impl Template) -> Result<HttpResponse, HttpError> {
    Ok(html(template.render()?))
}

pub(crate) fn redirect(location: impl AsRef<str>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.as_ref()))
        .finish()
}

pub(crate) fn profile_url(username: &str) -> String {
    format!("/profile/{username}/")
}

pub(crate) fn post_url(post_id: impl std::fmt::Display) -> String {
    format!("/posts/{post_id}/")
}
