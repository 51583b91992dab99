//! Maps domain errors onto HTTP responses.

use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use askama::Template;
use blog_core::error::AppError;
use blog_ui::{Layout, NotFoundTemplate};

/// Handler error. Not-found renders the site's 404 page; everything else is
/// a short plain-text body.
#[derive(Debug)]
pub struct HttpError(pub AppError);

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        HttpError(err)
    }
}

impl From<anyhow::Error> for HttpError {
    fn from(err: anyhow::Error) -> Self {
        HttpError(err.into())
    }
}

impl From<askama::Error> for HttpError {
    fn from(err: askama::Error) -> Self {
        HttpError(AppError::Internal(format!("template rendering failed: {err}")))
    }
}

/// Renders the not-found page, falling back to plain text if even that fails.
pub fn not_found_page(layout: Layout, path: Option<String>) -> HttpResponse {
    match (NotFoundTemplate { layout, path }).render() {
        Ok(html) => HttpResponse::NotFound()
            .content_type("text/html; charset=utf-8")
            .body(html),
        Err(e) => {
            log::error!("failed to render 404 page: {e}");
            HttpResponse::NotFound().body("Not Found")
        }
    }
}

impl ResponseError for HttpError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            AppError::NotFound(..) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match &self.0 {
            AppError::NotFound(entity, key) => {
                log::debug!("{entity} not found: {key}");
                not_found_page(Layout::new(None), None)
            }
            AppError::Internal(msg) => {
                log::error!("internal error: {msg}");
                HttpResponse::InternalServerError().body("Internal Server Error")
            }
            other => HttpResponse::build(self.status_code()).body(other.to_string()),
        }
    }
}
