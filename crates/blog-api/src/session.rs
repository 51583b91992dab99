//! Who is making the request.
//!
//! The `sessionid` cookie carries a token from `AuthProvider::issue_session`.
//! A missing, forged or stale cookie just means an anonymous viewer.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse};
use blog_core::models::{User, UserSummary};
use futures_util::future::LocalBoxFuture;

use crate::error::HttpError;
use crate::handlers::AppState;

pub const SESSION_COOKIE: &str = "sessionid";

/// The current viewer, resolved from the session cookie.
#[derive(Debug, Clone, Default)]
pub struct Viewer(Option<User>);

impl Viewer {
    pub fn anonymous() -> Self {
        Viewer(None)
    }

    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }

    pub fn username(&self) -> Option<&str> {
        self.0.as_ref().map(|u| u.username.as_str())
    }

    pub fn summary(&self) -> Option<UserSummary> {
        self.0.as_ref().map(User::summary)
    }

    /// Returns the signed-in user, or the redirect to the login page that
    /// the handler should answer with.
    pub fn require(self, req: &HttpRequest, login_url: &str) -> Result<User, HttpResponse> {
        self.0.ok_or_else(|| login_redirect(req, login_url))
    }
}

/// `next` is percent-encoded except for `/`, so `/create/` stays readable.
pub fn login_redirect(req: &HttpRequest, login_url: &str) -> HttpResponse {
    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let next = urlencoding::encode(target).replace("%2F", "/");
    HttpResponse::Found()
        .insert_header((header::LOCATION, format!("{login_url}?next={next}")))
        .finish()
}

/// Only same-site absolute paths are followed after login.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(next) if next.starts_with('/') && !next.starts_with("//") => next,
        _ => "/",
    }
}

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}

impl FromRequest for Viewer {
    type Error = HttpError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = req.cookie(SESSION_COOKIE).map(|c| c.value().to_string());

        Box::pin(async move {
            let (Some(state), Some(token)) = (state, token) else {
                return Ok(Viewer::anonymous());
            };
            let Some(user_id) = state.auth.verify_session(&token) else {
                log::debug!("ignoring session cookie with a bad signature");
                return Ok(Viewer::anonymous());
            };
            // The user may have been deleted since the cookie was issued.
            let user = state.repo.get_user(user_id).await?;
            Ok(Viewer(user))
        })
    }
}
