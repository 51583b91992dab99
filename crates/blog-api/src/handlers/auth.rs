//! Signup, login and logout.

use actix_web::{web, HttpResponse};
use blog_core::forms::{LoginForm, SignupForm};
use blog_core::services::{accounts, Submission};
use blog_ui::{Layout, LoginTemplate, SignupTemplate};
use serde::Deserialize;

use super::{redirect, render, AppState};
use crate::error::HttpError;
use crate::session::{removal_cookie, safe_next, session_cookie, Viewer};

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

pub async fn login_form(
    viewer: Viewer,
    query: web::Query<NextQuery>,
) -> Result<HttpResponse, HttpError> {
    render(&LoginTemplate {
        layout: Layout::new(viewer.summary()),
        username: String::new(),
        next: query.next.clone().unwrap_or_default(),
        errors: Vec::new(),
    })
}

pub async fn login(
    data: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, HttpError> {
    let form = form.into_inner();
    match accounts::login(data.repo.as_ref(), data.auth.as_ref(), &form).await? {
        Some(user) => {
            log::info!("{} logged in", user.username);
            let token = data.auth.issue_session(user.id);
            let mut response = redirect(safe_next(form.next.as_deref()));
            response
                .add_cookie(&session_cookie(token))
                .map_err(|e| anyhow::anyhow!("failed to set session cookie: {e}"))?;
            Ok(response)
        }
        None => render(&LoginTemplate {
            layout: Layout::new(None),
            username: form.username,
            next: form.next.unwrap_or_default(),
            errors: vec![accounts::BAD_CREDENTIALS.to_string()],
        }),
    }
}

/// Works for GET and POST; always lands on the index.
pub async fn logout(viewer: Viewer) -> Result<HttpResponse, HttpError> {
    if let Some(name) = viewer.username() {
        log::info!("{name} logged out");
    }
    let mut response = redirect("/");
    response
        .add_removal_cookie(&removal_cookie())
        .map_err(|e| anyhow::anyhow!("failed to clear session cookie: {e}"))?;
    Ok(response)
}

pub async fn signup_form(viewer: Viewer) -> Result<HttpResponse, HttpError> {
    render(&SignupTemplate {
        layout: Layout::new(viewer.summary()),
        username: String::new(),
        username_errors: Vec::new(),
        password1_errors: Vec::new(),
        password2_errors: Vec::new(),
    })
}

/// A successful signup logs the new user in.
pub async fn signup(
    data: web::Data<AppState>,
    form: web::Form<SignupForm>,
) -> Result<HttpResponse, HttpError> {
    match accounts::signup(data.repo.as_ref(), data.auth.as_ref(), &form).await? {
        Submission::Saved(user) => {
            let mut response = redirect("/");
            response
                .add_cookie(&session_cookie(data.auth.issue_session(user.id)))
                .map_err(|e| anyhow::anyhow!("failed to set session cookie: {e}"))?;
            Ok(response)
        }
        Submission::Invalid(errors) => render(&SignupTemplate {
            layout: Layout::new(None),
            username: form.username.clone(),
            username_errors: errors.get("username").to_vec(),
            password1_errors: errors.get("password1").to_vec(),
            password2_errors: errors.get("password2").to_vec(),
        }),
    }
}
