use actix_web::{web, HttpRequest, HttpResponse};
use blog_core::services::{listing, social};
use blog_ui::{FollowTemplate, Layout, PageNav, PostCard};

use super::{profile_url, redirect, render, AppState, PageQuery};
use crate::error::HttpError;
use crate::session::Viewer;

/// Posts by the authors the viewer follows.
pub async fn follow_index(
    req: HttpRequest,
    data: web::Data<AppState>,
    viewer: Viewer,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, HttpError> {
    let user = match viewer.require(&req, &data.login_url) {
        Ok(user) => user,
        Err(to_login) => return Ok(to_login),
    };
    let page =
        listing::feed_page(data.repo.as_ref(), &user, query.request(), &data.paginator).await?;
    render(&FollowTemplate {
        layout: Layout::new(Some(user.summary())),
        posts: PostCard::many(&page.items, data.store.as_ref()),
        nav: PageNav::from(&page.meta),
    })
}

pub async fn profile_follow(
    req: HttpRequest,
    data: web::Data<AppState>,
    viewer: Viewer,
    path: web::Path<String>,
) -> Result<HttpResponse, HttpError> {
    let user = match viewer.require(&req, &data.login_url) {
        Ok(user) => user,
        Err(to_login) => return Ok(to_login),
    };
    let (author, _) = social::follow(data.repo.as_ref(), &user, &path).await?;
    Ok(redirect(profile_url(&author.username)))
}

/// Unfollowing someone you do not follow is a 404.
pub async fn profile_unfollow(
    req: HttpRequest,
    data: web::Data<AppState>,
    viewer: Viewer,
    path: web::Path<String>,
) -> Result<HttpResponse, HttpError> {
    let user = match viewer.require(&req, &data.login_url) {
        Ok(user) => user,
        Err(to_login) => return Ok(to_login),
    };
    let author = social::unfollow(data.repo.as_ref(), &user, &path).await?;
    Ok(redirect(profile_url(&author.username)))
}
