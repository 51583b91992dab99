//! The index listing, static pages and the catch-all 404.

use actix_web::{web, HttpRequest, HttpResponse};
use askama::Template;
use blog_core::models::PostFilter;
use blog_core::services::listing;
use blog_ui::{AboutAuthorTemplate, AboutTechTemplate, IndexTemplate, Layout, PageNav, PostCard};

use super::{html, render, AppState, PageQuery};
use crate::cache::PageCache;
use crate::error::{not_found_page, HttpError};
use crate::session::Viewer;

/// All posts, newest first. Served from the page cache while fresh.
pub async fn index(
    req: HttpRequest,
    data: web::Data<AppState>,
    viewer: Viewer,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, HttpError> {
    let request = query.request();
    let key = PageCache::key_for(req.path(), request, viewer.username());
    if let Some(body) = data.cache.get(&key) {
        return Ok(html(body));
    }

    let page = listing::posts_page(
        data.repo.as_ref(),
        PostFilter::All,
        request,
        &data.paginator,
    )
    .await?;
    let body = IndexTemplate {
        layout: Layout::new(viewer.summary()),
        posts: PostCard::many(&page.items, data.store.as_ref()),
        nav: PageNav::from(&page.meta),
    }
    .render()?;

    data.cache.insert(key, body.clone());
    Ok(html(body))
}

pub async fn about_author(viewer: Viewer) -> Result<HttpResponse, HttpError> {
    render(&AboutAuthorTemplate {
        layout: Layout::new(viewer.summary()),
    })
}

pub async fn about_tech(viewer: Viewer) -> Result<HttpResponse, HttpError> {
    render(&AboutTechTemplate {
        layout: Layout::new(viewer.summary()),
    })
}

/// Default service for unmatched paths.
pub async fn not_found(req: HttpRequest, viewer: Viewer) -> HttpResponse {
    log::debug!("no route for {}", req.path());
    not_found_page(Layout::new(viewer.summary()), Some(req.path().to_string()))
}
