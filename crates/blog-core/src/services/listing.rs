//! Read side: paginated post listings, the follow feed, and the detail page.

use crate::error::{AppError, Result};
use crate::models::{CommentView, Group, PostFilter, PostView, User};
use crate::pagination::{Page, PageRequest, Paginator};
use crate::traits::BlogRepo;

/// Counts the matching posts, clamps the requested page against that count,
/// then fetches just that window.
pub async fn posts_page(
    repo: &dyn BlogRepo,
    filter: PostFilter,
    request: PageRequest,
    paginator: &Paginator,
) -> Result<Page<PostView>> {
    let total = repo.count_posts(filter).await?;
    let meta = paginator.locate(total.max(0) as u64, request);
    let items = repo
        .list_posts(filter, meta.limit() as i64, meta.offset() as i64)
        .await?;
    Ok(Page::from_parts(items, meta))
}

/// Posts written by everyone `follower` follows, newest first. Following
/// nobody yields an empty page.
pub async fn feed_page(
    repo: &dyn BlogRepo,
    follower: &User,
    request: PageRequest,
    paginator: &Paginator,
) -> Result<Page<PostView>> {
    posts_page(repo, PostFilter::FollowedBy(follower.id), request, paginator).await
}

pub async fn group_page(
    repo: &dyn BlogRepo,
    slug: &str,
    request: PageRequest,
    paginator: &Paginator,
) -> Result<(Group, Page<PostView>)> {
    let group = repo
        .get_group(slug)
        .await?
        .ok_or_else(|| AppError::not_found("group", slug))?;
    let page = posts_page(repo, PostFilter::Group(group.id), request, paginator).await?;
    Ok((group, page))
}

pub struct ProfilePage {
    pub author: User,
    pub page: Page<PostView>,
    /// Whether the viewer follows `author`; always false for anonymous viewers.
    pub following: bool,
}

pub async fn profile_page(
    repo: &dyn BlogRepo,
    username: &str,
    viewer: Option<&User>,
    request: PageRequest,
    paginator: &Paginator,
) -> Result<ProfilePage> {
    let author = repo
        .get_user_by_username(username)
        .await?
        .ok_or_else(|| AppError::not_found("user", username))?;
    let page = posts_page(repo, PostFilter::Author(author.id), request, paginator).await?;
    let following = match viewer {
        Some(viewer) => repo.is_following(viewer.id, author.id).await?,
        None => false,
    };
    Ok(ProfilePage {
        author,
        page,
        following,
    })
}

pub async fn post_detail(
    repo: &dyn BlogRepo,
    post_id: uuid::Uuid,
) -> Result<(PostView, Vec<CommentView>)> {
    let post = repo
        .get_post(post_id)
        .await?
        .ok_or_else(|| AppError::not_found("post", post_id))?;
    let comments = repo.list_comments(post_id).await?;
    Ok((post, comments))
}
