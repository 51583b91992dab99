//! Group and profile listings, post detail, create/edit and comments.

use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use blog_core::error::AppError;
use blog_core::forms::{CommentForm, FormErrors, PostForm};
use blog_core::models::{Group, Post, PostFilter, User};
use blog_core::services::{listing, posts, Submission};
use blog_ui::{
    CommentItem, CreatePostTemplate, GroupListTemplate, GroupOption, Layout, PageNav, PostCard,
    PostDetailTemplate, ProfileTemplate,
};
use uuid::Uuid;

use super::{post_url, profile_url, redirect, render, AppState, PageQuery};
use crate::error::HttpError;
use crate::multipart::read_post_form;
use crate::session::Viewer;

/// Anything that is not a UUID cannot name a post.
fn parse_post_id(raw: &str) -> Result<Uuid, HttpError> {
    Uuid::parse_str(raw).map_err(|_| AppError::not_found("post", raw).into())
}

async fn load_post(data: &AppState, post_id: Uuid) -> Result<Post, HttpError> {
    let view = data
        .repo
        .get_post(post_id)
        .await?
        .ok_or_else(|| AppError::not_found("post", post_id))?;
    Ok(view.post)
}

pub async fn group_posts(
    data: web::Data<AppState>,
    viewer: Viewer,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, HttpError> {
    let slug = path.into_inner();
    let (group, page) =
        listing::group_page(data.repo.as_ref(), &slug, query.request(), &data.paginator).await?;
    render(&GroupListTemplate {
        layout: Layout::new(viewer.summary()),
        group,
        posts: PostCard::many(&page.items, data.store.as_ref()),
        nav: PageNav::from(&page.meta),
    })
}

pub async fn profile(
    data: web::Data<AppState>,
    viewer: Viewer,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, HttpError> {
    let username = path.into_inner();
    let profile = listing::profile_page(
        data.repo.as_ref(),
        &username,
        viewer.user(),
        query.request(),
        &data.paginator,
    )
    .await?;
    let can_follow = viewer.user().is_some_and(|u| u.id != profile.author.id);

    render(&ProfileTemplate {
        layout: Layout::new(viewer.summary()),
        author: profile.author.summary(),
        post_count: profile.page.meta.total,
        following: profile.following,
        can_follow,
        posts: PostCard::many(&profile.page.items, data.store.as_ref()),
        nav: PageNav::from(&profile.page.meta),
    })
}

pub async fn post_detail(
    data: web::Data<AppState>,
    viewer: Viewer,
    path: web::Path<String>,
) -> Result<HttpResponse, HttpError> {
    let post_id = parse_post_id(&path)?;
    let (view, comments) = listing::post_detail(data.repo.as_ref(), post_id).await?;
    let author_post_count = data
        .repo
        .count_posts(PostFilter::Author(view.post.author_id))
        .await?;
    let can_edit = viewer.user().is_some_and(|u| posts::can_edit(u, &view.post));

    render(&PostDetailTemplate {
        layout: Layout::new(viewer.summary()),
        post: PostCard::new(&view, data.store.as_ref()),
        author_post_count: author_post_count.max(0) as u64,
        comments: comments.iter().map(CommentItem::from).collect(),
        can_edit,
    })
}

/// Also serves `POST /posts/<id>/`. An empty comment is dropped without a
/// message. The body is only looked at once the viewer is known, so a bodyless
/// anonymous POST still gets the login redirect.
pub async fn add_comment(
    req: HttpRequest,
    data: web::Data<AppState>,
    viewer: Viewer,
    path: web::Path<String>,
    form: Result<web::Form<CommentForm>, actix_web::Error>,
) -> Result<HttpResponse, HttpError> {
    let user = match viewer.require(&req, &data.login_url) {
        Ok(user) => user,
        Err(to_login) => return Ok(to_login),
    };
    let post_id = parse_post_id(&path)?;
    let form = match form {
        Ok(form) => form.into_inner(),
        Err(e) => {
            log::debug!("unreadable comment body on {post_id}: {e}");
            CommentForm::default()
        }
    };
    if let Submission::Invalid(errors) =
        posts::add_comment(data.repo.as_ref(), &user, post_id, &form).await?
    {
        log::debug!("discarded invalid comment on {post_id}: {errors:?}");
    }
    Ok(redirect(post_url(post_id)))
}

/// Inputs for rendering the shared create/edit form.
struct PostFormPage<'a> {
    user: &'a User,
    groups: &'a [Group],
    form: &'a PostForm,
    errors: &'a FormErrors,
    /// The post being edited, if any.
    post: Option<&'a Post>,
}

fn post_form_page(data: &AppState, page: PostFormPage<'_>) -> Result<HttpResponse, HttpError> {
    render(&CreatePostTemplate {
        layout: Layout::new(Some(page.user.summary())),
        is_edit: page.post.is_some(),
        post_id: page.post.map(|p| p.id.to_string()).unwrap_or_default(),
        text: page.form.text.clone(),
        groups: GroupOption::list(page.groups, &page.form.group),
        current_image: page
            .post
            .and_then(|p| p.image.as_deref())
            .map(|id| data.store.get_url(id)),
        text_errors: page.errors.get("text").to_vec(),
        group_errors: page.errors.get("group").to_vec(),
        image_errors: page.errors.get("image").to_vec(),
    })
}

pub async fn post_create_form(
    req: HttpRequest,
    data: web::Data<AppState>,
    viewer: Viewer,
) -> Result<HttpResponse, HttpError> {
    let user = match viewer.require(&req, &data.login_url) {
        Ok(user) => user,
        Err(to_login) => return Ok(to_login),
    };
    let groups = data.repo.list_groups().await?;
    post_form_page(
        &data,
        PostFormPage {
            user: &user,
            groups: &groups,
            form: &PostForm::default(),
            errors: &FormErrors::new(),
            post: None,
        },
    )
}

pub async fn post_create(
    req: HttpRequest,
    data: web::Data<AppState>,
    viewer: Viewer,
    payload: Multipart,
) -> Result<HttpResponse, HttpError> {
    let user = match viewer.require(&req, &data.login_url) {
        Ok(user) => user,
        Err(to_login) => return Ok(to_login),
    };
    let (form, upload) = read_post_form(payload).await?;

    match posts::create_post(data.repo.as_ref(), data.store.as_ref(), &user, &form, upload).await? {
        Submission::Saved(_) => Ok(redirect(profile_url(&user.username))),
        Submission::Invalid(errors) => {
            let groups = data.repo.list_groups().await?;
            post_form_page(
                &data,
                PostFormPage {
                    user: &user,
                    groups: &groups,
                    form: &form,
                    errors: &errors,
                    post: None,
                },
            )
        }
    }
}

/// Non-authors are sent to the read-only detail page.
pub async fn post_edit_form(
    req: HttpRequest,
    data: web::Data<AppState>,
    viewer: Viewer,
    path: web::Path<String>,
) -> Result<HttpResponse, HttpError> {
    let user = match viewer.require(&req, &data.login_url) {
        Ok(user) => user,
        Err(to_login) => return Ok(to_login),
    };
    let post_id = parse_post_id(&path)?;
    let post = load_post(&data, post_id).await?;
    if !posts::can_edit(&user, &post) {
        return Ok(redirect(post_url(post_id)));
    }

    let groups = data.repo.list_groups().await?;
    post_form_page(
        &data,
        PostFormPage {
            user: &user,
            groups: &groups,
            form: &PostForm::from_post(&post),
            errors: &FormErrors::new(),
            post: Some(&post),
        },
    )
}

pub async fn post_edit(
    req: HttpRequest,
    data: web::Data<AppState>,
    viewer: Viewer,
    path: web::Path<String>,
    payload: Multipart,
) -> Result<HttpResponse, HttpError> {
    let user = match viewer.require(&req, &data.login_url) {
        Ok(user) => user,
        Err(to_login) => return Ok(to_login),
    };
    let post_id = parse_post_id(&path)?;
    // Non-authors are turned away before the upload is read.
    let post = load_post(&data, post_id).await?;
    if !posts::can_edit(&user, &post) {
        log::warn!("{} tried to edit post {post_id}", user.username);
        return Ok(redirect(post_url(post_id)));
    }
    let (form, upload) = read_post_form(payload).await?;

    let outcome = posts::edit_post(
        data.repo.as_ref(),
        data.store.as_ref(),
        &user,
        post_id,
        &form,
        upload,
    )
    .await;

    match outcome {
        Ok(Submission::Saved(_)) => Ok(redirect(post_url(post_id))),
        Ok(Submission::Invalid(errors)) => {
            let groups = data.repo.list_groups().await?;
            post_form_page(
                &data,
                PostFormPage {
                    user: &user,
                    groups: &groups,
                    form: &form,
                    errors: &errors,
                    post: Some(&post),
                },
            )
        }
        Err(AppError::Unauthorized(reason)) => {
            log::warn!("{reason}");
            Ok(redirect(post_url(post_id)))
        }
        Err(e) => Err(e.into()),
    }
}
