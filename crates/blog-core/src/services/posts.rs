//! Write side for posts and comments.

use uuid::Uuid;

use crate::error::{AppError, MediaError, Result};
use crate::forms::{CommentForm, FormErrors, PostDraft, PostForm};
use crate::models::{Comment, Post, User};
use crate::services::{Submission, Upload};
use crate::traits::{BlogRepo, MediaStore};

const CLEAR_AND_UPLOAD: &str =
    "Please either submit a file or check the clear checkbox, not both.";

/// Only the author may edit a post.
pub fn can_edit(user: &User, post: &Post) -> bool {
    user.id == post.author_id
}

async fn validate_post(
    repo: &dyn BlogRepo,
    form: &PostForm,
    upload: Option<&Upload>,
) -> Result<std::result::Result<PostDraft, FormErrors>> {
    let groups = repo.list_groups().await?;
    let draft = form.validate(&groups);
    if upload.is_none() || !form.clear_image {
        return Ok(draft);
    }
    let mut errors = draft.err().unwrap_or_default();
    errors.add("image", CLEAR_AND_UPLOAD);
    Ok(Err(errors))
}

/// Stores an upload; an undecodable image becomes a form error on `image`.
async fn store_upload(
    media: &dyn MediaStore,
    upload: Upload,
) -> Result<std::result::Result<String, FormErrors>> {
    match media.save_upload(upload.data, &upload.content_type).await {
        Ok(media_id) => Ok(Ok(media_id)),
        Err(MediaError::InvalidImage(message)) => {
            log::debug!("rejected upload {}: {}", upload.filename, message);
            let mut errors = FormErrors::new();
            errors.add("image", message);
            Ok(Err(errors))
        }
        Err(MediaError::Storage(err)) => Err(err.into()),
    }
}

pub async fn create_post(
    repo: &dyn BlogRepo,
    media: &dyn MediaStore,
    author: &User,
    form: &PostForm,
    upload: Option<Upload>,
) -> Result<Submission<Post>> {
    let draft = match validate_post(repo, form, upload.as_ref()).await? {
        Ok(draft) => draft,
        Err(errors) => return Ok(Submission::Invalid(errors)),
    };

    let image = match upload {
        Some(upload) => match store_upload(media, upload).await? {
            Ok(media_id) => Some(media_id),
            Err(errors) => return Ok(Submission::Invalid(errors)),
        },
        None => None,
    };

    let post = Post::new(author.id, draft.text, draft.group_id, image);
    repo.create_post(post.clone()).await?;
    log::info!("{} published post {} ({})", author.username, post.id, post.excerpt());
    Ok(Submission::Saved(post))
}

/// Rewrites text, group and image of an existing post. Author and
/// publication date never change. Without a new upload or the clear flag the
/// stored image is kept.
pub async fn edit_post(
    repo: &dyn BlogRepo,
    media: &dyn MediaStore,
    editor: &User,
    post_id: Uuid,
    form: &PostForm,
    upload: Option<Upload>,
) -> Result<Submission<Post>> {
    let mut post = repo
        .get_post(post_id)
        .await?
        .ok_or_else(|| AppError::not_found("post", post_id))?
        .post;
    if !can_edit(editor, &post) {
        return Err(AppError::Unauthorized(format!(
            "{} may not edit post {}",
            editor.username, post.id
        )));
    }

    let draft = match validate_post(repo, form, upload.as_ref()).await? {
        Ok(draft) => draft,
        Err(errors) => return Ok(Submission::Invalid(errors)),
    };

    if let Some(upload) = upload {
        match store_upload(media, upload).await? {
            Ok(media_id) => post.image = Some(media_id),
            Err(errors) => return Ok(Submission::Invalid(errors)),
        }
    } else if draft.clear_image {
        post.image = None;
    }
    post.text = draft.text;
    post.group_id = draft.group_id;

    repo.update_post(&post).await?;
    log::info!("{} edited post {}", editor.username, post.id);
    Ok(Submission::Saved(post))
}

pub async fn add_comment(
    repo: &dyn BlogRepo,
    author: &User,
    post_id: Uuid,
    form: &CommentForm,
) -> Result<Submission<Comment>> {
    if repo.get_post(post_id).await?.is_none() {
        return Err(AppError::not_found("post", post_id));
    }
    let text = match form.validate() {
        Ok(text) => text,
        Err(errors) => return Ok(Submission::Invalid(errors)),
    };

    let comment = Comment::new(post_id, author.id, text);
    repo.create_comment(comment.clone()).await?;
    log::info!("{} commented on post {}", author.username, post_id);
    Ok(Submission::Saved(comment))
}
