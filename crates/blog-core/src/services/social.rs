//! Follow edges between users.
//!
//! Following is idempotent and refuses self-follow without touching storage.
//! Unfollowing an edge that does not exist is a not-found error.

use crate::error::{AppError, Result};
use crate::models::User;
use crate::traits::BlogRepo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Created,
    AlreadyFollowing,
    /// The target is the follower; nothing was written.
    SelfFollow,
}

async fn find_author(repo: &dyn BlogRepo, username: &str) -> Result<User> {
    repo.get_user_by_username(username)
        .await?
        .ok_or_else(|| AppError::not_found("user", username))
}

/// Makes `user` follow the author named `author_username`. Returns the author
/// so the caller can redirect to their profile.
pub async fn follow(
    repo: &dyn BlogRepo,
    user: &User,
    author_username: &str,
) -> Result<(User, FollowOutcome)> {
    let author = find_author(repo, author_username).await?;
    if author.id == user.id {
        return Ok((author, FollowOutcome::SelfFollow));
    }

    let outcome = if repo.create_follow(user.id, author.id).await? {
        log::info!("{} now follows {}", user.username, author.username);
        FollowOutcome::Created
    } else {
        FollowOutcome::AlreadyFollowing
    };
    Ok((author, outcome))
}

pub async fn unfollow(repo: &dyn BlogRepo, user: &User, author_username: &str) -> Result<User> {
    let author = find_author(repo, author_username).await?;
    if !repo.delete_follow(user.id, author.id).await? {
        return Err(AppError::not_found(
            "follow",
            format!("{} -> {}", user.username, author.username),
        ));
    }
    log::info!("{} unfollowed {}", user.username, author.username);
    Ok(author)
}
