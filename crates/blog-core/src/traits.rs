//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::MediaError;
use crate::models::{Comment, CommentView, Group, Post, PostFilter, PostView, User};

/// Data persistence contract for users, groups, posts, comments and follows.
///
/// Lookups by key return `Ok(None)` when the row does not exist; deciding
/// whether that is a 404 is up to the caller.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BlogRepo: Send + Sync {
    // User Operations
    async fn create_user(&self, user: User) -> anyhow::Result<()>;
    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    /// Cascades to the user's posts, comments and follow edges.
    async fn delete_user(&self, id: Uuid) -> anyhow::Result<bool>;

    // Group Operations
    async fn create_group(&self, group: Group) -> anyhow::Result<()>;
    async fn get_group(&self, slug: &str) -> anyhow::Result<Option<Group>>;
    async fn list_groups(&self) -> anyhow::Result<Vec<Group>>;
    /// Posts of a deleted group survive with no group.
    async fn delete_group(&self, id: Uuid) -> anyhow::Result<bool>;

    // Post Operations
    async fn create_post(&self, post: Post) -> anyhow::Result<()>;
    /// Writes `text`, `group_id` and `image`; author and `pub_date` are immutable.
    async fn update_post(&self, post: &Post) -> anyhow::Result<()>;
    async fn get_post(&self, id: Uuid) -> anyhow::Result<Option<PostView>>;
    async fn list_posts(
        &self,
        filter: PostFilter,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<PostView>>;
    async fn count_posts(&self, filter: PostFilter) -> anyhow::Result<i64>;
    async fn delete_post(&self, id: Uuid) -> anyhow::Result<bool>;

    // Comment Operations
    async fn create_comment(&self, comment: Comment) -> anyhow::Result<()>;
    /// Newest first.
    async fn list_comments(&self, post_id: Uuid) -> anyhow::Result<Vec<CommentView>>;

    // Follow Operations
    /// Returns `false` when the edge already existed.
    async fn create_follow(&self, user_id: Uuid, author_id: Uuid) -> anyhow::Result<bool>;
    /// Returns `false` when there was no edge to remove.
    async fn delete_follow(&self, user_id: Uuid, author_id: Uuid) -> anyhow::Result<bool>;
    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> anyhow::Result<bool>;
}

/// Media storage contract for handling uploads and thumbnails.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Validates and saves raw bytes, returning a media id for `Post::image`.
    async fn save_upload(&self, data: Vec<u8>, content_type: &str) -> Result<String, MediaError>;
    /// Returns the URL of the original media.
    fn get_url(&self, media_id: &str) -> String;
    /// Returns the URL of the thumbnail.
    fn get_thumbnail_url(&self, media_id: &str) -> String;
    async fn delete(&self, media_id: &str) -> anyhow::Result<()>;
}

/// Identity contract: password hashing and session tokens.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn hash_password(&self, password: &str) -> anyhow::Result<String>;

    /// Verifies a password against a stored hash produced by `hash_password`.
    async fn verify_password(&self, password: &str, hash: &str) -> bool;

    /// Produces an opaque token identifying `user_id` for a session cookie.
    fn issue_session(&self, user_id: Uuid) -> String;

    /// Returns the user id a token was issued for, or `None` if it was tampered with.
    fn verify_session(&self, token: &str) -> Option<Uuid>;
}
