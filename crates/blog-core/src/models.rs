//! # Domain Models
//!
//! These structs represent the core entities of rusty-blog.
//! We use UUID v7 for time-ordered, globally unique identification, so
//! ordering by id agrees with creation order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered author. Every post, comment and follow edge points at one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Argon2 PHC string, never rendered.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            username,
            password_hash,
            created_at: Utc::now(),
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

/// The slice of a user that pages display next to posts and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
}

/// A thematic group posts can be filed under (e.g., /group/cats/)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    /// The URL slug, unique across groups
    pub slug: String,
    pub title: String,
    pub description: String,
}

impl Group {
    pub fn new(slug: String, title: String, description: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            slug,
            title,
            description,
        }
    }

    pub fn summary(&self) -> GroupSummary {
        GroupSummary {
            id: self.id,
            slug: self.slug.clone(),
            title: self.title.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
}

/// The fundamental unit of publishing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub text: String,
    /// Set once on creation and never edited.
    pub pub_date: DateTime<Utc>,
    pub author_id: Uuid,
    /// `None` when posted outside a group or when the group was deleted.
    pub group_id: Option<Uuid>,
    /// Media id handed out by the `MediaStore`.
    pub image: Option<String>,
}

impl Post {
    pub fn new(author_id: Uuid, text: String, group_id: Option<Uuid>, image: Option<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            text,
            pub_date: Utc::now(),
            author_id,
            group_id,
            image,
        }
    }

    /// First fifteen characters, used for titles and log lines.
    pub fn excerpt(&self) -> String {
        self.text.chars().take(15).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: Uuid, author_id: Uuid, text: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            post_id,
            author_id,
            text,
            created: Utc::now(),
        }
    }
}

/// Directed edge: `user_id` follows `author_id`. Unique per pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub author_id: Uuid,
}

/// A post joined with its author and group, as every listing renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostView {
    pub post: Post,
    pub author: UserSummary,
    pub group: Option<GroupSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentView {
    pub comment: Comment,
    pub author: UserSummary,
}

/// Selects which posts a listing query returns. Every variant is ordered
/// newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(Uuid),
    Author(Uuid),
    /// Posts by every author the given user follows.
    FollowedBy(Uuid),
}
