//! # blog-db-sqlite Implementation
//!
//! Maps the SQLite relational model onto the `blog-core` domain models.
//! Ids are stored as 16-byte BLOBs; timestamps as the RFC 3339 text sqlx
//! writes for `chrono` values, which sorts chronologically.

use std::str::FromStr;

use async_trait::async_trait;
use blog_core::models::{
    Comment, CommentView, Group, GroupSummary, Post, PostFilter, PostView, User, UserSummary,
};
use blog_core::traits::BlogRepo;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

pub struct SqliteBlogRepo {
    pool: SqlitePool,
}

impl SqliteBlogRepo {
    /// Opens (creating if needed) the database at `database_url` and applies
    /// pending migrations.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to `:memory:` is a separate database, so keep
        // exactly one alive for the life of the pool.
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        log::info!("connected to {database_url}");
        Ok(Self { pool })
    }
}

// Helpers for UUID conversion
fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn uuid_column(row: &SqliteRow, column: &str) -> anyhow::Result<Uuid> {
    let blob: Vec<u8> = row.try_get(column)?;
    Ok(Uuid::from_slice(&blob)?)
}

fn optional_uuid_column(row: &SqliteRow, column: &str) -> anyhow::Result<Option<Uuid>> {
    let blob: Option<Vec<u8>> = row.try_get(column)?;
    Ok(blob.map(|b| Uuid::from_slice(&b)).transpose()?)
}

fn user_from_row(row: &SqliteRow) -> anyhow::Result<User> {
    Ok(User {
        id: uuid_column(row, "id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
    })
}

fn group_from_row(row: &SqliteRow) -> anyhow::Result<Group> {
    Ok(Group {
        id: uuid_column(row, "id")?,
        slug: row.try_get("slug")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
    })
}

/// Posts joined with their author and (optional) group.
const POST_VIEW_SELECT: &str = "SELECT p.id, p.text, p.pub_date, p.author_id, p.group_id, p.image, \
     u.username AS author_username, g.slug AS group_slug, g.title AS group_title \
     FROM posts p \
     JOIN users u ON u.id = p.author_id \
     LEFT JOIN post_groups g ON g.id = p.group_id";

const NEWEST_FIRST: &str = "ORDER BY p.pub_date DESC, p.id DESC";

/// Extra joins and WHERE clause for a filter, plus the id to bind.
fn filter_clause(filter: PostFilter) -> (&'static str, Option<Uuid>) {
    match filter {
        PostFilter::All => ("", None),
        PostFilter::Group(id) => ("WHERE p.group_id = ?", Some(id)),
        PostFilter::Author(id) => ("WHERE p.author_id = ?", Some(id)),
        PostFilter::FollowedBy(id) => (
            "JOIN follows f ON f.author_id = p.author_id WHERE f.user_id = ?",
            Some(id),
        ),
    }
}

fn post_view_from_row(row: &SqliteRow) -> anyhow::Result<PostView> {
    let author_id = uuid_column(row, "author_id")?;
    let group_id = optional_uuid_column(row, "group_id")?;
    let group = match group_id {
        Some(id) => Some(GroupSummary {
            id,
            slug: row.try_get("group_slug")?,
            title: row.try_get("group_title")?,
        }),
        None => None,
    };

    Ok(PostView {
        post: Post {
            id: uuid_column(row, "id")?,
            text: row.try_get("text")?,
            pub_date: row.try_get("pub_date")?,
            author_id,
            group_id,
            image: row.try_get("image")?,
        },
        author: UserSummary {
            id: author_id,
            username: row.try_get("author_username")?,
        },
        group,
    })
}

#[async_trait]
impl BlogRepo for SqliteBlogRepo {
    async fn create_user(&self, user: User) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO users (id, username, password_hash, created_at) VALUES (?, ?, ?, ?)")
            .bind(uuid_to_blob(user.id))
            .bind(user.username)
            .bind(user.password_hash)
            .bind(user.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let row = sqlx::query("SELECT id, username, password_hash, created_at FROM users WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn get_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn delete_user(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_group(&self, group: Group) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO post_groups (id, slug, title, description) VALUES (?, ?, ?, ?)")
            .bind(uuid_to_blob(group.id))
            .bind(group.slug)
            .bind(group.title)
            .bind(group.description)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_group(&self, slug: &str) -> anyhow::Result<Option<Group>> {
        let row = sqlx::query("SELECT id, slug, title, description FROM post_groups WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(group_from_row).transpose()
    }

    async fn list_groups(&self) -> anyhow::Result<Vec<Group>> {
        sqlx::query("SELECT id, slug, title, description FROM post_groups ORDER BY title")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(group_from_row)
            .collect()
    }

    async fn delete_group(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM post_groups WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_post(&self, post: Post) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO posts (id, text, pub_date, author_id, group_id, image) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(post.id))
        .bind(post.text)
        .bind(post.pub_date)
        .bind(uuid_to_blob(post.author_id))
        .bind(post.group_id.map(uuid_to_blob))
        .bind(post.image)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_post(&self, post: &Post) -> anyhow::Result<()> {
        let result = sqlx::query("UPDATE posts SET text = ?, group_id = ?, image = ? WHERE id = ?")
            .bind(&post.text)
            .bind(post.group_id.map(uuid_to_blob))
            .bind(&post.image)
            .bind(uuid_to_blob(post.id))
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            anyhow::bail!("post {} vanished before it could be updated", post.id);
        }
        Ok(())
    }

    async fn get_post(&self, id: Uuid) -> anyhow::Result<Option<PostView>> {
        let sql = format!("{POST_VIEW_SELECT} WHERE p.id = ?");
        let row = sqlx::query(&sql)
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(post_view_from_row).transpose()
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<PostView>> {
        let (clause, param) = filter_clause(filter);
        let sql = format!("{POST_VIEW_SELECT} {clause} {NEWEST_FIRST} LIMIT ? OFFSET ?");

        let mut query = sqlx::query(&sql);
        if let Some(id) = param {
            query = query.bind(uuid_to_blob(id));
        }
        query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(post_view_from_row)
            .collect()
    }

    async fn count_posts(&self, filter: PostFilter) -> anyhow::Result<i64> {
        let (clause, param) = filter_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM posts p {clause}");

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        if let Some(id) = param {
            query = query.bind(uuid_to_blob(id));
        }
        Ok(query.fetch_one(&self.pool).await?)
    }

    async fn delete_post(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_comment(&self, comment: Comment) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO comments (id, post_id, author_id, text, created) VALUES (?, ?, ?, ?, ?)")
            .bind(uuid_to_blob(comment.id))
            .bind(uuid_to_blob(comment.post_id))
            .bind(uuid_to_blob(comment.author_id))
            .bind(comment.text)
            .bind(comment.created)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_comments(&self, post_id: Uuid) -> anyhow::Result<Vec<CommentView>> {
        let rows = sqlx::query(
            "SELECT c.id, c.post_id, c.author_id, c.text, c.created, u.username AS author_username \
             FROM comments c JOIN users u ON u.id = c.author_id \
             WHERE c.post_id = ? ORDER BY c.created DESC, c.id DESC",
        )
        .bind(uuid_to_blob(post_id))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let author_id = uuid_column(row, "author_id")?;
                Ok(CommentView {
                    comment: Comment {
                        id: uuid_column(row, "id")?,
                        post_id: uuid_column(row, "post_id")?,
                        author_id,
                        text: row.try_get("text")?,
                        created: row.try_get("created")?,
                    },
                    author: UserSummary {
                        id: author_id,
                        username: row.try_get("author_username")?,
                    },
                })
            })
            .collect()
    }

    /// The unique pair constraint makes a concurrent double follow collapse
    /// into one row.
    async fn create_follow(&self, user_id: Uuid, author_id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "INSERT INTO follows (id, user_id, author_id) VALUES (?, ?, ?) \
             ON CONFLICT (user_id, author_id) DO NOTHING",
        )
        .bind(uuid_to_blob(Uuid::now_v7()))
        .bind(uuid_to_blob(user_id))
        .bind(uuid_to_blob(author_id))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_follow(&self, user_id: Uuid, author_id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE user_id = ? AND author_id = ?")
            .bind(uuid_to_blob(user_id))
            .bind(uuid_to_blob(author_id))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn is_following(&self, user_id: Uuid, author_id: Uuid) -> anyhow::Result<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM follows WHERE user_id = ? AND author_id = ?")
                .bind(uuid_to_blob(user_id))
                .bind(uuid_to_blob(author_id))
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }
}
