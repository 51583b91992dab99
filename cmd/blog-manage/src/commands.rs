use anyhow::{bail, Context};
use blog_core::forms::SignupForm;
use blog_core::models::{Group, PostFilter, User};
use blog_core::services::{accounts, Submission};
use blog_core::traits::{AuthProvider, BlogRepo, MediaStore};
use uuid::Uuid;

/// Applies to both slug and title.
const MAX_LEN: usize = 200;

fn valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_LEN
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

pub async fn create_group(
    repo: &dyn BlogRepo,
    slug: &str,
    title: &str,
    description: &str,
) -> anyhow::Result<Group> {
    if !valid_slug(slug) {
        bail!("slug must be 1 to {MAX_LEN} letters, digits, hyphens or underscores");
    }
    let title = title.trim();
    if title.is_empty() || title.chars().count() > MAX_LEN {
        bail!("title must be between 1 and {MAX_LEN} characters");
    }
    if repo.get_group(slug).await?.is_some() {
        bail!("group {slug} already exists");
    }

    let group = Group::new(slug.to_string(), title.to_string(), description.to_string());
    repo.create_group(group.clone()).await?;
    log::info!("created group {}", group.slug);
    Ok(group)
}

pub async fn delete_group(repo: &dyn BlogRepo, slug: &str) -> anyhow::Result<()> {
    let group = repo
        .get_group(slug)
        .await?
        .with_context(|| format!("no group {slug}"))?;
    repo.delete_group(group.id).await?;
    Ok(())
}

pub async fn create_user(
    repo: &dyn BlogRepo,
    auth: &dyn AuthProvider,
    username: &str,
    password: &str,
) -> anyhow::Result<User> {
    let form = SignupForm {
        username: username.to_string(),
        password1: password.to_string(),
        password2: password.to_string(),
    };
    match accounts::signup(repo, auth, &form).await? {
        Submission::Saved(user) => Ok(user),
        Submission::Invalid(errors) => {
            let messages: Vec<String> = errors
                .iter()
                .flat_map(|(field, msgs)| msgs.iter().map(move |m| format!("{field}: {m}")))
                .collect();
            bail!("{}", messages.join("; "))
        }
    }
}

async fn remove_image(store: &dyn MediaStore, image: Option<&str>) {
    if let Some(id) = image {
        if let Err(e) = store.delete(id).await {
            log::warn!("could not delete media {id}: {e}");
        }
    }
}

/// Returns how many posts went with the user.
pub async fn delete_user(
    repo: &dyn BlogRepo,
    store: &dyn MediaStore,
    username: &str,
) -> anyhow::Result<i64> {
    let user = repo
        .get_user_by_username(username)
        .await?
        .with_context(|| format!("no user {username}"))?;

    let filter = PostFilter::Author(user.id);
    let total = repo.count_posts(filter).await?;
    for view in repo.list_posts(filter, total, 0).await? {
        remove_image(store, view.post.image.as_deref()).await;
    }
    repo.delete_user(user.id).await?;
    Ok(total)
}

pub async fn delete_post(
    repo: &dyn BlogRepo,
    store: &dyn MediaStore,
    id: Uuid,
) -> anyhow::Result<()> {
    let view = repo
        .get_post(id)
        .await?
        .with_context(|| format!("no post {id}"))?;
    repo.delete_post(id).await?;
    remove_image(store, view.post.image.as_deref()).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use blog_auth_simple::SimpleAuthProvider;
    use blog_core::models::Post;
    use blog_db_sqlite::SqliteBlogRepo;
    use blog_storage_local::LocalMediaStore;

    async fn repo() -> SqliteBlogRepo {
        SqliteBlogRepo::new("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_create_group_rejects_bad_slugs_and_duplicates() {
        let repo = repo().await;
        assert!(create_group(&repo, "no spaces", "Title", "").await.is_err());
        assert!(create_group(&repo, "cats", "  ", "").await.is_err());

        let group = create_group(&repo, "cats", "Cats", "All about cats")
            .await
            .unwrap();
        assert_eq!(repo.get_group("cats").await.unwrap(), Some(group));
        assert!(create_group(&repo, "cats", "Other", "").await.is_err());
    }

    #[tokio::test]
    async fn test_delete_group_keeps_posts() {
        let repo = repo().await;
        let auth = SimpleAuthProvider::new("secret").unwrap();
        let user = create_user(&repo, &auth, "leo", "long-enough-pw").await.unwrap();
        let group = create_group(&repo, "cats", "Cats", "").await.unwrap();
        let post = Post::new(user.id, "in a group".into(), Some(group.id), None);
        repo.create_post(post.clone()).await.unwrap();

        delete_group(&repo, "cats").await.unwrap();
        let kept = repo.get_post(post.id).await.unwrap().unwrap();
        assert!(kept.group.is_none());
        assert!(delete_group(&repo, "cats").await.is_err());
    }

    #[tokio::test]
    async fn test_create_user_applies_signup_rules() {
        let repo = repo().await;
        let auth = SimpleAuthProvider::new("secret").unwrap();

        assert!(create_user(&repo, &auth, "leo", "short").await.is_err());
        let user = create_user(&repo, &auth, "leo", "long-enough-pw").await.unwrap();
        assert!(auth.verify_password("long-enough-pw", &user.password_hash).await);
        assert!(create_user(&repo, &auth, "leo", "long-enough-pw").await.is_err());
    }

    #[tokio::test]
    async fn test_delete_post_and_user_remove_media() {
        let repo = repo().await;
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path().to_path_buf(), "/media".into());
        let auth = SimpleAuthProvider::new("secret").unwrap();
        let user = create_user(&repo, &auth, "leo", "long-enough-pw").await.unwrap();

        let image_path = dir.path().join("posts/a.png");
        std::fs::create_dir_all(image_path.parent().unwrap()).unwrap();
        std::fs::write(&image_path, b"png").unwrap();
        let with_image = Post::new(user.id, "pic".into(), None, Some("posts/a.png".into()));
        let plain = Post::new(user.id, "text".into(), None, None);
        repo.create_post(with_image.clone()).await.unwrap();
        repo.create_post(plain.clone()).await.unwrap();

        delete_post(&repo, &store, with_image.id).await.unwrap();
        assert!(repo.get_post(with_image.id).await.unwrap().is_none());
        assert!(!image_path.exists());

        assert_eq!(delete_user(&repo, &store, "leo").await.unwrap(), 1);
        assert!(repo.get_post(plain.id).await.unwrap().is_none());
        assert!(delete_user(&repo, &store, "leo").await.is_err());
    }
}
