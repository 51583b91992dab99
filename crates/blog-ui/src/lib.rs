//! Server-rendered pages. One template struct per page; handlers build them
//! from view models and call `render()`.

use askama::Template;
use blog_core::models::{Group, UserSummary};

pub mod view;

pub use view::{CommentItem, GroupLink, GroupOption, Layout, PageLink, PageNav, PostCard};

#[derive(Template)]
#[template(path = "posts/index.html")]
pub struct IndexTemplate {
    pub layout: Layout,
    pub posts: Vec<PostCard>,
    pub nav: PageNav,
}

#[derive(Template)]
#[template(path = "posts/group_list.html")]
pub struct GroupListTemplate {
    pub layout: Layout,
    pub group: Group,
    pub posts: Vec<PostCard>,
    pub nav: PageNav,
}

#[derive(Template)]
#[template(path = "posts/profile.html")]
pub struct ProfileTemplate {
    pub layout: Layout,
    pub author: UserSummary,
    pub post_count: u64,
    pub following: bool,
    /// False for anonymous viewers and for the author's own profile.
    pub can_follow: bool,
    pub posts: Vec<PostCard>,
    pub nav: PageNav,
}

#[derive(Template)]
#[template(path = "posts/post_detail.html")]
pub struct PostDetailTemplate {
    pub layout: Layout,
    pub post: PostCard,
    pub author_post_count: u64,
    pub comments: Vec<CommentItem>,
    pub can_edit: bool,
}

/// Shared by `/create/` and `/posts/<id>/edit/`.
#[derive(Template)]
#[template(path = "posts/create_post.html")]
pub struct CreatePostTemplate {
    pub layout: Layout,
    pub is_edit: bool,
    pub post_id: String,
    pub text: String,
    pub groups: Vec<GroupOption>,
    pub current_image: Option<String>,
    pub text_errors: Vec<String>,
    pub group_errors: Vec<String>,
    pub image_errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "posts/follow.html")]
pub struct FollowTemplate {
    pub layout: Layout,
    pub posts: Vec<PostCard>,
    pub nav: PageNav,
}

#[derive(Template)]
#[template(path = "core/404.html")]
pub struct NotFoundTemplate {
    pub layout: Layout,
    /// The unmatched path; `None` when a lookup inside a valid route failed.
    pub path: Option<String>,
}

#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub username: String,
    pub next: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub layout: Layout,
    pub username: String,
    pub username_errors: Vec<String>,
    pub password1_errors: Vec<String>,
    pub password2_errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "about/author.html")]
pub struct AboutAuthorTemplate {
    pub layout: Layout,
}

#[derive(Template)]
#[template(path = "about/tech.html")]
pub struct AboutTechTemplate {
    pub layout: Layout,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(text: &str) -> PostCard {
        PostCard {
            id: uuid::Uuid::now_v7().to_string(),
            text_html: view::linebreaks(text),
            excerpt: text.chars().take(15).collect(),
            pub_date: "1 January 2024".into(),
            author: "leo".into(),
            group: Some(GroupLink {
                slug: "cats".into(),
                title: "Cats".into(),
            }),
            image_url: None,
            thumbnail_url: None,
        }
    }

    fn single_page() -> PageNav {
        PageNav {
            number: 1,
            num_pages: 1,
            previous: None,
            next: None,
            pages: vec![PageLink {
                number: 1,
                current: true,
            }],
        }
    }

    #[test]
    fn test_index_renders_escaped_posts() {
        let html = IndexTemplate {
            layout: Layout::new(None),
            posts: vec![card("<script>alert(1)</script>")],
            nav: single_page(),
        }
        .render()
        .unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("/group/cats/"));
        assert!(html.contains("/profile/leo/"));
    }

    #[test]
    fn test_layout_shows_viewer() {
        let viewer = UserSummary {
            id: uuid::Uuid::now_v7(),
            username: "leo".into(),
        };
        let html = AboutTechTemplate {
            layout: Layout::new(Some(viewer)),
        }
        .render()
        .unwrap();
        assert!(html.contains("/auth/logout/"));
        assert!(html.contains("leo"));
    }

    #[test]
    fn test_edit_form_title() {
        let html = CreatePostTemplate {
            layout: Layout::new(None),
            is_edit: true,
            post_id: "abc".into(),
            text: "old text".into(),
            groups: Vec::new(),
            current_image: None,
            text_errors: vec!["This field is required.".into()],
            group_errors: Vec::new(),
            image_errors: Vec::new(),
        }
        .render()
        .unwrap();
        assert!(html.contains("Edit post"));
        assert!(html.contains("/posts/abc/edit/"));
        assert!(html.contains("This field is required."));
    }
}
