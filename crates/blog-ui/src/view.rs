//! View models: the already-formatted values templates print.

use blog_core::models::{CommentView, Group, PostView, UserSummary};
use blog_core::pagination::PageMeta;
use blog_core::traits::MediaStore;
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

/// Context every page layout needs.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub viewer: Option<UserSummary>,
    /// Printed in the footer.
    pub year: i32,
}

impl Layout {
    pub fn new(viewer: Option<UserSummary>) -> Self {
        Self {
            viewer,
            year: Utc::now().year(),
        }
    }
}

/// Escapes `text` and turns newlines into `<br>`. The result is safe to emit
/// unescaped.
pub fn linebreaks(text: &str) -> String {
    html_escape::encode_text(text)
        .replace("\r\n", "\n")
        .replace('\n', "<br>")
}

fn display_date(date: &DateTime<Utc>) -> String {
    date.format("%-d %B %Y").to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupLink {
    pub slug: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostCard {
    pub id: String,
    /// Escaped text with `<br>` line breaks.
    pub text_html: String,
    pub excerpt: String,
    pub pub_date: String,
    pub author: String,
    pub group: Option<GroupLink>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl PostCard {
    pub fn new(view: &PostView, media: &dyn MediaStore) -> Self {
        let post = &view.post;
        Self {
            id: post.id.to_string(),
            text_html: linebreaks(&post.text),
            excerpt: post.excerpt(),
            pub_date: display_date(&post.pub_date),
            author: view.author.username.clone(),
            group: view.group.as_ref().map(|g| GroupLink {
                slug: g.slug.clone(),
                title: g.title.clone(),
            }),
            image_url: post.image.as_deref().map(|id| media.get_url(id)),
            thumbnail_url: post.image.as_deref().map(|id| media.get_thumbnail_url(id)),
        }
    }

    pub fn many(views: &[PostView], media: &dyn MediaStore) -> Vec<Self> {
        views.iter().map(|view| PostCard::new(view, media)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentItem {
    pub author: String,
    pub text_html: String,
    pub created: String,
}

impl From<&CommentView> for CommentItem {
    fn from(view: &CommentView) -> Self {
        Self {
            author: view.author.username.clone(),
            text_html: linebreaks(&view.comment.text),
            created: display_date(&view.comment.created),
        }
    }
}

/// Paginator links under a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageNav {
    pub number: u64,
    pub num_pages: u64,
    pub previous: Option<u64>,
    pub next: Option<u64>,
    pub pages: Vec<PageLink>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLink {
    pub number: u64,
    pub current: bool,
}

impl From<&PageMeta> for PageNav {
    fn from(meta: &PageMeta) -> Self {
        Self {
            number: meta.number,
            num_pages: meta.num_pages,
            previous: meta.previous_page_number(),
            next: meta.next_page_number(),
            pages: meta
                .page_range()
                .map(|number| PageLink {
                    number,
                    current: number == meta.number,
                })
                .collect(),
        }
    }
}

impl PageNav {
    /// Hidden when everything fits on one page.
    pub fn is_needed(&self) -> bool {
        self.num_pages > 1
    }
}

/// One option of the group select box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupOption {
    pub id: String,
    pub title: String,
    pub selected: bool,
}

impl GroupOption {
    /// `selected` is the raw submitted (or stored) group id.
    pub fn list(groups: &[Group], selected: &str) -> Vec<Self> {
        groups
            .iter()
            .map(|g| {
                let id = g.id.to_string();
                GroupOption {
                    selected: id == selected,
                    id,
                    title: g.title.clone(),
                }
            })
            .collect()
    }
}
