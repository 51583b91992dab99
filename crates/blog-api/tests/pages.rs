#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use blog_api::cache::PageCache;
use blog_core::pagination::PageRequest;
use common::TestApp;

fn card_count(body: &str) -> usize {
    body.matches("<article class=\"post\">").count()
}

#[actix_web::test]
async fn public_pages_answer_ok() {
    let t = TestApp::new().await;
    let author = t.user("leo").await;
    let group = t.group("cats", "Cats").await;
    let post = t.post(&author, "Hello cats", Some(&group)).await;
    let app = app!(t);

    for uri in [
        "/".to_string(),
        "/group/cats/".to_string(),
        "/profile/leo/".to_string(),
        format!("/posts/{}/", post.id),
        "/about/author/".to_string(),
        "/about/tech/".to_string(),
        "/auth/login/".to_string(),
        "/auth/signup/".to_string(),
    ] {
        let (status, _) = get_page!(app, &uri);
        assert_eq!(status, StatusCode::OK, "{uri}");
    }
}

#[actix_web::test]
async fn pages_render_their_content() {
    let t = TestApp::new().await;
    let author = t.user("leo").await;
    let group = t.group("cats", "Cats").await;
    let post = t.post(&author, "Hello cats", Some(&group)).await;
    let app = app!(t);

    let (_, index) = get_page!(app, "/");
    assert!(index.contains("Hello cats"));
    assert!(index.contains("/group/cats/"));

    let (_, group_page) = get_page!(app, "/group/cats/");
    assert!(group_page.contains("Cats"));
    assert!(group_page.contains("About Cats"));

    let (_, profile) = get_page!(app, "/profile/leo/");
    assert!(profile.contains("All posts by leo"));
    assert!(profile.contains("Posts: 1"));

    let (_, detail) = get_page!(app, &format!("/posts/{}/", post.id));
    assert!(detail.contains("Hello cats"));
    assert!(detail.contains("Posts by this author: 1"));
    // Anonymous viewers get neither the comment form nor the edit link.
    assert!(!detail.contains("Add a comment"));
    assert!(!detail.contains("Edit post"));
}

#[actix_web::test]
async fn post_text_is_escaped() {
    let t = TestApp::new().await;
    let author = t.user("leo").await;
    t.post(&author, "<script>alert(1)</script>\nsecond line", None).await;
    let app = app!(t);

    let (_, body) = get_page!(app, "/");
    assert!(!body.contains("<script>alert(1)</script>"));
    assert!(body.contains("&lt;script&gt;"));
    assert!(body.contains("<br>second line"));
}

#[actix_web::test]
async fn listings_paginate_by_ten() {
    let t = TestApp::new().await;
    let author = t.user("leo").await;
    let group = t.group("cats", "Cats").await;
    for i in 0..13 {
        t.post(&author, &format!("Post number {i}"), Some(&group)).await;
    }
    let app = app!(t);

    for base in ["/", "/group/cats/", "/profile/leo/"] {
        let (_, first) = get_page!(app, base);
        assert_eq!(card_count(&first), 10, "{base}");
        assert!(first.contains("?page=2"), "{base}");

        let (_, second) = get_page!(app, &format!("{base}?page=2"));
        assert_eq!(card_count(&second), 3, "{base}");

        // Past the end and garbage both land somewhere sensible.
        let (_, past) = get_page!(app, &format!("{base}?page=99"));
        assert_eq!(card_count(&past), 3, "{base}");
        let (_, garbage) = get_page!(app, &format!("{base}?page=abc"));
        assert_eq!(card_count(&garbage), 10, "{base}");
    }
}

#[actix_web::test]
async fn index_is_newest_first() {
    let t = TestApp::new().await;
    let author = t.user("leo").await;
    t.post(&author, "older post", None).await;
    t.post(&author, "newer post", None).await;
    let app = app!(t);

    let (_, body) = get_page!(app, "/");
    let newer = body.find("newer post").unwrap();
    let older = body.find("older post").unwrap();
    assert!(newer < older);
}

#[actix_web::test]
async fn index_is_cached_until_cleared() {
    let t = TestApp::new().await;
    let author = t.user("leo").await;
    let doomed = t.post(&author, "doomed post", None).await;
    let app = app!(t);

    let (_, before) = get_page!(app, "/");
    assert!(before.contains("doomed post"));

    t.repo().delete_post(doomed.id).await.unwrap();
    let (_, cached) = get_page!(app, "/");
    assert_eq!(cached, before);

    t.data.cache.clear();
    let (_, fresh) = get_page!(app, "/");
    assert!(!fresh.contains("doomed post"));
}

#[actix_web::test]
async fn new_posts_show_after_invalidation() {
    let t = TestApp::new().await;
    let author = t.user("leo").await;
    let app = app!(t);

    let (_, before) = get_page!(app, "/");
    t.post(&author, "fresh post", None).await;
    let (_, cached) = get_page!(app, "/");
    assert_eq!(cached, before);

    let key = PageCache::key_for("/", PageRequest::first(), None);
    assert!(t.data.cache.invalidate(&key));
    let (_, fresh) = get_page!(app, "/");
    assert!(fresh.contains("fresh post"));
}

#[actix_web::test]
async fn cached_index_is_per_viewer() {
    let t = TestApp::new().await;
    let author = t.user("leo").await;
    t.post(&author, "some post", None).await;
    let app = app!(t);

    let (_, anonymous) = get_page!(app, "/");
    assert!(!anonymous.contains("/auth/logout/"));

    let (_, signed_in) = get_page!(app, "/", t.session(&author));
    assert!(signed_in.contains("/auth/logout/"));
    assert_eq!(t.data.cache.len(), 2);
}

#[actix_web::test]
async fn unknown_pages_render_custom_404() {
    let t = TestApp::new().await;
    let app = app!(t);

    for uri in [
        "/unexisting_page/",
        "/group/no-such-group/",
        "/profile/nobody/",
        "/posts/not-a-uuid/",
        "/posts/0190a5b2-7c1e-7000-8000-000000000000/",
    ] {
        let (status, body) = get_page!(app, uri);
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert!(body.contains("Custom 404"), "{uri}");
    }

    let (_, body) = get_page!(app, "/unexisting_page/");
    assert!(body.contains("/unexisting_page/"));
}

#[actix_web::test]
async fn responses_carry_security_headers() {
    let t = TestApp::new().await;
    let app = app!(t);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(
        resp.headers().get("X-Content-Type-Options").unwrap(),
        "nosniff"
    );
    assert_eq!(resp.headers().get("X-Frame-Options").unwrap(), "DENY");
}

#[actix_web::test]
async fn extra_query_parameters_share_one_cache_entry() {
    let t = TestApp::new().await;
    let author = t.user("leo").await;
    t.post(&author, "only post", None).await;
    let app = app!(t);

    for i in 0..50 {
        let (status, _) = get_page!(app, format!("/?page=1&junk={i}"));
        assert_eq!(status, StatusCode::OK);
    }
    let (_, _) = get_page!(app, "/?page=abc");
    assert_eq!(t.data.cache.len(), 1);
}
