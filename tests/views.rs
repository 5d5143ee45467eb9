mod common;

use axum::http::StatusCode;
use common::{TestApp, POSTS_IN_GROUP};
use yatube::{db::Repository, models::NewPost};

#[tokio::test]
async fn test_pages_use_correct_templates() {
    let app = TestApp::new().await;
    let session = app.login(&app.author).await;
    let post_id = app.latest_post().id;

    let pages = [
        ("/".to_string(), "posts/index.html"),
        ("/group/test_slug/".to_string(), "posts/group_list.html"),
        ("/profile/slava/".to_string(), "posts/profile.html"),
        (format!("/posts/{}/", post_id), "posts/post_detail.html"),
        ("/create/".to_string(), "posts/create_post.html"),
        (format!("/posts/{}/edit/", post_id), "posts/create_post.html"),
        ("/auth/login/".to_string(), "users/login.html"),
        ("/auth/signup/".to_string(), "users/signup.html"),
    ];

    for (uri, template) in pages {
        let response = app.get(&uri, Some(session)).await;
        assert_eq!(response.status, StatusCode::OK, "GET {}", uri);
        assert_eq!(response.template(), Some(template), "GET {}", uri);
    }
}

#[tokio::test]
async fn test_unknown_page_returns_404_template() {
    let app = TestApp::new().await;

    let response = app.get("/unexisting_page/", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.template(), Some("core/404.html"));
}

#[tokio::test]
async fn test_missing_objects_return_404() {
    let app = TestApp::new().await;

    for uri in [
        "/group/no_such_group/",
        "/profile/nobody/",
        "/posts/100500/",
        "/posts/not-a-number/",
    ] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "GET {}", uri);
        assert_eq!(response.template(), Some("core/404.html"), "GET {}", uri);
    }
}

#[tokio::test]
async fn test_listing_pages_show_first_post_context() {
    let app = TestApp::new().await;
    let latest = app.latest_post();

    for uri in ["/", "/group/test_slug/", "/profile/slava/"] {
        let response = app.get(uri, None).await;
        let first_card = response
            .body
            .split("class=\"post-card\"")
            .nth(1)
            .expect("at least one post card");

        assert!(first_card.contains(&latest.text), "GET {}", uri);
        assert!(first_card.contains("Слава Тестов"), "GET {}", uri);
        assert!(first_card.contains("/group/test_slug/"), "GET {}", uri);
        assert!(first_card.contains(&format!("/posts/{}/", latest.id)), "GET {}", uri);
    }
}

#[tokio::test]
async fn test_group_and_profile_headers() {
    let app = TestApp::new().await;

    let group_page = app.get("/group/test_slug/", None).await;
    assert!(group_page.body.contains("Записи сообщества Тестовая группа"));
    assert!(group_page.body.contains("Тестовое описание"));

    let profile_page = app.get("/profile/slava/", None).await;
    assert!(profile_page.body.contains("Все посты пользователя Слава Тестов"));
    assert!(profile_page
        .body
        .contains(&format!("Всего постов: {}", POSTS_IN_GROUP)));
}

#[tokio::test]
async fn test_paginator_splits_posts_into_pages() {
    let app = TestApp::new().await;

    for uri in ["/", "/group/test_slug/", "/profile/slava/"] {
        let first = app.get(uri, None).await;
        assert_eq!(first.post_cards(), 10, "GET {}", uri);

        let second = app.get(&format!("{}?page=2", uri), None).await;
        assert_eq!(second.post_cards(), POSTS_IN_GROUP - 10, "GET {}?page=2", uri);
    }
}

#[tokio::test]
async fn test_paginator_tolerates_odd_page_numbers() {
    let app = TestApp::new().await;

    let not_a_number = app.get("/?page=abc", None).await;
    assert_eq!(not_a_number.status, StatusCode::OK);
    assert_eq!(not_a_number.post_cards(), 10);

    let past_the_end = app.get("/?page=99", None).await;
    assert_eq!(past_the_end.status, StatusCode::OK);
    assert_eq!(past_the_end.post_cards(), 3);

    let empty_group = app.get("/group/other_slug/", None).await;
    assert_eq!(empty_group.status, StatusCode::OK);
    assert_eq!(empty_group.post_cards(), 0);
}

#[tokio::test]
async fn test_new_post_shows_on_its_pages_only() {
    let app = TestApp::new().await;
    let text = "Пост для проверки групп";

    app.repo
        .create_post(NewPost {
            text: text.to_string(),
            author_id: app.author.id,
            group_id: Some(app.group.id),
        })
        .await
        .expect("create post");

    for uri in ["/", "/group/test_slug/", "/profile/slava/"] {
        let response = app.get(uri, None).await;
        assert!(response.body.contains(text), "post missing on {}", uri);
    }

    let other = app.get("/group/other_slug/", None).await;
    assert!(!other.body.contains(text));
}

#[tokio::test]
async fn test_post_detail_context() {
    let app = TestApp::new().await;
    let post = &app.posts[1];

    let response = app.get(&format!("/posts/{}/", post.id), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("<title>Пост Тестовый пост-1</title>"));
    assert!(response.body.contains(&post.text));
    assert!(response
        .body
        .contains(&format!("<span class=\"posts-count\">{}</span>", POSTS_IN_GROUP)));
    // Anonymous visitors get neither the edit link nor the comment form
    assert!(!response.body.contains("edit-link"));
    assert!(!response.body.contains("id_comment_text"));
}

#[tokio::test]
async fn test_post_detail_edit_link_for_author_only() {
    let app = TestApp::new().await;
    let post_id = app.latest_post().id;

    let author_session = app.login(&app.author).await;
    let as_author = app.get(&format!("/posts/{}/", post_id), Some(author_session)).await;
    assert!(as_author.body.contains(&format!("/posts/{}/edit/", post_id)));
    assert!(as_author.body.contains("id_comment_text"));

    let reader = app.create_user("reader").await;
    let reader_session = app.login(&reader).await;
    let as_reader = app.get(&format!("/posts/{}/", post_id), Some(reader_session)).await;
    assert!(!as_reader.body.contains("edit-link"));
    assert!(as_reader.body.contains("id_comment_text"));
}

#[tokio::test]
async fn test_create_form_fields() {
    let app = TestApp::new().await;
    let session = app.login(&app.author).await;

    let response = app.get("/create/", Some(session)).await;
    assert!(response.body.contains("<textarea name=\"text\""));
    assert!(response.body.contains("<select name=\"group\""));
    assert!(response.body.contains("Здесь можно написать свой великолепный пост"));
    assert!(response.body.contains("Тестовая группа"));
    assert!(response.body.contains("Другая группа"));
    assert!(response.body.contains("Новый пост"));
}

#[tokio::test]
async fn test_edit_form_is_bound_to_post() {
    let app = TestApp::new().await;
    let session = app.login(&app.author).await;
    let post = app.latest_post();

    let response = app.get(&format!("/posts/{}/edit/", post.id), Some(session)).await;
    assert!(response.body.contains(&format!(">{}</textarea>", post.text)));
    assert!(response
        .body
        .contains(&format!("<option value=\"{}\" selected>", app.group.id)));
    assert!(response.body.contains("Редактировать пост"));
}

#[tokio::test]
async fn test_nav_reflects_session() {
    let app = TestApp::new().await;

    let anonymous = app.get("/", None).await;
    assert!(anonymous.body.contains("/auth/login/"));
    assert!(!anonymous.body.contains("Новая запись"));

    let session = app.login(&app.author).await;
    let logged_in = app.get("/", Some(session)).await;
    assert!(logged_in.body.contains("Новая запись"));
    assert!(logged_in.body.contains("/profile/slava/"));
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;

    let response = app.get("/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&response.body).expect("json body");
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_profile_links_survive_dot_usernames() {
    let app = TestApp::new().await;
    let dots = app.create_user("..").await;
    app.repo
        .create_post(NewPost {
            text: "Пост от точек".to_string(),
            author_id: dots.id,
            group_id: None,
        })
        .await
        .expect("create post");

    let index = app.get("/", None).await;
    assert!(index.body.contains("href=\"/profile/%2E%2E/\""));
    assert!(!index.body.contains("href=\"/profile/../\""));

    let session = app.login(&dots).await;
    let logged_in = app.get("/", Some(session)).await;
    assert!(logged_in.body.contains("<a href=\"/profile/%2E%2E/\">..</a>"));

    let profile = app.get("/profile/%2E%2E/", None).await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.template(), Some("posts/profile.html"));
    assert!(profile.body.contains("Пост от точек"));
}
