#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use tower::ServiceExt;
use uuid::Uuid;

use yatube::{
    db::Repository,
    models::{Group, NewGroup, NewPost, NewUser, Post, User},
    AppState, MemoryStore,
};

pub const POSTS_IN_GROUP: usize = 13;

/// Router over an in-memory store holding one author, two groups and
/// thirteen posts by that author in the first group.
pub struct TestApp {
    pub router: Router,
    pub repo: Arc<MemoryStore>,
    pub author: User,
    pub group: Group,
    pub other_group: Group,
    pub posts: Vec<Post>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub set_cookie: Vec<String>,
    pub body: String,
}

impl TestResponse {
    /// Template named by the `data-template` attribute of `<body>`.
    pub fn template(&self) -> Option<&str> {
        let start = self.body.find("data-template=\"")? + "data-template=\"".len();
        let end = self.body[start..].find('"')?;
        Some(&self.body[start..start + end])
    }

    pub fn post_cards(&self) -> usize {
        self.body.matches("class=\"post-card\"").count()
    }

    pub fn session_cookie(&self) -> Option<Uuid> {
        self.set_cookie.iter().find_map(|cookie| {
            let value = cookie.strip_prefix("sessionid=")?;
            let token = value.split(';').next()?;
            Uuid::parse_str(token).ok()
        })
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let repo = Arc::new(MemoryStore::new());

        let author = repo
            .create_user(NewUser::new("slava", "unusable").with_name("Слава", "Тестов"))
            .await
            .expect("create author");
        let group = repo
            .create_group(NewGroup::new("Тестовая группа", "test_slug", "Тестовое описание"))
            .await
            .expect("create group");
        let other_group = repo
            .create_group(NewGroup::new("Другая группа", "other_slug", "Без постов"))
            .await
            .expect("create other group");

        let mut posts = Vec::with_capacity(POSTS_IN_GROUP);
        for i in 0..POSTS_IN_GROUP {
            let post = repo
                .create_post(NewPost {
                    text: format!("Тестовый пост-{}", i),
                    author_id: author.id,
                    group_id: Some(group.id),
                })
                .await
                .expect("create post");
            posts.push(post);
        }

        let state = AppState::new(repo.clone());
        let router = yatube::create_router(state, std::time::Duration::from_secs(10));

        TestApp {
            router,
            repo,
            author,
            group,
            other_group,
            posts,
        }
    }

    /// The post created last, shown first on every listing.
    pub fn latest_post(&self) -> &Post {
        self.posts.last().expect("fixture has posts")
    }

    pub async fn create_user(&self, username: &str) -> User {
        self.repo
            .create_user(NewUser::new(username, "unusable"))
            .await
            .expect("create user")
    }

    /// Session token for `user`, as if they had logged in.
    pub async fn login(&self, user: &User) -> Uuid {
        self.repo
            .create_session(user.id)
            .await
            .expect("create session")
            .token
    }

    pub async fn post_count(&self) -> usize {
        self.repo
            .count_posts(yatube::models::PostFilter::All)
            .await
            .expect("count posts")
    }

    pub async fn get(&self, uri: &str, session: Option<Uuid>) -> TestResponse {
        let mut request = Request::builder().method("GET").uri(uri);
        if let Some(token) = session {
            request = request.header(header::COOKIE, format!("sessionid={}", token));
        }
        self.send(request.body(Body::empty()).expect("build request")).await
    }

    pub async fn post_form(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        session: Option<Uuid>,
    ) -> TestResponse {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(token) = session {
            request = request.header(header::COOKIE, format!("sessionid={}", token));
        }
        let body = encode_form(fields);
        self.send(request.body(Body::from(body)).expect("build request")).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let set_cookie = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();

        TestResponse {
            status,
            location,
            set_cookie,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

pub fn encode_form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(name, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(name, NON_ALPHANUMERIC),
                utf8_percent_encode(value, NON_ALPHANUMERIC)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}
