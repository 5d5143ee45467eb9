//! Askama templates and the flat view models they render.
//!
//! Page structs mirror the context each handler passes to its template; the
//! template files live under `templates/` and every one of them reports its
//! own name in the `data-template` attribute of `<body>`.

use askama::Template;
use chrono::{DateTime, Utc};

use crate::{
    forms::{CommentForm, FieldMeta, LoginForm, PostForm, SignupForm},
    handlers::profile_url,
    models::{CommentView, Group, PostView, User},
    pagination::Page,
};

/// Header state: who is logged in.
#[derive(Debug, Clone, Default)]
pub struct Nav {
    pub is_authenticated: bool,
    pub username: String,
    pub profile_url: String,
}

impl Nav {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_user(user: Option<&User>) -> Self {
        match user {
            Some(user) => Nav {
                is_authenticated: true,
                username: user.username.clone(),
                profile_url: profile_url(&user.username),
            },
            None => Self::anonymous(),
        }
    }
}

/// A post as shown in listings and on its own page.
#[derive(Debug, Clone)]
pub struct PostCard {
    pub id: i64,
    pub text: String,
    pub pub_date: String,
    pub author_url: String,
    pub author_name: String,
    pub has_group: bool,
    pub group_title: String,
    pub group_slug: String,
}

impl From<PostView> for PostCard {
    fn from(post: PostView) -> Self {
        PostCard {
            id: post.id,
            text: post.text,
            pub_date: format_date(&post.pub_date),
            author_url: profile_url(&post.author.username),
            author_name: post.author.display_name().to_string(),
            has_group: post.group.is_some(),
            group_title: post.group.as_ref().map(|g| g.title.clone()).unwrap_or_default(),
            group_slug: post.group.as_ref().map(|g| g.slug.clone()).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommentCard {
    pub text: String,
    pub created: String,
    pub author_url: String,
    pub author_name: String,
}

impl From<CommentView> for CommentCard {
    fn from(comment: CommentView) -> Self {
        CommentCard {
            text: comment.text,
            created: format_date(&comment.created),
            author_url: profile_url(&comment.author.username),
            author_name: comment.author.display_name().to_string(),
        }
    }
}

/// Author block of the profile page.
#[derive(Debug, Clone)]
pub struct AuthorView {
    pub id: i64,
    pub username: String,
    pub display_name: String,
}

impl From<&User> for AuthorView {
    fn from(user: &User) -> Self {
        AuthorView {
            id: user.id,
            username: user.username.clone(),
            display_name: user.display_name(),
        }
    }
}

pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%d.%m.%Y %H:%M").to_string()
}

#[derive(Template)]
#[template(path = "posts/index.html")]
pub struct IndexTemplate {
    pub nav: Nav,
    pub page_obj: Page<PostCard>,
}

#[derive(Template)]
#[template(path = "posts/group_list.html")]
pub struct GroupListTemplate {
    pub nav: Nav,
    pub group: Group,
    pub page_obj: Page<PostCard>,
}

#[derive(Template)]
#[template(path = "posts/profile.html")]
pub struct ProfileTemplate {
    pub nav: Nav,
    pub author: AuthorView,
    pub posts_count: usize,
    pub page_obj: Page<PostCard>,
}

#[derive(Template)]
#[template(path = "posts/post_detail.html")]
pub struct PostDetailTemplate {
    pub nav: Nav,
    pub full_post: PostCard,
    pub title: String,
    pub can_edit: bool,
    pub author_posts_count: usize,
    pub comments: Vec<CommentCard>,
    pub form: CommentForm,
}

#[derive(Template)]
#[template(path = "posts/create_post.html")]
pub struct CreatePostTemplate {
    pub nav: Nav,
    pub form: PostForm,
    pub is_edit: bool,
    pub post_id: i64,
    pub text_field: FieldMeta,
    pub group_field: FieldMeta,
}

impl CreatePostTemplate {
    pub fn new(nav: Nav, form: PostForm) -> Self {
        let [text_field, group_field] = PostForm::fields();
        CreatePostTemplate {
            nav,
            is_edit: form.is_edit(),
            post_id: form.instance().unwrap_or_default(),
            form,
            text_field,
            group_field,
        }
    }
}

#[derive(Template)]
#[template(path = "users/login.html")]
pub struct LoginTemplate {
    pub nav: Nav,
    pub form: LoginForm,
}

#[derive(Template)]
#[template(path = "users/signup.html")]
pub struct SignupTemplate {
    pub nav: Nav,
    pub form: SignupForm,
    pub fields: Vec<FieldMeta>,
}

impl SignupTemplate {
    pub fn new(nav: Nav, form: SignupForm) -> Self {
        SignupTemplate {
            nav,
            form,
            fields: SignupForm::fields().to_vec(),
        }
    }
}

#[derive(Template)]
#[template(path = "users/logged_out.html")]
pub struct LoggedOutTemplate {
    pub nav: Nav,
}

#[derive(Template)]
#[template(path = "core/404.html")]
pub struct NotFoundTemplate {
    pub nav: Nav,
    pub resource: String,
}

#[derive(Template)]
#[template(path = "core/error.html")]
pub struct ErrorTemplate {
    pub nav: Nav,
    pub status: u16,
    pub message: String,
}
