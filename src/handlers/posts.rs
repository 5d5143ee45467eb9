// Post handlers
// Listing pages, the post page and the create/edit/comment actions

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Form,
};
use serde::Deserialize;
use tracing::info;

use super::{found, parse_id, post_url, profile_url, render};
use crate::{
    auth::{CurrentUser, RequireUser},
    error::AppResult,
    forms::{CommentForm, CommentFormData, PostForm, PostFormData},
    models::{NewComment, NewPost, PostChanges, PostFilter},
    pagination::paginate,
    state::AppState,
    templates::{
        AuthorView, CommentCard, CreatePostTemplate, GroupListTemplate, IndexTemplate, Nav,
        PostCard, PostDetailTemplate, ProfileTemplate,
    },
};

/// Query parameters of listing pages
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// Latest posts of the whole site
/// GET /
pub async fn index(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let page = paginate(
        state.repo(),
        PostFilter::All,
        query.page.as_deref(),
        state.posts_per_page(),
    )
    .await?;

    render(IndexTemplate {
        nav: Nav::for_user(user.as_ref()),
        page_obj: page.map(PostCard::from),
    })
}

/// Posts of one group
/// GET /group/:slug/
pub async fn group_posts(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let group = state.repo().get_group_by_slug(&slug).await?;
    let page = paginate(
        state.repo(),
        PostFilter::Group(group.id),
        query.page.as_deref(),
        state.posts_per_page(),
    )
    .await?;

    render(GroupListTemplate {
        nav: Nav::for_user(user.as_ref()),
        group,
        page_obj: page.map(PostCard::from),
    })
}

/// Posts of one author
/// GET /profile/:username/
pub async fn profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let author = state.repo().get_user_by_username(&username).await?;
    let page = paginate(
        state.repo(),
        PostFilter::Author(author.id),
        query.page.as_deref(),
        state.posts_per_page(),
    )
    .await?;

    render(ProfileTemplate {
        nav: Nav::for_user(user.as_ref()),
        author: AuthorView::from(&author),
        posts_count: page.total,
        page_obj: page.map(PostCard::from),
    })
}

/// A single post with its comments
/// GET /posts/:post_id/
pub async fn post_detail(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<String>,
) -> AppResult<Response> {
    let post_id = parse_id(&post_id, "Post")?;
    let post = state.repo().get_post(post_id).await?;
    let author_posts_count = state
        .repo()
        .count_posts(PostFilter::Author(post.author.id))
        .await?;
    let comments = state.repo().list_comments(post_id).await?;

    let can_edit = user.as_ref().is_some_and(|u| u.id == post.author.id);

    render(PostDetailTemplate {
        nav: Nav::for_user(user.as_ref()),
        title: post.headline(),
        can_edit,
        author_posts_count,
        comments: comments.into_iter().map(CommentCard::from).collect(),
        form: CommentForm::new(),
        full_post: PostCard::from(post),
    })
}

/// Empty post form
/// GET /create/
pub async fn post_create_form(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> AppResult<Response> {
    let groups = state.repo().list_groups().await?;

    render(CreatePostTemplate::new(
        Nav::for_user(Some(&user)),
        PostForm::new(groups),
    ))
}

/// Publish a post as the current user
/// POST /create/
pub async fn post_create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Form(data): Form<PostFormData>,
) -> AppResult<Response> {
    let groups = state.repo().list_groups().await?;
    let form = PostForm::bind(data, groups);

    let Some(input) = form.cleaned().cloned() else {
        return render(CreatePostTemplate::new(Nav::for_user(Some(&user)), form));
    };

    let post = state
        .repo()
        .create_post(NewPost {
            text: input.text,
            author_id: user.id,
            group_id: input.group_id,
        })
        .await?;

    info!("User {} published post {}", user.username, post.id);
    Ok(found(&profile_url(&user.username)))
}

/// Post form bound to an existing post
/// GET /posts/:post_id/edit/
pub async fn post_edit_form(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(post_id): Path<String>,
) -> AppResult<Response> {
    let post_id = parse_id(&post_id, "Post")?;
    let post = state.repo().get_post(post_id).await?;
    let groups = state.repo().list_groups().await?;

    render(CreatePostTemplate::new(
        Nav::for_user(Some(&user)),
        PostForm::for_post(&post, groups),
    ))
}

/// Save an edited post; the editor becomes its author
/// POST /posts/:post_id/edit/
pub async fn post_edit(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(post_id): Path<String>,
    Form(data): Form<PostFormData>,
) -> AppResult<Response> {
    let post_id = parse_id(&post_id, "Post")?;
    // 404 before validating anything
    state.repo().get_post(post_id).await?;

    let groups = state.repo().list_groups().await?;
    let form = PostForm::bind(data, groups).with_instance(post_id);

    let Some(input) = form.cleaned().cloned() else {
        return render(CreatePostTemplate::new(Nav::for_user(Some(&user)), form));
    };

    state
        .repo()
        .update_post(
            post_id,
            PostChanges {
                text: input.text,
                author_id: user.id,
                group_id: input.group_id,
            },
        )
        .await?;

    info!("User {} edited post {}", user.username, post_id);
    Ok(found(&post_url(post_id)))
}

/// Attach a comment to a post
/// POST /posts/:post_id/comment/
pub async fn add_comment(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(post_id): Path<String>,
    Form(data): Form<CommentFormData>,
) -> AppResult<Response> {
    let post_id = parse_id(&post_id, "Post")?;
    state.repo().get_post(post_id).await?;

    let form = CommentForm::bind(data);
    if let Some(text) = form.cleaned() {
        let comment = state
            .repo()
            .create_comment(NewComment {
                post_id,
                author_id: user.id,
                text: text.to_string(),
            })
            .await?;
        info!("User {} commented on post {} ({})", user.username, post_id, comment.id);
    }

    Ok(found(&post_url(post_id)))
}
