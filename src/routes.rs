use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};

use crate::{
    handlers::{
        health_check, not_found,
        posts::{
            add_comment, group_posts, index, post_create, post_create_form, post_detail,
            post_edit, post_edit_form, profile,
        },
        users::{login, login_form, logout, signup, signup_form},
    },
    middleware::create_middleware_stack,
    state::AppState,
};

/// Create the Axum router with all pages and middleware
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Posts
        .route("/", get(index))
        .route("/create/", get(post_create_form).post(post_create))
        .route("/group/:slug/", get(group_posts))
        .route("/profile/:username/", get(profile))
        .route("/posts/:post_id/", get(post_detail))
        .route("/posts/:post_id/edit/", get(post_edit_form).post(post_edit))
        .route("/posts/:post_id/comment/", post(add_comment))
        // Accounts
        .route("/auth/login/", get(login_form).post(login))
        .route("/auth/logout/", get(logout).post(logout))
        .route("/auth/signup/", get(signup_form).post(signup))
        .fallback(not_found)
        .with_state(state)
        .layer(create_middleware_stack(request_timeout))
}
