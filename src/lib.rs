// Library root for the Yatube blog

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod state;
pub mod templates;

// Re-export commonly used types
pub use db::{Database, MemoryStore, Repository};
pub use error::{AppError, AppResult};
pub use models::{Comment, Group, Post, PostView, User};
pub use routes::create_router;
pub use state::AppState;
