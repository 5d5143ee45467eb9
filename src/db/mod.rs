//! Storage layer.
//!
//! Handlers talk to a [`Repository`]; `Database` backs it with PostgreSQL and
//! `MemoryStore` keeps everything in process for tests and local runs.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    Comment, CommentView, Group, NewComment, NewGroup, NewPost, NewUser, Post, PostChanges,
    PostFilter, PostView, Session, User,
};

pub use memory::MemoryStore;
pub use postgres::Database;

#[async_trait]
pub trait Repository: Send + Sync {
    /// Cheap round trip proving the store answers.
    async fn health_check(&self) -> Result<(), AppError>;

    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;

    async fn get_user_by_username(&self, username: &str) -> Result<User, AppError>;

    async fn create_group(&self, group: NewGroup) -> Result<Group, AppError>;

    /// All groups ordered by title, as offered in the post form.
    async fn list_groups(&self) -> Result<Vec<Group>, AppError>;

    async fn get_group_by_slug(&self, slug: &str) -> Result<Group, AppError>;

    async fn count_posts(&self, filter: PostFilter) -> Result<usize, AppError>;

    /// Posts matching `filter`, newest first, `limit` rows starting at `offset`.
    async fn list_posts(
        &self,
        filter: PostFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<PostView>, AppError>;

    async fn get_post(&self, post_id: i64) -> Result<PostView, AppError>;

    async fn create_post(&self, post: NewPost) -> Result<Post, AppError>;

    async fn update_post(&self, post_id: i64, changes: PostChanges) -> Result<Post, AppError>;

    /// Comments of a post, oldest first.
    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentView>, AppError>;

    async fn create_comment(&self, comment: NewComment) -> Result<Comment, AppError>;

    async fn create_session(&self, user_id: i64) -> Result<Session, AppError>;

    /// The user a session token belongs to, `None` for unknown tokens.
    async fn get_session_user(&self, token: Uuid) -> Result<Option<User>, AppError>;

    async fn delete_session(&self, token: Uuid) -> Result<(), AppError>;
}

/// Populate an empty store with a couple of groups, an author and a few posts.
/// Does nothing once any group exists.
pub async fn seed_demo_data(repo: &dyn Repository, password_hash: String) -> Result<(), AppError> {
    info!("Seeding demo data");

    let existing = repo.list_groups().await?;
    if !existing.is_empty() {
        info!("Store already contains {} groups, skipping seed", existing.len());
        return Ok(());
    }

    let groups = [
        ("Лев Толстой", "leo", "Сообщество поклонников творчества Льва Толстого"),
        ("Котики", "cats", "Фотографии и истории про котов"),
    ];

    let mut created = Vec::with_capacity(groups.len());
    for (title, slug, description) in groups {
        let group = repo.create_group(NewGroup::new(title, slug, description)).await?;
        info!("Seeded group: {} ({})", group.title, group.slug);
        created.push(group);
    }

    let author = repo
        .create_user(NewUser::new("leo", password_hash).with_name("Лев", "Толстой"))
        .await?;

    let texts = [
        "Все счастливые семьи похожи друг на друга, каждая несчастливая семья несчастлива по-своему.",
        "Если хочешь быть счастливым, будь им.",
        "Кот сегодня спал на рукописи. Пришлось переписывать главу.",
    ];
    for (index, text) in texts.iter().enumerate() {
        let group_id = created.get(index % created.len()).map(|g| g.id);
        repo.create_post(NewPost {
            text: text.to_string(),
            author_id: author.id,
            group_id,
        })
        .await?;
    }

    info!("Successfully seeded {} groups and {} posts", created.len(), texts.len());
    Ok(())
}
