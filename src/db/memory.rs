use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::Repository;
use crate::error::AppError;
use crate::models::{
    AuthorRef, Comment, CommentView, Group, GroupRef, NewComment, NewGroup, NewPost, NewUser,
    Post, PostChanges, PostFilter, PostView, Session, User,
};

/// In-process store with the same constraints as the PostgreSQL schema:
/// unique usernames and slugs, existing references, newest-first posts.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    groups: Vec<Group>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    sessions: HashMap<Uuid, Session>,
    last_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn user(&self, id: i64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn author_ref(&self, id: i64) -> Result<AuthorRef, AppError> {
        self.user(id)
            .map(|u| AuthorRef {
                id: u.id,
                username: u.username.clone(),
                full_name: u.full_name(),
            })
            .ok_or_else(|| AppError::Database(format!("Dangling author reference {}", id)))
    }

    fn post_view(&self, post: &Post) -> Result<PostView, AppError> {
        let group = post
            .group_id
            .and_then(|id| self.groups.iter().find(|g| g.id == id))
            .map(GroupRef::from);

        Ok(PostView {
            id: post.id,
            text: post.text.clone(),
            pub_date: post.pub_date,
            author: self.author_ref(post.author_id)?,
            group,
        })
    }

    fn check_references(&self, author_id: i64, group_id: Option<i64>) -> Result<(), AppError> {
        let group_missing = group_id.is_some_and(|id| !self.groups.iter().any(|g| g.id == id));
        if self.user(author_id).is_none() || group_missing {
            return Err(AppError::Validation("Referenced resource does not exist".to_string()));
        }
        Ok(())
    }

    /// Matching posts, newest first.
    fn ordered_posts(&self, filter: PostFilter) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self.posts.iter().filter(|p| filter.matches(p)).collect();
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        posts
    }
}

#[async_trait]
impl Repository for MemoryStore {
    async fn health_check(&self) -> Result<(), AppError> {
        let _tables = self.tables.read().await;
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let created = User {
            id: tables.next_id(),
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            password_hash: user.password_hash,
            date_joined: Utc::now(),
        };
        tables.users.push(created.clone());

        info!("Created user with id: {}", created.id);
        Ok(created)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, AppError> {
        let tables = self.tables.read().await;
        tables
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("User {}", username)))
    }

    async fn create_group(&self, group: NewGroup) -> Result<Group, AppError> {
        group.validate().map_err(AppError::Validation)?;

        let mut tables = self.tables.write().await;
        if tables.groups.iter().any(|g| g.slug == group.slug) {
            return Err(AppError::Conflict("Group slug already exists".to_string()));
        }

        let created = Group {
            id: tables.next_id(),
            title: group.title.trim().to_string(),
            slug: group.slug,
            description: group.description,
        };
        tables.groups.push(created.clone());

        info!("Created group with slug: {}", created.slug);
        Ok(created)
    }

    async fn list_groups(&self) -> Result<Vec<Group>, AppError> {
        let tables = self.tables.read().await;
        let mut groups = tables.groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(groups)
    }

    async fn get_group_by_slug(&self, slug: &str) -> Result<Group, AppError> {
        let tables = self.tables.read().await;
        tables
            .groups
            .iter()
            .find(|g| g.slug == slug)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Group {}", slug)))
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<usize, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().filter(|p| filter.matches(p)).count())
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<PostView>, AppError> {
        let tables = self.tables.read().await;
        tables
            .ordered_posts(filter)
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|post| tables.post_view(post))
            .collect()
    }

    async fn get_post(&self, post_id: i64) -> Result<PostView, AppError> {
        let tables = self.tables.read().await;
        let post = tables
            .posts
            .iter()
            .find(|p| p.id == post_id)
            .ok_or_else(|| AppError::NotFound(format!("Post {}", post_id)))?;
        tables.post_view(post)
    }

    async fn create_post(&self, post: NewPost) -> Result<Post, AppError> {
        let mut tables = self.tables.write().await;
        tables.check_references(post.author_id, post.group_id)?;

        let created = Post {
            id: tables.next_id(),
            text: post.text,
            author_id: post.author_id,
            group_id: post.group_id,
            pub_date: Utc::now(),
        };
        tables.posts.push(created.clone());

        info!("Created post with id: {}", created.id);
        Ok(created)
    }

    async fn update_post(&self, post_id: i64, changes: PostChanges) -> Result<Post, AppError> {
        let mut tables = self.tables.write().await;
        tables.check_references(changes.author_id, changes.group_id)?;

        let post = tables
            .posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or_else(|| AppError::NotFound(format!("Post {}", post_id)))?;

        post.text = changes.text;
        post.author_id = changes.author_id;
        post.group_id = changes.group_id;

        info!("Updated post with id: {}", post_id);
        Ok(post.clone())
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentView>, AppError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<&Comment> =
            tables.comments.iter().filter(|c| c.post_id == post_id).collect();
        comments.sort_by(|a, b| a.created.cmp(&b.created).then(a.id.cmp(&b.id)));

        comments
            .into_iter()
            .map(|c| {
                Ok(CommentView {
                    id: c.id,
                    post_id: c.post_id,
                    text: c.text.clone(),
                    created: c.created,
                    author: tables.author_ref(c.author_id)?,
                })
            })
            .collect()
    }

    async fn create_comment(&self, comment: NewComment) -> Result<Comment, AppError> {
        let mut tables = self.tables.write().await;

        if !tables.posts.iter().any(|p| p.id == comment.post_id) {
            return Err(AppError::Validation("Referenced resource does not exist".to_string()));
        }
        tables.check_references(comment.author_id, None)?;

        let created = Comment {
            id: tables.next_id(),
            post_id: comment.post_id,
            author_id: comment.author_id,
            text: comment.text,
            created: Utc::now(),
        };
        tables.comments.push(created.clone());

        info!("Created comment with id: {} on post {}", created.id, created.post_id);
        Ok(created)
    }

    async fn create_session(&self, user_id: i64) -> Result<Session, AppError> {
        let mut tables = self.tables.write().await;
        tables.check_references(user_id, None)?;

        let session = Session::new(user_id);
        tables.sessions.insert(session.token, session.clone());
        Ok(session)
    }

    async fn get_session_user(&self, token: Uuid) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .sessions
            .get(&token)
            .and_then(|s| tables.user(s.user_id))
            .cloned())
    }

    async fn delete_session(&self, token: Uuid) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        tables.sessions.remove(&token);
        Ok(())
    }
}
