use async_trait::async_trait;
use deadpool_postgres::{Config, Object, Pool, Runtime};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::Repository;
use crate::config::DatabaseConfig;
use crate::error::AppError;
use crate::models::{
    AuthorRef, Comment, CommentView, Group, GroupRef, NewComment, NewGroup, NewPost, NewUser,
    Post, PostChanges, PostFilter, PostView, Session, User,
};

const POST_VIEW_SELECT: &str = r#"
    SELECT p.id, p.text, p.pub_date,
           u.id, u.username, u.first_name, u.last_name,
           g.id, g.title, g.slug
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN groups g ON g.id = p.group_id
"#;

const USER_COLUMNS: &str = "id, username, first_name, last_name, password_hash, date_joined";

/// Repository backed by a PostgreSQL connection pool.
#[derive(Clone)]
pub struct Database {
    pool: Pool,
}

impl Database {
    /// Build the pool and make sure a connection can be checked out.
    pub async fn new(config: DatabaseConfig) -> Result<Self, AppError> {
        info!("Creating PostgreSQL connection pool for host: {}:{}", config.host, config.port);

        let pool = Self::create_pool(config)?;

        let db = Database { pool };
        db.test_connection().await?;

        Ok(db)
    }

    fn create_pool(config: DatabaseConfig) -> Result<Pool, AppError> {
        let mut pg_config = Config::new();

        pg_config.host = Some(config.host);
        pg_config.port = Some(config.port);
        pg_config.dbname = Some(config.database);
        pg_config.user = Some(config.username);
        pg_config.password = Some(config.password);
        pg_config.connect_timeout = Some(config.connection_timeout);

        pg_config.ssl_mode = Some(match config.ssl_mode.as_str() {
            "disable" => deadpool_postgres::SslMode::Disable,
            "prefer" | "allow" => deadpool_postgres::SslMode::Prefer,
            "require" | "verify-ca" | "verify-full" => deadpool_postgres::SslMode::Require,
            other => {
                warn!("Unknown SSL mode '{}', defaulting to 'require'", other);
                deadpool_postgres::SslMode::Require
            }
        });

        pg_config.manager = Some(deadpool_postgres::ManagerConfig {
            recycling_method: deadpool_postgres::RecyclingMethod::Fast,
        });

        pg_config.pool = Some(deadpool_postgres::PoolConfig::new(config.max_connections as usize));

        let tls_connector = TlsConnector::builder().build().map_err(|e| {
            error!("Failed to create TLS connector: {}", e);
            AppError::Database(format!("TLS connector creation failed: {}", e))
        })?;
        let tls = MakeTlsConnector::new(tls_connector);

        pg_config.create_pool(Some(Runtime::Tokio1), tls).map_err(|e| {
            error!("Failed to create connection pool: {}", e);
            AppError::Database(format!("Connection pool creation failed: {}", e))
        })
    }

    async fn get_connection(&self) -> Result<Object, AppError> {
        self.pool.get().await.map_err(AppError::from)
    }

    pub async fn test_connection(&self) -> Result<(), AppError> {
        let client = self.get_connection().await?;

        client.execute("SELECT 1", &[]).await.map_err(|e| {
            error!("Database connection test failed: {}", e);
            AppError::Database(format!("Connection test failed: {}", e))
        })?;

        info!("Database connection test successful");
        Ok(())
    }

    /// Create tables and indexes if they are missing. Safe to run on every start.
    pub async fn migrate(&self) -> Result<(), AppError> {
        info!("Running database migrations");

        let client = self.get_connection().await?;

        let statements: [(&str, &str); 11] = [
            (
                "users table",
                r#"
                CREATE TABLE IF NOT EXISTS users (
                    id BIGSERIAL PRIMARY KEY,
                    username VARCHAR(150) UNIQUE NOT NULL,
                    first_name VARCHAR(150) NOT NULL DEFAULT '',
                    last_name VARCHAR(150) NOT NULL DEFAULT '',
                    password_hash TEXT NOT NULL,
                    date_joined TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
                "#,
            ),
            (
                "groups table",
                r#"
                CREATE TABLE IF NOT EXISTS groups (
                    id BIGSERIAL PRIMARY KEY,
                    title VARCHAR(200) NOT NULL,
                    slug VARCHAR(255) UNIQUE NOT NULL,
                    description TEXT NOT NULL DEFAULT ''
                )
                "#,
            ),
            (
                "posts table",
                r#"
                CREATE TABLE IF NOT EXISTS posts (
                    id BIGSERIAL PRIMARY KEY,
                    text TEXT NOT NULL,
                    author_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    group_id BIGINT REFERENCES groups(id) ON DELETE SET NULL,
                    pub_date TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
                "#,
            ),
            (
                "posts pub_date index",
                "CREATE INDEX IF NOT EXISTS idx_posts_pub_date ON posts(pub_date DESC, id DESC)",
            ),
            (
                "posts author_id index",
                "CREATE INDEX IF NOT EXISTS idx_posts_author_id ON posts(author_id)",
            ),
            (
                "posts group_id index",
                "CREATE INDEX IF NOT EXISTS idx_posts_group_id ON posts(group_id)",
            ),
            (
                "comments table",
                r#"
                CREATE TABLE IF NOT EXISTS comments (
                    id BIGSERIAL PRIMARY KEY,
                    post_id BIGINT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                    author_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    text TEXT NOT NULL,
                    created TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
                "#,
            ),
            (
                "comments post_id index",
                "CREATE INDEX IF NOT EXISTS idx_comments_post_id ON comments(post_id, created)",
            ),
            (
                "sessions table",
                r#"
                CREATE TABLE IF NOT EXISTS sessions (
                    token UUID PRIMARY KEY,
                    user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
                "#,
            ),
            (
                "sessions user_id index",
                "CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id)",
            ),
            (
                "groups title index",
                "CREATE INDEX IF NOT EXISTS idx_groups_title ON groups(title)",
            ),
        ];

        for (name, sql) in statements {
            client.execute(sql, &[]).await.map_err(|e| {
                error!("Failed to create {}: {}", name, e);
                AppError::Database(format!("Migration step '{}' failed: {}", name, e))
            })?;
        }

        info!("Database migrations completed successfully");
        Ok(())
    }
}

/// `WHERE` clause and its parameters for a post listing.
fn filter_clause(filter: &PostFilter) -> (&'static str, Option<i64>) {
    match *filter {
        PostFilter::All => ("", None),
        PostFilter::Group(id) => ("WHERE p.group_id = $1", Some(id)),
        PostFilter::Author(id) => ("WHERE p.author_id = $1", Some(id)),
    }
}

fn user_from_row(row: &Row) -> User {
    User {
        id: row.get(0),
        username: row.get(1),
        first_name: row.get(2),
        last_name: row.get(3),
        password_hash: row.get(4),
        date_joined: row.get(5),
    }
}

fn group_from_row(row: &Row) -> Group {
    Group {
        id: row.get(0),
        title: row.get(1),
        slug: row.get(2),
        description: row.get(3),
    }
}

fn post_from_row(row: &Row) -> Post {
    Post {
        id: row.get(0),
        text: row.get(1),
        author_id: row.get(2),
        group_id: row.get(3),
        pub_date: row.get(4),
    }
}

fn post_view_from_row(row: &Row) -> PostView {
    let first_name: String = row.get(5);
    let last_name: String = row.get(6);
    let group_id: Option<i64> = row.get(7);

    PostView {
        id: row.get(0),
        text: row.get(1),
        pub_date: row.get(2),
        author: AuthorRef {
            id: row.get(3),
            username: row.get(4),
            full_name: crate::models::user::full_name(&first_name, &last_name),
        },
        group: group_id.map(|id| GroupRef {
            id,
            title: row.get(8),
            slug: row.get(9),
        }),
    }
}

#[async_trait]
impl Repository for Database {
    async fn health_check(&self) -> Result<(), AppError> {
        let client = self.get_connection().await?;

        client.execute("SELECT 1", &[]).await.map_err(|e| {
            error!("Database health check failed: {}", e);
            AppError::Database(format!("Health check failed: {}", e))
        })?;

        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let client = self.get_connection().await?;

        let query = format!(
            "INSERT INTO users (username, first_name, last_name, password_hash) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );

        let row = client
            .query_one(
                &query,
                &[&user.username, &user.first_name, &user.last_name, &user.password_hash],
            )
            .await
            .map_err(AppError::from)?;

        let created = user_from_row(&row);
        info!("Created user with id: {}", created.id);
        Ok(created)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, AppError> {
        let client = self.get_connection().await?;
        let query = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);

        let row = client
            .query_opt(&query, &[&username])
            .await
            .map_err(AppError::from)?;

        row.map(|row| user_from_row(&row))
            .ok_or_else(|| AppError::NotFound(format!("User {}", username)))
    }

    async fn create_group(&self, group: NewGroup) -> Result<Group, AppError> {
        group.validate().map_err(AppError::Validation)?;

        let client = self.get_connection().await?;
        let query = r#"
            INSERT INTO groups (title, slug, description)
            VALUES ($1, $2, $3)
            RETURNING id, title, slug, description
        "#;

        let title = group.title.trim();
        let row = client
            .query_one(query, &[&title, &group.slug, &group.description])
            .await
            .map_err(AppError::from)?;

        let created = group_from_row(&row);
        info!("Created group with slug: {}", created.slug);
        Ok(created)
    }

    async fn list_groups(&self) -> Result<Vec<Group>, AppError> {
        let client = self.get_connection().await?;
        let query = "SELECT id, title, slug, description FROM groups ORDER BY title, id";

        let rows = client.query(query, &[]).await.map_err(AppError::from)?;
        Ok(rows.iter().map(group_from_row).collect())
    }

    async fn get_group_by_slug(&self, slug: &str) -> Result<Group, AppError> {
        let client = self.get_connection().await?;
        let query = "SELECT id, title, slug, description FROM groups WHERE slug = $1";

        let row = client.query_opt(query, &[&slug]).await.map_err(AppError::from)?;

        row.map(|row| group_from_row(&row))
            .ok_or_else(|| AppError::NotFound(format!("Group {}", slug)))
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<usize, AppError> {
        let client = self.get_connection().await?;
        let (clause, id) = filter_clause(&filter);
        let query = format!("SELECT COUNT(*) FROM posts p {}", clause);

        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();
        if let Some(ref id) = id {
            params.push(id);
        }

        let row = client.query_one(&query, &params).await.map_err(AppError::from)?;
        let count: i64 = row.get(0);
        Ok(count.max(0) as usize)
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<PostView>, AppError> {
        let client = self.get_connection().await?;
        let (clause, id) = filter_clause(&filter);

        let limit = limit as i64;
        let offset = offset as i64;

        // Placeholders are numbered after the optional filter parameter.
        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();
        if let Some(ref id) = id {
            params.push(id);
        }
        let limit_index = params.len() + 1;
        params.push(&limit);
        params.push(&offset);

        let query = format!(
            "{} {} ORDER BY p.pub_date DESC, p.id DESC LIMIT ${} OFFSET ${}",
            POST_VIEW_SELECT,
            clause,
            limit_index,
            limit_index + 1
        );

        let rows = client.query(&query, &params).await.map_err(AppError::from)?;
        Ok(rows.iter().map(post_view_from_row).collect())
    }

    async fn get_post(&self, post_id: i64) -> Result<PostView, AppError> {
        let client = self.get_connection().await?;
        let query = format!("{} WHERE p.id = $1", POST_VIEW_SELECT);

        let row = client.query_opt(&query, &[&post_id]).await.map_err(AppError::from)?;

        row.map(|row| post_view_from_row(&row))
            .ok_or_else(|| AppError::NotFound(format!("Post {}", post_id)))
    }

    async fn create_post(&self, post: NewPost) -> Result<Post, AppError> {
        let client = self.get_connection().await?;
        let query = r#"
            INSERT INTO posts (text, author_id, group_id)
            VALUES ($1, $2, $3)
            RETURNING id, text, author_id, group_id, pub_date
        "#;

        let row = client
            .query_one(query, &[&post.text, &post.author_id, &post.group_id])
            .await
            .map_err(AppError::from)?;

        let created = post_from_row(&row);
        info!("Created post with id: {}", created.id);
        Ok(created)
    }

    async fn update_post(&self, post_id: i64, changes: PostChanges) -> Result<Post, AppError> {
        let client = self.get_connection().await?;
        let query = r#"
            UPDATE posts SET text = $1, author_id = $2, group_id = $3
            WHERE id = $4
            RETURNING id, text, author_id, group_id, pub_date
        "#;

        let row = client
            .query_opt(
                query,
                &[&changes.text, &changes.author_id, &changes.group_id, &post_id],
            )
            .await
            .map_err(AppError::from)?;

        let updated = row
            .map(|row| post_from_row(&row))
            .ok_or_else(|| AppError::NotFound(format!("Post {}", post_id)))?;

        info!("Updated post with id: {}", updated.id);
        Ok(updated)
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentView>, AppError> {
        let client = self.get_connection().await?;
        let query = r#"
            SELECT c.id, c.post_id, c.text, c.created,
                   u.id, u.username, u.first_name, u.last_name
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.post_id = $1
            ORDER BY c.created, c.id
        "#;

        let rows = client.query(query, &[&post_id]).await.map_err(AppError::from)?;

        Ok(rows
            .iter()
            .map(|row| {
                let first_name: String = row.get(6);
                let last_name: String = row.get(7);
                CommentView {
                    id: row.get(0),
                    post_id: row.get(1),
                    text: row.get(2),
                    created: row.get(3),
                    author: AuthorRef {
                        id: row.get(4),
                        username: row.get(5),
                        full_name: crate::models::user::full_name(&first_name, &last_name),
                    },
                }
            })
            .collect())
    }

    async fn create_comment(&self, comment: NewComment) -> Result<Comment, AppError> {
        let client = self.get_connection().await?;
        let query = r#"
            INSERT INTO comments (post_id, author_id, text)
            VALUES ($1, $2, $3)
            RETURNING id, post_id, author_id, text, created
        "#;

        let row = client
            .query_one(query, &[&comment.post_id, &comment.author_id, &comment.text])
            .await
            .map_err(AppError::from)?;

        let created = Comment {
            id: row.get(0),
            post_id: row.get(1),
            author_id: row.get(2),
            text: row.get(3),
            created: row.get(4),
        };

        info!("Created comment with id: {} on post {}", created.id, created.post_id);
        Ok(created)
    }

    async fn create_session(&self, user_id: i64) -> Result<Session, AppError> {
        let session = Session::new(user_id);
        let client = self.get_connection().await?;

        client
            .execute(
                "INSERT INTO sessions (token, user_id, created_at) VALUES ($1, $2, $3)",
                &[&session.token, &session.user_id, &session.created_at],
            )
            .await
            .map_err(AppError::from)?;

        Ok(session)
    }

    async fn get_session_user(&self, token: Uuid) -> Result<Option<User>, AppError> {
        let client = self.get_connection().await?;
        let query = r#"
            SELECT u.id, u.username, u.first_name, u.last_name, u.password_hash, u.date_joined
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = $1
        "#;

        let row = client.query_opt(query, &[&token]).await.map_err(AppError::from)?;
        Ok(row.map(|row| user_from_row(&row)))
    }

    async fn delete_session(&self, token: Uuid) -> Result<(), AppError> {
        let client = self.get_connection().await?;

        client
            .execute("DELETE FROM sessions WHERE token = $1", &[&token])
            .await
            .map_err(AppError::from)?;

        Ok(())
    }
}
