use chrono::{DateTime, Utc};
use serde::Serialize;

use super::group::GroupRef;

/// Row of the `posts` table.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub author_id: i64,
    pub group_id: Option<i64>,
    pub pub_date: DateTime<Utc>,
}

/// Post joined with what its card shows: author names and group link.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PostView {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author: AuthorRef,
    pub group: Option<GroupRef>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AuthorRef {
    pub id: i64,
    pub username: String,
    pub full_name: String,
}

/// Insert payload; `pub_date` is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub text: String,
    pub author_id: i64,
    pub group_id: Option<i64>,
}

/// Full replacement of the editable columns, applied by `update_post`.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub text: String,
    pub author_id: i64,
    pub group_id: Option<i64>,
}

/// Which posts a listing page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(i64),
    Author(i64),
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        match *self {
            PostFilter::All => true,
            PostFilter::Group(group_id) => post.group_id == Some(group_id),
            PostFilter::Author(author_id) => post.author_id == author_id,
        }
    }
}

impl AuthorRef {
    /// Full name if the author filled it in, otherwise the username.
    pub fn display_name(&self) -> &str {
        if self.full_name.is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }
}

impl PostView {
    /// First 15 characters of the text, used as the page title of the detail page.
    pub fn headline(&self) -> String {
        self.text.chars().take(15).collect()
    }
}
