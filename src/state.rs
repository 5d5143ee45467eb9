//! Application State
//!
//! Arc-wrapped state shared across handlers.

use std::sync::Arc;

use crate::db::Repository;
use crate::pagination::POSTS_PER_PAGE;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    repo: Arc<dyn Repository>,
    posts_per_page: usize,
}

impl AppState {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self::with_page_size(repo, POSTS_PER_PAGE)
    }

    pub fn with_page_size(repo: Arc<dyn Repository>, posts_per_page: usize) -> Self {
        Self {
            inner: Arc::new(InnerState {
                repo,
                posts_per_page: posts_per_page.max(1),
            }),
        }
    }

    pub fn repo(&self) -> &dyn Repository {
        self.inner.repo.as_ref()
    }

    pub fn posts_per_page(&self) -> usize {
        self.inner.posts_per_page
    }
}
