// Models module

pub mod comment;
pub mod group;
pub mod post;
pub mod session;
pub mod user;

// Re-export commonly used types
pub use comment::{Comment, CommentView, NewComment};
pub use group::{Group, GroupRef, NewGroup};
pub use post::{AuthorRef, NewPost, Post, PostChanges, PostFilter, PostView};
pub use session::Session;
pub use user::{NewUser, User};
