use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Server-side login state; the token travels in the `sessionid` cookie.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: Uuid,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: i64) -> Self {
        Session {
            token: Uuid::new_v4(),
            user_id,
            created_at: Utc::now(),
        }
    }
}
