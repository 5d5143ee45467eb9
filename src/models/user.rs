use chrono::{DateTime, Utc};
use serde::Serialize;

/// Registered account. Posts and comments reference it by `id`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub date_joined: DateTime<Utc>,
}

/// Insert payload for the `users` table. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

impl User {
    /// "First Last" with surrounding whitespace removed, empty when neither is set.
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }

    /// Name shown on pages: the full name, falling back to the username.
    pub fn display_name(&self) -> String {
        let full = self.full_name();
        if full.is_empty() {
            self.username.clone()
        } else {
            full
        }
    }
}

impl NewUser {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        NewUser {
            username: username.into(),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: password_hash.into(),
        }
    }

    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }
}

pub(crate) fn full_name(first_name: &str, last_name: &str) -> String {
    format!("{} {}", first_name, last_name).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first: &str, last: &str) -> User {
        User {
            id: 1,
            username: "slava".to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            password_hash: "hash".to_string(),
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn test_full_name() {
        assert_eq!(user("Лев", "Толстой").full_name(), "Лев Толстой");
        assert_eq!(user("Лев", "").full_name(), "Лев");
        assert_eq!(user("", "").full_name(), "");
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        assert_eq!(user("", "").display_name(), "slava");
        assert_eq!(user("Лев", "Толстой").display_name(), "Лев Толстой");
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let json = serde_json::to_string(&user("a", "b")).expect("Failed to serialize user");
        assert!(!json.contains("password_hash"));
        assert!(json.contains("\"username\":\"slava\""));
    }

    #[test]
    fn test_new_user_builder() {
        let new_user = NewUser::new("leo", "phc").with_name("Лев", "Толстой");
        assert_eq!(new_user.username, "leo");
        assert_eq!(new_user.first_name, "Лев");
        assert_eq!(new_user.last_name, "Толстой");
        assert_eq!(new_user.password_hash, "phc");
    }
}
