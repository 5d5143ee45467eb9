use serde::{Deserialize, Serialize};

/// Community a post may be published into, addressed by its slug.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

/// The part of a group a post card needs.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GroupRef {
    pub id: i64,
    pub title: String,
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl NewGroup {
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        NewGroup {
            title: title.into(),
            slug: slug.into(),
            description: description.into(),
        }
    }

    /// Validate the group before insert
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Title cannot be empty".to_string());
        }

        if self.title.chars().count() > 200 {
            return Err("Title cannot exceed 200 characters".to_string());
        }

        if self.slug.is_empty() {
            return Err("Slug cannot be empty".to_string());
        }

        if !is_valid_slug(&self.slug) {
            return Err("Slug may only contain latin letters, digits, hyphens and underscores".to_string());
        }

        Ok(())
    }
}

impl From<&Group> for GroupRef {
    fn from(group: &Group) -> Self {
        GroupRef {
            id: group.id,
            title: group.title.clone(),
            slug: group.slug.clone(),
        }
    }
}

/// Slugs are restricted to `[-a-zA-Z0-9_]`.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_validation() {
        assert!(is_valid_slug("test_slug"));
        assert!(is_valid_slug("cats-and-dogs-2"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("with space"));
        assert!(!is_valid_slug("кириллица"));
        assert!(!is_valid_slug("a/b"));
    }

    #[test]
    fn test_new_group_validation() {
        assert!(NewGroup::new("Тестовая группа", "test_slug", "Тестовое описание")
            .validate()
            .is_ok());
        assert!(NewGroup::new("  ", "test_slug", "").validate().is_err());
        assert!(NewGroup::new("a".repeat(201), "test_slug", "").validate().is_err());
        assert!(NewGroup::new("Группа", "bad slug", "").validate().is_err());
    }

    #[test]
    fn test_group_ref_from_group() {
        let group = Group {
            id: 7,
            title: "Коты".to_string(),
            slug: "cats".to_string(),
            description: "Про котов".to_string(),
        };
        let group_ref = GroupRef::from(&group);
        assert_eq!(group_ref.id, 7);
        assert_eq!(group_ref.title, "Коты");
        assert_eq!(group_ref.slug, "cats");
    }
}
