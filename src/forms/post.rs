use serde::Deserialize;

use super::{clean_required, FieldErrors, FieldKind, FieldMeta, INVALID_CHOICE};
use crate::models::{Group, PostView};

pub const TEXT: FieldMeta = FieldMeta {
    name: "text",
    label: "Текст",
    help_text: "Здесь можно написать свой великолепный пост",
    kind: FieldKind::Char,
    required: true,
};

pub const GROUP: FieldMeta = FieldMeta {
    name: "group",
    label: "Группа",
    help_text: "Если нет подходящей группы, оставьте поле пустым",
    kind: FieldKind::Choice,
    required: false,
};

/// Raw `application/x-www-form-urlencoded` body of the post form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostFormData {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub group: String,
}

/// Validated values ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostInput {
    pub text: String,
    pub group_id: Option<i64>,
}

/// One `<option>` of the group select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupChoice {
    pub id: i64,
    pub title: String,
    pub selected: bool,
}

/// Form over a post's `text` and `group`, used by both create and edit pages.
#[derive(Debug, Clone)]
pub struct PostForm {
    text: String,
    group: String,
    groups: Vec<Group>,
    instance: Option<i64>,
    bound: bool,
    errors: FieldErrors,
    cleaned: Option<PostInput>,
}

impl PostForm {
    /// Empty form offering `groups` as choices.
    pub fn new(groups: Vec<Group>) -> Self {
        PostForm {
            text: String::new(),
            group: String::new(),
            groups,
            instance: None,
            bound: false,
            errors: FieldErrors::default(),
            cleaned: None,
        }
    }

    /// Unbound form pre-filled from an existing post.
    pub fn for_post(post: &PostView, groups: Vec<Group>) -> Self {
        PostForm {
            text: post.text.clone(),
            group: post.group.as_ref().map(|g| g.id.to_string()).unwrap_or_default(),
            instance: Some(post.id),
            ..Self::new(groups)
        }
    }

    /// Form bound to submitted data; validation runs immediately.
    pub fn bind(data: PostFormData, groups: Vec<Group>) -> Self {
        let mut form = PostForm {
            text: data.text,
            group: data.group,
            bound: true,
            ..Self::new(groups)
        };
        form.full_clean();
        form
    }

    /// Attach the post being edited.
    pub fn with_instance(mut self, post_id: i64) -> Self {
        self.instance = Some(post_id);
        self
    }

    fn full_clean(&mut self) {
        let mut errors = FieldErrors::default();

        let text = clean_required(&mut errors, TEXT.name, &self.text);
        let group_id = self.clean_group(&mut errors);

        self.cleaned = match (text, group_id) {
            (Some(text), Some(group_id)) if errors.is_empty() => Some(PostInput { text, group_id }),
            _ => None,
        };
        self.errors = errors;
    }

    /// `Some(None)` for "no group", `None` when the choice is invalid.
    fn clean_group(&self, errors: &mut FieldErrors) -> Option<Option<i64>> {
        let raw = self.group.trim();
        if raw.is_empty() {
            return Some(None);
        }

        match raw.parse::<i64>() {
            Ok(id) if self.groups.iter().any(|g| g.id == id) => Some(Some(id)),
            _ => {
                errors.add(GROUP.name, INVALID_CHOICE);
                None
            }
        }
    }

    pub fn fields() -> [FieldMeta; 2] {
        [TEXT, GROUP]
    }

    pub fn field(name: &str) -> Option<FieldMeta> {
        Self::fields().into_iter().find(|f| f.name == name)
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn is_valid(&self) -> bool {
        self.bound && self.cleaned.is_some()
    }

    pub fn cleaned(&self) -> Option<&PostInput> {
        self.cleaned.as_ref()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn field_errors(&self, name: &str) -> &[String] {
        self.errors.get(name)
    }

    /// Id of the post this form edits, if any.
    pub fn instance(&self) -> Option<i64> {
        self.instance
    }

    pub fn is_edit(&self) -> bool {
        self.instance.is_some()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn no_group_selected(&self) -> bool {
        self.group.trim().is_empty()
    }

    pub fn group_choices(&self) -> Vec<GroupChoice> {
        let selected = self.group.trim();
        self.groups
            .iter()
            .map(|g| GroupChoice {
                id: g.id,
                title: g.title.clone(),
                selected: g.id.to_string() == selected,
            })
            .collect()
    }
}
