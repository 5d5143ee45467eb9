use serde::Deserialize;

use super::{clean_required, FieldErrors, FieldKind, FieldMeta};

pub const TEXT: FieldMeta = FieldMeta {
    name: "text",
    label: "Текст комментария",
    help_text: "",
    kind: FieldKind::Char,
    required: true,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentFormData {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct CommentForm {
    text: String,
    errors: FieldErrors,
    cleaned: Option<String>,
}

impl CommentForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(data: CommentFormData) -> Self {
        let mut errors = FieldErrors::default();
        let cleaned = clean_required(&mut errors, TEXT.name, &data.text);
        CommentForm {
            text: data.text,
            errors,
            cleaned,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.cleaned.is_some()
    }

    /// Trimmed comment text once the form is valid.
    pub fn cleaned(&self) -> Option<&str> {
        self.cleaned.as_deref()
    }

    pub fn field_errors(&self, name: &str) -> &[String] {
        self.errors.get(name)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn label(&self) -> &'static str {
        TEXT.label
    }
}
