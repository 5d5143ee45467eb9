//! HTML form handling: binding submitted fields, validation and the field
//! metadata templates need to render inputs with labels and help texts.

pub mod auth;
pub mod comment;
pub mod post;

use std::collections::BTreeMap;

pub use auth::{LoginForm, LoginFormData, SignupForm, SignupFormData};
pub use comment::{CommentForm, CommentFormData};
pub use post::{GroupChoice, PostForm, PostFormData, PostInput};

pub const REQUIRED: &str = "Обязательное поле.";
pub const INVALID_CHOICE: &str =
    "Выберите корректный вариант. Вашего варианта нет среди допустимых значений.";

/// Key for errors that belong to the form as a whole.
pub const NON_FIELD: &str = "__all__";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Char,
    Choice,
    Password,
}

/// Static description of one form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMeta {
    pub name: &'static str,
    pub label: &'static str,
    pub help_text: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldMeta {
    pub fn is_password(&self) -> bool {
        self.kind == FieldKind::Password
    }
}

/// Validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<&'static str, Vec<String>>,
}

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Trimmed value of a required char field, recording `REQUIRED` when blank.
pub(crate) fn clean_required(
    errors: &mut FieldErrors,
    field: &'static str,
    raw: &str,
) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
        None
    } else {
        Some(value.to_string())
    }
}
