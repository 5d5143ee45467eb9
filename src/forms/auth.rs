use serde::Deserialize;

use super::{clean_required, FieldErrors, FieldKind, FieldMeta, NON_FIELD, REQUIRED};

pub const USERNAME_MAX_LEN: usize = 150;

pub const INVALID_LOGIN: &str = "Пожалуйста, введите правильные имя пользователя и пароль. \
                                 Оба поля могут быть чувствительны к регистру.";
pub const INVALID_USERNAME: &str = "Введите правильное имя пользователя. \
                                    Оно может содержать только буквы, цифры и знаки @/./+/-/_.";
pub const PASSWORD_MISMATCH: &str = "Введенные пароли не совпадают.";
pub const USERNAME_TAKEN: &str = "Пользователь с таким именем уже существует.";

pub const SIGNUP_FIELDS: [FieldMeta; 6] = [
    FieldMeta {
        name: "first_name",
        label: "Имя",
        help_text: "",
        kind: FieldKind::Char,
        required: false,
    },
    FieldMeta {
        name: "last_name",
        label: "Фамилия",
        help_text: "",
        kind: FieldKind::Char,
        required: false,
    },
    FieldMeta {
        name: "username",
        label: "Имя пользователя",
        help_text: "Не более 150 символов. Только буквы, цифры и символы @/./+/-/_.",
        kind: FieldKind::Char,
        required: true,
    },
    FieldMeta {
        name: "email",
        label: "Адрес электронной почты",
        help_text: "",
        kind: FieldKind::Char,
        required: false,
    },
    FieldMeta {
        name: "password1",
        label: "Пароль",
        help_text: "",
        kind: FieldKind::Password,
        required: true,
    },
    FieldMeta {
        name: "password2",
        label: "Подтверждение пароля",
        help_text: "Для подтверждения введите, пожалуйста, пароль ещё раз.",
        kind: FieldKind::Password,
        required: true,
    },
];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginFormData {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    username: String,
    next: String,
    errors: FieldErrors,
    credentials: Option<(String, String)>,
}

impl LoginForm {
    /// Empty form remembering where to go after a successful login.
    pub fn new(next: Option<String>) -> Self {
        LoginForm {
            next: next.unwrap_or_default(),
            ..Self::default()
        }
    }

    pub fn bind(data: LoginFormData) -> Self {
        let mut errors = FieldErrors::default();
        let username = clean_required(&mut errors, "username", &data.username);
        if data.password.is_empty() {
            errors.add("password", REQUIRED);
        }

        let credentials = match username {
            Some(username) if errors.is_empty() => Some((username, data.password)),
            _ => None,
        };

        LoginForm {
            username: data.username,
            next: data.next,
            errors,
            credentials,
        }
    }

    /// `(username, password)` once both fields are filled in.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.credentials
            .as_ref()
            .map(|(u, p)| (u.as_str(), p.as_str()))
    }

    /// Record a failed authentication attempt.
    pub fn reject(&mut self) {
        self.errors.add(NON_FIELD, INVALID_LOGIN);
        self.credentials = None;
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn next(&self) -> &str {
        &self.next
    }

    pub fn field_errors(&self, name: &str) -> &[String] {
        self.errors.get(name)
    }

    pub fn non_field_errors(&self) -> &[String] {
        self.errors.get(NON_FIELD)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupFormData {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

/// Values of a valid signup form; the password is still plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupInput {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    data: SignupFormData,
    errors: FieldErrors,
    cleaned: Option<SignupInput>,
}

impl SignupForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(data: SignupFormData) -> Self {
        let mut errors = FieldErrors::default();

        let username = clean_required(&mut errors, "username", &data.username);
        if let Some(ref username) = username {
            if username.chars().count() > USERNAME_MAX_LEN {
                errors.add(
                    "username",
                    format!(
                        "Убедитесь, что это значение содержит не более {} символов (сейчас {}).",
                        USERNAME_MAX_LEN,
                        username.chars().count()
                    ),
                );
            } else if !is_valid_username(username) {
                errors.add("username", INVALID_USERNAME);
            }
        }

        if data.password1.is_empty() {
            errors.add("password1", REQUIRED);
        }
        if data.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if data.password1 != data.password2 {
            errors.add("password2", PASSWORD_MISMATCH);
        }

        let cleaned = match username {
            Some(username) if errors.is_empty() => Some(SignupInput {
                first_name: data.first_name.trim().to_string(),
                last_name: data.last_name.trim().to_string(),
                username,
                password: data.password1.clone(),
            }),
            _ => None,
        };

        SignupForm {
            data,
            errors,
            cleaned,
        }
    }

    pub fn cleaned(&self) -> Option<&SignupInput> {
        self.cleaned.as_ref()
    }

    pub fn reject_username(&mut self) {
        self.errors.add("username", USERNAME_TAKEN);
        self.cleaned = None;
    }

    pub fn fields() -> [FieldMeta; 6] {
        SIGNUP_FIELDS
    }

    /// Submitted value of a text field; passwords are never echoed back.
    pub fn value(&self, name: &str) -> &str {
        match name {
            "first_name" => &self.data.first_name,
            "last_name" => &self.data.last_name,
            "username" => &self.data.username,
            "email" => &self.data.email,
            _ => "",
        }
    }

    pub fn field_errors(&self, name: &str) -> &[String] {
        self.errors.get(name)
    }
}

/// Letters, digits and `@.+-_`, as allowed in usernames.
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
}
