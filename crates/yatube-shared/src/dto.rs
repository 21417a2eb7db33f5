//! Data Transfer Objects - query strings and form bodies.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::form::{FormErrors, NON_FIELD_ERRORS};

const USERNAME_MAX_CHARS: usize = 150;
const PASSWORD_MIN_CHARS: usize = 8;

/// `?page=` query parameter; kept raw so lookups can be lenient.
///
/// Decoding never fails: unrelated parameters are ignored and a repeated
/// `page` keeps its last value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl<'de> Deserialize<'de> for PageQuery {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PageQueryVisitor;

        impl<'de> Visitor<'de> for PageQueryVisitor {
            type Value = PageQuery;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("query parameters")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<PageQuery, A::Error> {
                let mut page = None;
                while let Some((key, value)) = map.next_entry::<String, String>()? {
                    if key == "page" {
                        page = Some(value);
                    }
                }
                Ok(PageQuery { page })
            }
        }

        deserializer.deserialize_map(PageQueryVisitor)
    }
}

impl PageQuery {
    pub fn as_deref(&self) -> Option<&str> {
        self.page.as_deref()
    }
}

/// `?next=` query parameter of the login page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Submitted post form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub text: String,
    /// Selected group id; empty means "no group".
    #[serde(default)]
    pub group: String,
}

/// A validated post form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostInput {
    pub text: String,
    pub group_id: Option<Uuid>,
}

impl PostForm {
    /// Prefill from stored values.
    pub fn from_values(text: &str, group_id: Option<Uuid>) -> Self {
        Self {
            text: text.to_string(),
            group: group_id.map(|id| id.to_string()).unwrap_or_default(),
        }
    }

    /// Validate against the ids of the groups that may be chosen.
    pub fn clean(&self, known_groups: &[Uuid]) -> Result<PostInput, FormErrors> {
        let mut errors = FormErrors::new();

        if self.text.trim().is_empty() {
            errors.add("text", "This field is required.");
        }

        let group = self.group.trim();
        let group_id = if group.is_empty() {
            None
        } else {
            match Uuid::parse_str(group) {
                Ok(id) if known_groups.contains(&id) => Some(id),
                _ => {
                    errors.add(
                        "group",
                        "Select a valid choice. That choice is not one of the available choices.",
                    );
                    None
                }
            }
        };

        errors.into_result(PostInput {
            text: self.text.trim().to_string(),
            group_id,
        })
    }
}

/// Submitted login form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: String,
}

impl LoginForm {
    pub fn clean(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        if self.username.trim().is_empty() {
            errors.add("username", "This field is required.");
        }
        if self.password.is_empty() {
            errors.add("password", "This field is required.");
        }
        errors.into_result(())
    }

    /// Rejection shown when the credentials do not match.
    pub fn invalid_credentials() -> FormErrors {
        let mut errors = FormErrors::new();
        errors.add(
            NON_FIELD_ERRORS,
            "Please enter a correct username and password.",
        );
        errors
    }
}

/// Submitted signup form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

/// A validated signup form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SignupForm {
    pub fn clean(&self) -> Result<SignupInput, FormErrors> {
        let mut errors = FormErrors::new();
        let username = self.username.trim();
        let email = self.email.trim();

        if username.is_empty() {
            errors.add("username", "This field is required.");
        } else if username.chars().count() > USERNAME_MAX_CHARS {
            errors.add("username", "Ensure this value has at most 150 characters.");
        } else if !username.chars().all(is_username_char) {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }

        if email.is_empty() {
            errors.add("email", "This field is required.");
        } else if !email.contains('@') {
            errors.add("email", "Enter a valid email address.");
        }

        if self.password1.chars().count() < PASSWORD_MIN_CHARS {
            errors.add(
                "password1",
                "This password is too short. It must contain at least 8 characters.",
            );
        }
        if self.password1 != self.password2 {
            errors.add("password2", "The two password fields didn't match.");
        }

        errors.into_result(SignupInput {
            username: username.to_string(),
            email: email.to_string(),
            password: self.password1.clone(),
        })
    }
}

fn is_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}
