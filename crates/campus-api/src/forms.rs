//! Form validation. Each validator returns cleaned input or every field
//! error found, so clients can show them all at once.

use std::collections::BTreeMap;

use serde::Serialize;

use campus_types::api::{CreatePostRequest, CreateQueryRequest, RegisterRequest};
use campus_types::models::Role;

const USERNAME_MAX: usize = 150;
const TITLE_MAX: usize = 200;
const COLLEGE_MAX: usize = 100;
const PASSWORD_MIN: usize = 8;

#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<String>>);

impl FieldErrors {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    fn finish<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub college: String,
}

pub fn validate_registration(req: RegisterRequest) -> Result<Registration, FieldErrors> {
    let mut errors = FieldErrors::default();

    let username = req.username.trim().to_string();
    if username.is_empty() {
        errors.add("username", "This field is required.");
    } else if username.chars().count() > USERNAME_MAX {
        errors.add("username", format!("Ensure this value has at most {USERNAME_MAX} characters."));
    } else if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        errors.add(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }

    let email = req.email.trim().to_string();
    if email.is_empty() {
        errors.add("email", "This field is required.");
    } else if !is_plausible_email(&email) {
        errors.add("email", "Enter a valid email address.");
    }

    if req.password.chars().count() < PASSWORD_MIN {
        errors.add(
            "password",
            format!(
                "This password is too short. It must contain at least {PASSWORD_MIN} characters."
            ),
        );
    }
    if req.password != req.password_confirm {
        errors.add("password_confirm", "The two password fields didn't match.");
    }

    let role = match req.role.parse::<Role>() {
        Ok(role) => Some(role),
        Err(_) => {
            errors.add(
                "role",
                format!(
                    "Select a valid choice. {} is not one of the available choices.",
                    req.role
                ),
            );
            None
        }
    };

    let college = req.college.trim().to_string();
    if college.chars().count() > COLLEGE_MAX {
        errors.add("college", format!("Ensure this value has at most {COLLEGE_MAX} characters."));
    }

    match role {
        Some(role) if errors.is_empty() => Ok(Registration {
            username,
            email,
            password: req.password,
            role,
            college,
        }),
        _ => Err(errors),
    }
}

pub struct QueryForm {
    pub title: String,
    pub body: String,
    pub is_anonymous: bool,
}

pub fn validate_query(req: CreateQueryRequest) -> Result<QueryForm, FieldErrors> {
    let mut errors = FieldErrors::default();
    let title = required_title(&mut errors, &req.title);
    let body = required(&mut errors, "body", &req.body);
    errors.finish(QueryForm {
        title,
        body,
        is_anonymous: req.is_anonymous,
    })
}

pub struct PostForm {
    pub title: String,
    pub body: String,
}

pub fn validate_post(req: CreatePostRequest) -> Result<PostForm, FieldErrors> {
    let mut errors = FieldErrors::default();
    let title = required_title(&mut errors, &req.title);
    let body = required(&mut errors, "body", &req.body);
    errors.finish(PostForm { title, body })
}

pub fn validate_answer(body: &str) -> Result<String, FieldErrors> {
    let mut errors = FieldErrors::default();
    let body = required(&mut errors, "body", body);
    errors.finish(body)
}

pub fn validate_message(content: &str) -> Result<String, FieldErrors> {
    let mut errors = FieldErrors::default();
    let content = required(&mut errors, "content", content);
    errors.finish(content)
}

fn required(errors: &mut FieldErrors, field: &'static str, value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, "This field is required.");
    }
    value.to_string()
}

fn required_title(errors: &mut FieldErrors, value: &str) -> String {
    let title = required(errors, "title", value);
    if title.chars().count() > TITLE_MAX {
        errors.add("title", format!("Ensure this value has at most {TITLE_MAX} characters."));
    }
    title
}

/// One `@` with something on both sides and a dot in the domain.
fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
