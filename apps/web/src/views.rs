//! Askama templates and the view models they render.

use actix_web::{HttpResponse, http::StatusCode};
use askama::Template;

use yatube_core::Page;
use yatube_core::domain::{Group, PostCard};
use yatube_shared::FormErrors;
use yatube_shared::dto::{LoginForm, PostForm, SignupForm};

use crate::middleware::error::{AppError, AppResult};

/// Render `template` as a `200 OK` HTML page.
pub fn render<T: Template>(template: T) -> AppResult<HttpResponse> {
    let body = template
        .render()
        .map_err(|e| AppError::Internal(format!("template rendering failed: {e}")))?;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}

/// Render `template` with an explicit status, degrading to plain text if
/// the template itself fails.
pub fn html_response<T: Template>(status: StatusCode, template: T) -> HttpResponse {
    match template.render() {
        Ok(body) => HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(e) => {
            tracing::error!(error = %e, "Error page failed to render");
            HttpResponse::build(status)
                .content_type("text/plain; charset=utf-8")
                .body(status.canonical_reason().unwrap_or("Error"))
        }
    }
}

pub fn profile_path(username: &str) -> String {
    format!("/profile/{username}/")
}

pub fn post_path(post_id: uuid::Uuid) -> String {
    format!("/posts/{post_id}/")
}

#[derive(Debug, Clone)]
pub struct GroupLink {
    pub title: String,
    pub slug: String,
}

/// A post as shown in listings and on its own page.
#[derive(Debug, Clone)]
pub struct PostCardView {
    pub id: String,
    pub text: String,
    pub author: String,
    pub group: Option<GroupLink>,
    pub pub_date: String,
}

impl From<PostCard> for PostCardView {
    fn from(card: PostCard) -> Self {
        Self {
            id: card.post.id.to_string(),
            text: card.post.text,
            author: card.author.username,
            group: card.group.map(|g| GroupLink {
                title: g.title,
                slug: g.slug,
            }),
            pub_date: card.post.created_at.format("%d %b %Y %H:%M").to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "posts/index.html")]
pub struct IndexTemplate {
    pub viewer: Option<String>,
    pub title: String,
    pub page: Page<PostCardView>,
}

#[derive(Template)]
#[template(path = "posts/group_list.html")]
pub struct GroupListTemplate {
    pub viewer: Option<String>,
    pub group: Group,
    pub page: Page<PostCardView>,
}

#[derive(Template)]
#[template(path = "posts/profile.html")]
pub struct ProfileTemplate {
    pub viewer: Option<String>,
    pub title: String,
    pub author: String,
    pub post_count: u64,
    pub page: Page<PostCardView>,
}

#[derive(Template)]
#[template(path = "posts/post_detail.html")]
pub struct PostDetailTemplate {
    pub viewer: Option<String>,
    pub title: String,
    pub post: PostCardView,
    pub author: String,
    pub post_count: u64,
    pub can_edit: bool,
}

impl PostDetailTemplate {
    pub fn new(viewer: Option<String>, card: PostCard, post_count: u64, can_edit: bool) -> Self {
        let title = format!("Post {}", card.post.text);
        let author = card.author.username.clone();
        Self {
            viewer,
            title,
            post: card.into(),
            author,
            post_count,
            can_edit,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GroupOption {
    pub id: String,
    pub title: String,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "posts/create_post.html")]
pub struct PostFormTemplate {
    pub viewer: Option<String>,
    pub title: String,
    pub is_edit: bool,
    pub action: String,
    pub text: String,
    pub groups: Vec<GroupOption>,
    pub errors: FormErrors,
}

impl PostFormTemplate {
    fn build(
        viewer: String,
        form: &PostForm,
        groups: &[Group],
        errors: FormErrors,
        edit_of: Option<uuid::Uuid>,
    ) -> Self {
        let selected = form.group.trim();
        let groups = groups
            .iter()
            .map(|g| {
                let id = g.id.to_string();
                GroupOption {
                    selected: id == selected,
                    id,
                    title: g.title.clone(),
                }
            })
            .collect();

        Self {
            viewer: Some(viewer),
            title: if edit_of.is_some() {
                "Edit post".to_string()
            } else {
                "Add post".to_string()
            },
            is_edit: edit_of.is_some(),
            action: match edit_of {
                Some(id) => format!("/posts/{id}/edit/"),
                None => "/create/".to_string(),
            },
            text: form.text.clone(),
            groups,
            errors,
        }
    }

    pub fn create(viewer: String, form: &PostForm, groups: &[Group], errors: FormErrors) -> Self {
        Self::build(viewer, form, groups, errors, None)
    }

    pub fn edit(
        viewer: String,
        post_id: uuid::Uuid,
        form: &PostForm,
        groups: &[Group],
        errors: FormErrors,
    ) -> Self {
        Self::build(viewer, form, groups, errors, Some(post_id))
    }
}

#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub viewer: Option<String>,
    pub username: String,
    pub next: String,
    pub errors: FormErrors,
}

impl LoginTemplate {
    pub fn new(viewer: Option<String>, form: &LoginForm, errors: FormErrors) -> Self {
        Self {
            viewer,
            username: form.username.clone(),
            next: form.next.clone(),
            errors,
        }
    }
}

#[derive(Template)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub viewer: Option<String>,
    pub username: String,
    pub email: String,
    pub errors: FormErrors,
}

impl SignupTemplate {
    pub fn new(viewer: Option<String>, form: &SignupForm, errors: FormErrors) -> Self {
        Self {
            viewer,
            username: form.username.clone(),
            email: form.email.clone(),
            errors,
        }
    }
}

#[derive(Template)]
#[template(path = "errors/error.html")]
pub struct ErrorTemplate {
    pub viewer: Option<String>,
    pub status: u16,
    pub heading: String,
    pub message: String,
}

impl ErrorTemplate {
    pub fn not_found() -> Self {
        Self {
            viewer: None,
            status: 404,
            heading: "Page not found".to_string(),
            message: "The page you requested does not exist.".to_string(),
        }
    }

    pub fn server_error() -> Self {
        Self {
            viewer: None,
            status: 500,
            heading: "Server error".to_string(),
            message: "Something went wrong on our side. Please try again later.".to_string(),
        }
    }
}
