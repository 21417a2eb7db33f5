use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Group, User};

/// Post entity - a text entry with exactly one author and an optional group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub text: String,
    pub author_id: Uuid,
    pub group_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post.
    pub fn new(author_id: Uuid, text: String, group_id: Option<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            text,
            author_id,
            group_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the editable fields and bump `updated_at`.
    pub fn revise(&mut self, author_id: Uuid, text: String, group_id: Option<Uuid>) {
        self.author_id = author_id;
        self.text = text;
        self.group_id = group_id;
        self.updated_at = Utc::now();
    }

    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }
}

/// A post with its author and group resolved, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostCard {
    pub post: Post,
    pub author: User,
    pub group: Option<Group>,
}

/// Which posts a listing query selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(Uuid),
    Author(Uuid),
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        match self {
            PostFilter::All => true,
            PostFilter::Group(id) => post.group_id == Some(*id),
            PostFilter::Author(id) => post.author_id == *id,
        }
    }
}
