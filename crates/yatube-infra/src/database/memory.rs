//! In-memory store - used when no database is configured, and in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use yatube_core::domain::{Group, Post, PostCard, PostFilter, User};
use yatube_core::error::RepoError;
use yatube_core::ports::{BaseRepository, GroupRepository, PostRepository, UserRepository};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    groups: HashMap<Uuid, Group>,
    posts: HashMap<Uuid, Post>,
}

impl Tables {
    fn card(&self, post: &Post) -> Result<PostCard, RepoError> {
        let author = self.users.get(&post.author_id).cloned().ok_or_else(|| {
            RepoError::Query(format!("post {} references a missing author", post.id))
        })?;
        let group = post.group_id.and_then(|id| self.groups.get(&id).cloned());

        Ok(PostCard {
            post: post.clone(),
            author,
            group,
        })
    }
}

/// All three collections behind one async RwLock.
///
/// Implements every repository port, so a single `Arc<InMemoryStore>` can
/// back the whole application. Data is lost on process restart.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(RepoError::Conflict("already exists".to_string()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        let slot = tables.users.get_mut(&user.id).ok_or(RepoError::NotFound)?;
        *slot = user.clone();
        Ok(user)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl BaseRepository<Group, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>, RepoError> {
        Ok(self.tables.read().await.groups.get(&id).cloned())
    }

    async fn insert(&self, group: Group) -> Result<Group, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.groups.values().any(|g| g.slug == group.slug) {
            return Err(RepoError::Conflict("already exists".to_string()));
        }
        tables.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn update(&self, group: Group) -> Result<Group, RepoError> {
        let mut tables = self.tables.write().await;
        let slot = tables.groups.get_mut(&group.id).ok_or(RepoError::NotFound)?;
        *slot = group.clone();
        Ok(group)
    }
}

#[async_trait]
impl GroupRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.values().find(|g| g.slug == slug).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Group>, RepoError> {
        let tables = self.tables.read().await;
        let mut groups: Vec<Group> = tables.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&post.author_id) {
            return Err(RepoError::Conflict("unknown author".to_string()));
        }
        if tables.posts.contains_key(&post.id) {
            return Err(RepoError::Conflict("already exists".to_string()));
        }
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        let slot = tables.posts.get_mut(&post.id).ok_or(RepoError::NotFound)?;
        *slot = post.clone();
        Ok(post)
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn count(&self, filter: PostFilter) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.values().filter(|p| filter.matches(p)).count() as u64)
    }

    async fn list(
        &self,
        filter: PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostCard>, RepoError> {
        let tables = self.tables.read().await;

        let mut posts: Vec<&Post> = tables.posts.values().filter(|p| filter.matches(p)).collect();
        // Newest first, id as tie-breaker.
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        posts
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|post| tables.card(post))
            .collect()
    }

    async fn find_card(&self, id: Uuid) -> Result<Option<PostCard>, RepoError> {
        let tables = self.tables.read().await;
        tables.posts.get(&id).map(|post| tables.card(post)).transpose()
    }
}
