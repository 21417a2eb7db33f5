use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Group, Post, PostCard, PostFilter, User};
use crate::error::RepoError;

/// Generic repository trait defining the shared persistence operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Group repository.
#[async_trait]
pub trait GroupRepository: BaseRepository<Group, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError>;

    /// All groups ordered by title.
    async fn list_all(&self) -> Result<Vec<Group>, RepoError>;
}

/// Post repository.
///
/// Listings are ordered newest first, with the id breaking ties so that
/// pages stay stable.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn count(&self, filter: PostFilter) -> Result<u64, RepoError>;

    async fn list(
        &self,
        filter: PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostCard>, RepoError>;

    async fn find_card(&self, id: Uuid) -> Result<Option<PostCard>, RepoError>;
}
