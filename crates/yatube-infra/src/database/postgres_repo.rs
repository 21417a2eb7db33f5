//! PostgreSQL repository implementations.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
};
use uuid::Uuid;

use yatube_core::domain::{Group, Post, PostCard, PostFilter, User};
use yatube_core::error::RepoError;
use yatube_core::ports::{GroupRepository, PostRepository, UserRepository};

use super::entity::group::{self, Entity as GroupEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, repo_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL group repository.
pub type PostgresGroupRepository = PostgresBaseRepository<GroupEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(%username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let result = GroupEntity::find()
            .filter(group::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.map(Into::into))
    }

    async fn list_all(&self) -> Result<Vec<Group>, RepoError> {
        let result = GroupEntity::find()
            .order_by_asc(group::Column::Title)
            .all(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

fn filtered(filter: PostFilter) -> Select<PostEntity> {
    let query = PostEntity::find();
    match filter {
        PostFilter::All => query,
        PostFilter::Group(id) => query.filter(post::Column::GroupId.eq(id)),
        PostFilter::Author(id) => query.filter(post::Column::AuthorId.eq(id)),
    }
}

impl PostgresPostRepository {
    /// Resolve authors and groups for a batch of posts with one query each.
    async fn attach(&self, posts: Vec<post::Model>) -> Result<Vec<PostCard>, RepoError> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let author_ids: BTreeSet<Uuid> = posts.iter().map(|p| p.author_id).collect();
        let group_ids: BTreeSet<Uuid> = posts.iter().filter_map(|p| p.group_id).collect();

        let authors: HashMap<Uuid, User> = UserEntity::find()
            .filter(user::Column::Id.is_in(author_ids))
            .all(&self.db)
            .await
            .map_err(repo_error)?
            .into_iter()
            .map(|m| (m.id, User::from(m)))
            .collect();

        let groups: HashMap<Uuid, Group> = if group_ids.is_empty() {
            HashMap::new()
        } else {
            GroupEntity::find()
                .filter(group::Column::Id.is_in(group_ids))
                .all(&self.db)
                .await
                .map_err(repo_error)?
                .into_iter()
                .map(|m| (m.id, Group::from(m)))
                .collect()
        };

        posts
            .into_iter()
            .map(|model| {
                let post = Post::from(model);
                let author = authors.get(&post.author_id).cloned().ok_or_else(|| {
                    RepoError::Query(format!("post {} references a missing author", post.id))
                })?;
                let group = post.group_id.and_then(|id| groups.get(&id).cloned());
                Ok(PostCard {
                    post,
                    author,
                    group,
                })
            })
            .collect()
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn count(&self, filter: PostFilter) -> Result<u64, RepoError> {
        filtered(filter).count(&self.db).await.map_err(repo_error)
    }

    async fn list(
        &self,
        filter: PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostCard>, RepoError> {
        tracing::debug!(?filter, offset, limit, "Listing posts");

        let posts = filtered(filter)
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(repo_error)?;

        self.attach(posts).await
    }

    async fn find_card(&self, id: Uuid) -> Result<Option<PostCard>, RepoError> {
        let Some(model) = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(repo_error)?
        else {
            return Ok(None);
        };

        Ok(self.attach(vec![model]).await?.pop())
    }
}
