//! Post listing, detail and authoring handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use yatube_core::domain::{Group, Post, PostCard, PostFilter};
use yatube_core::{POSTS_PER_PAGE, Page, Paginator};
use yatube_shared::FormErrors;
use yatube_shared::dto::{PageQuery, PostForm};

use super::redirect;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::views::{
    self, GroupListTemplate, IndexTemplate, PostCardView, PostDetailTemplate, PostFormTemplate,
    ProfileTemplate,
};

const INDEX_TITLE: &str = "Latest updates";

/// Count, window and fetch one page of post cards.
async fn paginate_posts(
    state: &AppState,
    filter: PostFilter,
    query: &PageQuery,
) -> AppResult<Page<PostCardView>> {
    let count = state.posts.count(filter).await?;
    let paginator = Paginator::new(count, POSTS_PER_PAGE);
    let window = paginator.get_page(query.as_deref());
    let cards = state.posts.list(filter, window.offset, window.limit).await?;

    Ok(paginator.page(window, cards).map(PostCardView::from))
}

/// Post ids that do not parse are treated like unknown ones.
async fn find_post_card(state: &AppState, raw_id: &str) -> AppResult<PostCard> {
    let not_found = || AppError::NotFound(format!("post {raw_id}"));
    let post_id = Uuid::parse_str(raw_id).map_err(|_| not_found())?;

    state.posts.find_card(post_id).await?.ok_or_else(not_found)
}

fn group_ids(groups: &[Group]) -> Vec<Uuid> {
    groups.iter().map(|g| g.id).collect()
}

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = paginate_posts(&state, PostFilter::All, &query).await?;

    views::render(IndexTemplate {
        viewer: viewer.username(),
        title: INDEX_TITLE.to_string(),
        page,
    })
}

/// GET /group/{slug}/
pub async fn group_posts(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let group = state
        .groups
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("group '{slug}'")))?;

    let page = paginate_posts(&state, PostFilter::Group(group.id), &query).await?;

    views::render(GroupListTemplate {
        viewer: viewer.username(),
        group,
        page,
    })
}

/// GET /profile/{username}/
pub async fn profile(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    let author = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user '{username}'")))?;

    let page = paginate_posts(&state, PostFilter::Author(author.id), &query).await?;

    views::render(ProfileTemplate {
        viewer: viewer.username(),
        title: format!("Profile of user {}", author.username),
        post_count: page.count,
        author: author.username,
        page,
    })
}

/// GET /posts/{post_id}/
pub async fn post_detail(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let card = find_post_card(&state, &path).await?;
    let post_count = state
        .posts
        .count(PostFilter::Author(card.author.id))
        .await?;
    let can_edit = viewer
        .0
        .as_ref()
        .is_some_and(|identity| card.post.is_authored_by(identity.user_id));

    views::render(PostDetailTemplate::new(
        viewer.username(),
        card,
        post_count,
        can_edit,
    ))
}

/// GET /create/
pub async fn post_create_form(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let groups = state.groups.list_all().await?;

    views::render(PostFormTemplate::create(
        identity.username,
        &PostForm::default(),
        &groups,
        FormErrors::new(),
    ))
}

/// POST /create/
pub async fn post_create(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let groups = state.groups.list_all().await?;

    let input = match form.clean(&group_ids(&groups)) {
        Ok(input) => input,
        Err(errors) => {
            return views::render(PostFormTemplate::create(
                identity.username,
                &form,
                &groups,
                errors,
            ));
        }
    };

    let post = state
        .posts
        .insert(Post::new(identity.user_id, input.text, input.group_id))
        .await?;
    tracing::info!(post_id = %post.id, author = %identity.username, "Post created");

    Ok(redirect(&views::profile_path(&identity.username)))
}

/// GET /posts/{post_id}/edit/
pub async fn post_edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let card = find_post_card(&state, &path).await?;
    if !card.post.is_authored_by(identity.user_id) {
        return Ok(deny_edit(&identity, &card));
    }

    let groups = state.groups.list_all().await?;
    let form = PostForm::from_values(&card.post.text, card.post.group_id);

    views::render(PostFormTemplate::edit(
        identity.username,
        card.post.id,
        &form,
        &groups,
        FormErrors::new(),
    ))
}

/// POST /posts/{post_id}/edit/
pub async fn post_edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let card = find_post_card(&state, &path).await?;
    if !card.post.is_authored_by(identity.user_id) {
        return Ok(deny_edit(&identity, &card));
    }

    let groups = state.groups.list_all().await?;

    let input = match form.clean(&group_ids(&groups)) {
        Ok(input) => input,
        Err(errors) => {
            return views::render(PostFormTemplate::edit(
                identity.username,
                card.post.id,
                &form,
                &groups,
                errors,
            ));
        }
    };

    let mut post = card.post;
    post.revise(identity.user_id, input.text, input.group_id);
    let post = state.posts.update(post).await?;
    tracing::info!(post_id = %post.id, author = %identity.username, "Post updated");

    Ok(redirect(&views::post_path(post.id)))
}

/// Non-authors are sent to the author's profile without a message.
fn deny_edit(identity: &Identity, card: &PostCard) -> HttpResponse {
    tracing::warn!(
        post_id = %card.post.id,
        user = %identity.username,
        "Edit attempt by non-author redirected"
    );
    redirect(&views::profile_path(&card.author.username))
}
