use actix_web::cookie::Cookie;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::{TimeDelta, Utc};
use std::sync::Arc;
use uuid::Uuid;

use yatube_core::domain::{Group, Post, PostFilter, User};
use yatube_core::ports::{
    BaseRepository, PasswordHasher, PostRepository, SessionTokens, UserRepository,
};
use yatube_infra::{Argon2Hasher, InMemoryStore, JwtConfig, JwtSessionTokens};

use super::configure_routes;
use crate::config::SessionConfig;
use crate::observability::RequestIdMiddleware;
use crate::state::AppState;

const PASSWORD: &str = "correct-horse";

struct Fixture {
    store: Arc<InMemoryStore>,
    tokens: Arc<dyn SessionTokens>,
    passwords: Arc<dyn PasswordHasher>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
            tokens: Arc::new(JwtSessionTokens::new(JwtConfig {
                secret: "test-secret".to_string(),
                ..JwtConfig::default()
            })),
            passwords: Arc::new(Argon2Hasher::new()),
        }
    }

    async fn user(&self, username: &str) -> User {
        let hash = self.passwords.hash(PASSWORD).unwrap();
        let user = User::new(
            username.to_string(),
            format!("{username}@example.com"),
            hash,
        );
        BaseRepository::<User, Uuid>::insert(self.store.as_ref(), user)
            .await
            .unwrap()
    }

    async fn group(&self, slug: &str) -> Group {
        let group = Group::new(
            format!("Group {slug}"),
            slug.to_string(),
            "About things".to_string(),
        );
        BaseRepository::<Group, Uuid>::insert(self.store.as_ref(), group)
            .await
            .unwrap()
    }

    /// `count` posts named `entry-00`, `entry-01`, ... with increasing
    /// timestamps, so the last one is the newest.
    async fn posts(&self, author: &User, group: Option<&Group>, count: usize) -> Vec<Post> {
        let base = Utc::now() - TimeDelta::hours(1);
        let mut created = Vec::with_capacity(count);
        for i in 0..count {
            let mut post = Post::new(author.id, format!("entry-{i:02}"), group.map(|g| g.id));
            post.created_at = base + TimeDelta::seconds(i as i64);
            post.updated_at = post.created_at;
            created.push(
                BaseRepository::<Post, Uuid>::insert(self.store.as_ref(), post)
                    .await
                    .unwrap(),
            );
        }
        created
    }

    fn session_for(&self, user: &User) -> Cookie<'static> {
        let token = self.tokens.issue(user).unwrap();
        Cookie::new(SessionConfig::default().cookie_name, token)
    }

    async fn post_count(&self, filter: PostFilter) -> u64 {
        PostRepository::count(self.store.as_ref(), filter)
            .await
            .unwrap()
    }
}

macro_rules! app {
    ($fixture:expr) => {
        test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .app_data(web::Data::new(AppState::in_memory($fixture.store.clone())))
                .app_data(web::Data::new($fixture.tokens.clone()))
                .app_data(web::Data::new($fixture.passwords.clone()))
                .app_data(web::Data::new(SessionConfig::default()))
                .configure(configure_routes),
        )
        .await
    };
}

fn location<B>(resp: &actix_web::dev::ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn cards_in(body: &str) -> usize {
    body.matches("class=\"post-text\"").count()
}

/// Call `app` and collect status and body text.
macro_rules! fetch {
    ($app:expr, $req:expr) => {{
        let resp = test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let body = test::read_body(resp).await;
        (status, String::from_utf8(body.to_vec()).unwrap())
    }};
}

#[actix_web::test]
async fn test_index_shows_ten_newest_posts() {
    let fx = Fixture::new();
    let author = fx.user("leo").await;
    fx.posts(&author, None, 13).await;
    let app = app!(fx);

    let (status, body) = fetch!(app, test::TestRequest::get().uri("/"));
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Latest updates"));
    assert_eq!(cards_in(&body), 10);
    assert!(body.contains("entry-12"));
    assert!(!body.contains("entry-02"));
    assert!(body.contains("Page 1 of 2"));

    let (status, body) = fetch!(app, test::TestRequest::get().uri("/?page=2"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cards_in(&body), 3);
    assert!(body.contains("entry-00"));
}

#[actix_web::test]
async fn test_index_page_number_fallbacks() {
    let fx = Fixture::new();
    let author = fx.user("leo").await;
    fx.posts(&author, None, 13).await;
    let app = app!(fx);

    let (_, body) = fetch!(app, test::TestRequest::get().uri("/?page=abc"));
    assert!(body.contains("Page 1 of 2"));

    let (_, body) = fetch!(app, test::TestRequest::get().uri("/?page=99"));
    assert!(body.contains("Page 2 of 2"));
    assert_eq!(cards_in(&body), 3);
}

#[actix_web::test]
async fn test_listings_take_last_of_repeated_page() {
    let fx = Fixture::new();
    let author = fx.user("leo").await;
    let group = fx.group("cats").await;
    fx.posts(&author, Some(&group), 13).await;
    let app = app!(fx);

    for uri in ["/?page=1&page=2", "/group/cats/?page=1&page=2", "/profile/leo/?page=1&page=2"] {
        let (status, body) = fetch!(app, test::TestRequest::get().uri(uri));
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert!(body.contains("Page 2 of 2"), "{uri}");
        assert_eq!(cards_in(&body), 3, "{uri}");
    }
}

#[actix_web::test]
async fn test_non_integer_page_is_first() {
    let fx = Fixture::new();
    let author = fx.user("leo").await;
    fx.posts(&author, None, 13).await;
    let app = app!(fx);

    for uri in ["/?page=2.0", "/?page=1e1"] {
        let (status, body) = fetch!(app, test::TestRequest::get().uri(uri));
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert!(body.contains("Page 1 of 2"), "{uri}");
    }
}

#[actix_web::test]
async fn test_index_empty() {
    let fx = Fixture::new();
    let app = app!(fx);

    let (status, body) = fetch!(app, test::TestRequest::get().uri("/?page=5"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cards_in(&body), 0);
}

#[actix_web::test]
async fn test_group_posts_lists_only_group() {
    let fx = Fixture::new();
    let author = fx.user("leo").await;
    let cats = fx.group("cats").await;
    fx.posts(&author, Some(&cats), 2).await;
    let mut other = Post::new(author.id, "outside-any-group".to_string(), None);
    other.created_at = Utc::now();
    BaseRepository::<Post, Uuid>::insert(fx.store.as_ref(), other)
        .await
        .unwrap();
    let app = app!(fx);

    let (status, body) = fetch!(app, test::TestRequest::get().uri("/group/cats/"));
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Group cats"));
    assert_eq!(cards_in(&body), 2);
    assert!(!body.contains("outside-any-group"));
}

#[actix_web::test]
async fn test_group_posts_unknown_slug_is_404() {
    let fx = Fixture::new();
    let app = app!(fx);

    let (status, body) = fetch!(app, test::TestRequest::get().uri("/group/nope/"));
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Page not found"));
}

#[actix_web::test]
async fn test_profile_counts_all_posts() {
    let fx = Fixture::new();
    let author = fx.user("leo").await;
    let other = fx.user("mia").await;
    fx.posts(&author, None, 12).await;
    fx.posts(&other, None, 1).await;
    let app = app!(fx);

    let (status, body) = fetch!(app, test::TestRequest::get().uri("/profile/leo/"));
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("All posts of user leo"));
    assert!(body.contains("Total posts: 12"));
    assert_eq!(cards_in(&body), 10);

    let (status, _) = fetch!(app, test::TestRequest::get().uri("/profile/ghost/"));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_post_detail() {
    let fx = Fixture::new();
    let author = fx.user("leo").await;
    let group = fx.group("cats").await;
    let posts = fx.posts(&author, Some(&group), 3).await;
    let app = app!(fx);

    let uri = format!("/posts/{}/", posts[0].id);
    let (status, body) = fetch!(app, test::TestRequest::get().uri(&uri));
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("entry-00"));
    assert!(body.contains("Total posts by the author: <span>3</span>"));
    assert!(body.contains("/group/cats/"));
    assert!(!body.contains("Edit post"));

    let req = test::TestRequest::get()
        .uri(&uri)
        .cookie(fx.session_for(&author));
    let (_, body) = fetch!(app, req);
    assert!(body.contains("Edit post"));
}

#[actix_web::test]
async fn test_post_detail_unknown_or_malformed_id_is_404() {
    let fx = Fixture::new();
    let app = app!(fx);

    let uri = format!("/posts/{}/", Uuid::new_v4());
    let (status, _) = fetch!(app, test::TestRequest::get().uri(&uri));
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = fetch!(app, test::TestRequest::get().uri("/posts/42/"));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_create_requires_login() {
    let fx = Fixture::new();
    let app = app!(fx);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/create/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=%2Fcreate%2F");

    let req = test::TestRequest::post()
        .uri("/create/")
        .set_form([("text", "sneaky"), ("group", "")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(fx.post_count(PostFilter::All).await, 0);
}

#[actix_web::test]
async fn test_create_form_lists_groups() {
    let fx = Fixture::new();
    let author = fx.user("leo").await;
    fx.group("cats").await;
    let app = app!(fx);

    let req = test::TestRequest::get()
        .uri("/create/")
        .cookie(fx.session_for(&author));
    let (status, body) = fetch!(app, req);
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("New post"));
    assert!(body.contains("Group cats"));
}

#[actix_web::test]
async fn test_create_with_empty_text_rerenders_form() {
    let fx = Fixture::new();
    let author = fx.user("leo").await;
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri("/create/")
        .cookie(fx.session_for(&author))
        .set_form([("text", "   "), ("group", "")]);
    let (status, body) = fetch!(app, req);
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("This field is required."));
    assert_eq!(fx.post_count(PostFilter::All).await, 0);
}

#[actix_web::test]
async fn test_create_with_unknown_group_rerenders_form() {
    let fx = Fixture::new();
    let author = fx.user("leo").await;
    let app = app!(fx);

    let missing = Uuid::new_v4().to_string();
    let req = test::TestRequest::post()
        .uri("/create/")
        .cookie(fx.session_for(&author))
        .set_form([("text", "hello"), ("group", missing.as_str())]);
    let (status, body) = fetch!(app, req);
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("class=\"errors\""));
    assert_eq!(fx.post_count(PostFilter::All).await, 0);
}

#[actix_web::test]
async fn test_create_redirects_to_profile() {
    let fx = Fixture::new();
    let author = fx.user("leo").await;
    let group = fx.group("cats").await;
    let app = app!(fx);

    let group_id = group.id.to_string();
    let req = test::TestRequest::post()
        .uri("/create/")
        .cookie(fx.session_for(&author))
        .set_form([("text", "fresh post"), ("group", group_id.as_str())])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/leo/");

    assert_eq!(fx.post_count(PostFilter::All).await, 1);
    assert_eq!(fx.post_count(PostFilter::Group(group.id)).await, 1);
    let cards = PostRepository::list(fx.store.as_ref(), PostFilter::Author(author.id), 0, 10)
        .await
        .unwrap();
    assert_eq!(cards[0].post.text, "fresh post");
}

#[actix_web::test]
async fn test_create_strips_surrounding_whitespace() {
    let fx = Fixture::new();
    let author = fx.user("leo").await;
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri("/create/")
        .cookie(fx.session_for(&author))
        .set_form([("text", "  spaced out \n"), ("group", "")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let cards = PostRepository::list(fx.store.as_ref(), PostFilter::All, 0, 10)
        .await
        .unwrap();
    assert_eq!(cards[0].post.text, "spaced out");
}

#[actix_web::test]
async fn test_edit_by_non_author_redirects_to_author_profile() {
    let fx = Fixture::new();
    let author = fx.user("leo").await;
    let intruder = fx.user("mia").await;
    let post = fx.posts(&author, None, 1).await.remove(0);
    let app = app!(fx);

    let uri = format!("/posts/{}/edit/", post.id);
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&uri)
            .cookie(fx.session_for(&intruder))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/leo/");

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&uri)
            .cookie(fx.session_for(&intruder))
            .set_form([("text", "hijacked"), ("group", "")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/leo/");

    let stored = BaseRepository::<Post, Uuid>::find_by_id(fx.store.as_ref(), post.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.text, "entry-00");
}

#[actix_web::test]
async fn test_edit_by_author_updates_post() {
    let fx = Fixture::new();
    let author = fx.user("leo").await;
    let group = fx.group("cats").await;
    let post = fx.posts(&author, Some(&group), 1).await.remove(0);
    let app = app!(fx);

    let uri = format!("/posts/{}/edit/", post.id);
    let req = test::TestRequest::get()
        .uri(&uri)
        .cookie(fx.session_for(&author));
    let (status, body) = fetch!(app, req);
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Edit post"));
    assert!(body.contains("entry-00"));
    assert!(body.contains(" selected>"));

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&uri)
            .cookie(fx.session_for(&author))
            .set_form([("text", "rewritten"), ("group", "")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));

    let stored = BaseRepository::<Post, Uuid>::find_by_id(fx.store.as_ref(), post.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.text, "rewritten");
    assert_eq!(stored.group_id, None);
    assert_eq!(stored.author_id, author.id);
}

#[actix_web::test]
async fn test_edit_unknown_post_is_404() {
    let fx = Fixture::new();
    let author = fx.user("leo").await;
    let app = app!(fx);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/edit/", Uuid::new_v4()))
        .cookie(fx.session_for(&author));
    let (status, _) = fetch!(app, req);
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_login_sets_session_and_follows_next() {
    let fx = Fixture::new();
    fx.user("leo").await;
    let app = app!(fx);

    let (status, body) = fetch!(app, test::TestRequest::get().uri("/auth/login/?next=%2Fcreate%2F"));
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("name=\"next\""));
    assert!(body.contains("create"));

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form([("username", "leo"), ("password", PASSWORD), ("next", "/create/")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/create/");

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "yatube_session")
        .expect("session cookie");
    let claims = fx.tokens.verify(cookie.value()).unwrap();
    assert_eq!(claims.username, "leo");
}

#[actix_web::test]
async fn test_login_rejects_wrong_password_and_foreign_next() {
    let fx = Fixture::new();
    fx.user("leo").await;
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form([("username", "leo"), ("password", "wrong-password"), ("next", "")]);
    let (status, body) = fetch!(app, req);
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Please enter a correct username and password."));

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form([
            ("username", "leo"),
            ("password", PASSWORD),
            ("next", "https://evil.example/"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");
}

#[actix_web::test]
async fn test_signup_creates_user_and_logs_in() {
    let fx = Fixture::new();
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri("/auth/signup/")
        .set_form([
            ("username", "newbie"),
            ("email", "newbie@example.com"),
            ("password1", "long-enough-pass"),
            ("password2", "long-enough-pass"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");
    assert!(
        resp.response()
            .cookies()
            .any(|c| c.name() == "yatube_session")
    );

    let user = UserRepository::find_by_username(fx.store.as_ref(), "newbie")
        .await
        .unwrap()
        .unwrap();
    assert!(fx.passwords.verify("long-enough-pass", &user.password_hash).unwrap());
}

#[actix_web::test]
async fn test_signup_rejects_taken_username() {
    let fx = Fixture::new();
    fx.user("leo").await;
    let app = app!(fx);

    let req = test::TestRequest::post().uri("/auth/signup/").set_form([
        ("username", "leo"),
        ("email", "other@example.com"),
        ("password1", "long-enough-pass"),
        ("password2", "long-enough-pass"),
    ]);
    let (status, body) = fetch!(app, req);
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("A user with that username already exists."));
}

#[actix_web::test]
async fn test_logout_clears_session() {
    let fx = Fixture::new();
    let user = fx.user("leo").await;
    let app = app!(fx);

    let req = test::TestRequest::post()
        .uri("/auth/logout/")
        .cookie(fx.session_for(&user))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "yatube_session")
        .expect("removal cookie");
    assert_eq!(cookie.value(), "");
}

#[actix_web::test]
async fn test_health_reports_in_memory_storage() {
    let fx = Fixture::new();
    let app = app!(fx);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "in-memory");
}

#[actix_web::test]
async fn test_request_id_header() {
    let fx = Fixture::new();
    let app = app!(fx);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert!(resp.headers().contains_key("x-request-id"));

    let req = test::TestRequest::get()
        .uri("/no/such/page")
        .insert_header(("x-request-id", "abc-123"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "abc-123");
}
