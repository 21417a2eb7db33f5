//! HTTP handlers and route configuration.

mod auth;
mod health;
mod posts;

#[cfg(test)]
mod tests;

use actix_web::{HttpResponse, http::header, web};

/// `302 Found` to `location`.
pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Public pages
        .route("/", web::get().to(posts::index))
        .route("/group/{slug}/", web::get().to(posts::group_posts))
        .route("/profile/{username}/", web::get().to(posts::profile))
        .route("/posts/{post_id}/", web::get().to(posts::post_detail))
        // Authoring - login required
        .service(
            web::resource("/create/")
                .route(web::get().to(posts::post_create_form))
                .route(web::post().to(posts::post_create)),
        )
        .service(
            web::resource("/posts/{post_id}/edit/")
                .route(web::get().to(posts::post_edit_form))
                .route(web::post().to(posts::post_edit)),
        )
        // Accounts
        .service(
            web::scope("/auth")
                .service(
                    web::resource("/signup/")
                        .route(web::get().to(auth::signup_form))
                        .route(web::post().to(auth::signup)),
                )
                .service(
                    web::resource("/login/")
                        .route(web::get().to(auth::login_form))
                        .route(web::post().to(auth::login)),
                )
                .route("/logout/", web::post().to(auth::logout)),
        )
        .route("/health", web::get().to(health::health_check))
        .default_service(web::to(not_found));
}

async fn not_found() -> crate::middleware::error::AppResult<HttpResponse> {
    Err(crate::middleware::error::AppError::NotFound(
        "No route matches the request".to_string(),
    ))
}
