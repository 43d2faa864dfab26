/// Admin Routes
///
/// Hit counter page and the development-only reset.

use actix_web::{web, HttpResponse};

use crate::configuration::{ApplicationSettings, Platform};
use crate::error::AppError;
use crate::metrics::HitCounter;
use crate::store::{Store, UserStore};

/// GET /admin/metrics
pub async fn metrics(counter: web::Data<HitCounter>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(format!(
            "<html><body><h1>Welcome, Chirpy Admin</h1><p>Chirpy has been visited {} times!</p></body></html>\n",
            counter.load()
        ))
}

/// POST /admin/reset
///
/// Zeroes the hit counter and deletes every user (and so every refresh token).
///
/// # Errors
/// - 403: Not running on the `dev` platform
pub async fn reset(
    counter: web::Data<HitCounter>,
    store: web::Data<dyn Store>,
    application: web::Data<ApplicationSettings>,
) -> Result<HttpResponse, AppError> {
    if application.platform != Platform::Dev {
        return Err(AppError::Forbidden(
            "reset is only allowed in dev".to_string(),
        ));
    }

    let previous_hits = counter.reset();
    let deleted_users = store.delete_all_users().await?;

    tracing::warn!(previous_hits, deleted_users, "Application state reset");

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Hits reset to 0 and database reset to initial state."))
}
