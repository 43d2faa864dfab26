/// Polka payment webhooks
///
/// Polka authenticates with the static key from configuration, sent as
/// `Authorization: ApiKey <key>`. The key is checked before the body is read.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::auth::extract_api_key;
use crate::configuration::AuthSettings;
use crate::error::{AppError, ErrorContext, ValidationError};
use crate::store::{Store, UserStore};

const USER_UPGRADED: &str = "user.upgraded";

#[derive(Deserialize)]
pub struct PolkaEvent {
    pub event: String,
    pub data: PolkaEventData,
}

#[derive(Deserialize)]
pub struct PolkaEventData {
    pub user_id: Uuid,
}

fn api_key_matches(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// POST /api/polka/webhooks
///
/// `user.upgraded` marks the user as Chirpy Red; other events are
/// acknowledged and ignored.
///
/// # Errors
/// - 401: Missing, malformed or wrong API key
/// - 400: Body is not a Polka event
/// - 404: Unknown user
pub async fn polka_webhook(
    req: HttpRequest,
    body: web::Bytes,
    store: web::Data<dyn Store>,
    auth: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("polka_webhook");

    let key = extract_api_key(req.headers()).map_err(|e| context.fail(e))?;
    if !api_key_matches(key, &auth.polka_key) {
        return Err(context.fail(AppError::InvalidApiKey));
    }

    let PolkaEvent { event, data } = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(request_id = %context.request_id, error = %e, "Unreadable webhook body");
        context.fail(ValidationError::InvalidFormat("webhook body"))
    })?;

    if event != USER_UPGRADED {
        tracing::debug!(request_id = %context.request_id, event = %event, "Ignoring webhook event");
        return Ok(HttpResponse::NoContent().finish());
    }

    store
        .upgrade_to_chirpy_red(data.user_id)
        .await
        .map_err(|e| context.fail(e))?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %data.user_id,
        "User upgraded to Chirpy Red"
    );

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_matches() {
        assert!(api_key_matches("f271c81ff7084ee5", "f271c81ff7084ee5"));
        assert!(!api_key_matches("f271c81ff7084ee6", "f271c81ff7084ee5"));
        assert!(!api_key_matches("f271c81ff7084ee", "f271c81ff7084ee5"));
        assert!(!api_key_matches("", "f271c81ff7084ee5"));
    }
}
