use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect};
use axum::{extract, Extension, Json};
use serde_json::json;

use log::{self, error, info};

use crate::context::AppContext;
use crate::errors::AuthError;
use crate::models::user_model::LoginUser;
use crate::models::user_session_model::SessionSnapshot;
use crate::policy::{self, HOME_ROUTE};
use crate::session::authenticator::LOGIN_FALLBACK_MESSAGE;

/// Where a successful login lands.
pub const AFTER_LOGIN_ROUTE: &str = "/tickets";

pub async fn login(
    Extension(ctx): Extension<AppContext>,
    extract::Json(body): extract::Json<LoginUser>,
) -> impl IntoResponse {
    let email = body.email.trim().to_string();
    if email.is_empty() || body.password.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "Email and password are required" })),
        )
            .into_response();
    }

    match ctx.authenticator().login(&email, &body.password).await {
        Ok(session) => {
            info!("login ok for {}", email);
            Json(json!({
                "user": session.profile,
                "redirect": AFTER_LOGIN_ROUTE,
            }))
            .into_response()
        }
        Err(AuthError::Credential(message)) => {
            info!("login refused for {}", email);
            (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
        }
        Err(err) => {
            error!("login failed for {}: {}", email, err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": LOGIN_FALLBACK_MESSAGE })),
            )
                .into_response()
        }
    }
}

pub async fn logout(Extension(ctx): Extension<AppContext>) -> impl IntoResponse {
    ctx.authenticator().logout().await;
    Redirect::to(HOME_ROUTE)
}

pub async fn get_session(Extension(ctx): Extension<AppContext>) -> impl IntoResponse {
    let state = ctx.session_state().await;
    log::debug!("session check: {}", state.label());
    Json(json!({
        "session": SessionSnapshot::from(&state),
        "navigation": policy::navigation(&state),
    }))
}
