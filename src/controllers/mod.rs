pub mod auth_controllers;
pub mod catalog_controllers;
pub mod pages_controllers;
pub mod tickets_controllers;
pub mod users_controllers;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::json;

use log;

use crate::context::AppContext;
use crate::errors::GatewayError;
use crate::gateway::resources::{Resource, ResourceClient};
use crate::middlewares::decision_response;
use crate::models::user_session_model::SessionState;
use crate::policy::{self, RouteAccess, UiAction, LOGIN_ROUTE};

/// Session state of a caller allowed to perform `action`, or the response
/// that replaces the action.
pub async fn guard_action(ctx: &AppContext, action: UiAction) -> Result<SessionState, Response> {
    let state = ctx.session_state().await;
    match decision_response(policy::decide_action(action, &state)) {
        None => Ok(state),
        Some(response) => {
            log::info!("{:?} refused for a {} session", action, state.label());
            Err(response)
        }
    }
}

/// Like [`guard_action`] for screens any signed-in user may open.
pub async fn guard_signed_in(ctx: &AppContext) -> Result<SessionState, Response> {
    let state = ctx.session_state().await;
    match decision_response(policy::decide(RouteAccess::Authenticated, &state)) {
        None => Ok(state),
        Some(response) => Err(response),
    }
}

/// Turns a failed backend call into the screen's answer.
///
/// A 401 means the stored credential is dead: the session is dropped and the
/// caller is sent to the login screen.
pub async fn backend_failure(ctx: &AppContext, err: GatewayError, fallback: &str) -> Response {
    if err.is_unauthorized() {
        log::warn!("backend refused the stored credential, signing out");
        ctx.authenticator().logout().await;
        return Redirect::to(LOGIN_ROUTE).into_response();
    }

    log::error!("{}: {}", fallback, err);
    let status = match &err {
        GatewayError::Status { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        GatewayError::Transport(_) | GatewayError::Decode(_) => StatusCode::BAD_GATEWAY,
    };
    (status, Json(json!({ "error": err.human_message(fallback) }))).into_response()
}

/// Locally rejected form input.
pub fn invalid_form(message: &str) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "error": message }))).into_response()
}

/// Every entry of a catalog. Failures only cost the dropdown its options,
/// except a refused credential, which ends the session like any other call.
pub async fn load_catalog<T: DeserializeOwned>(
    ctx: &AppContext,
    token: Option<&str>,
    resource: Resource,
) -> Result<Vec<T>, Response> {
    let client = ResourceClient::new(ctx.gateway.as_ref(), token);
    match client.list::<T>(resource, Vec::new()).await {
        Ok(page) => Ok(page.items),
        Err(err) if err.is_unauthorized() => {
            Err(backend_failure(ctx, err, "Unable to load catalogs").await)
        }
        Err(err) => {
            log::warn!("catalog {} unavailable: {}", resource.collection_path(), err);
            Ok(Vec::new())
        }
    }
}
