use axum::extract::Query;
use axum::response::{IntoResponse, Redirect};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use log;

use crate::context::AppContext;
use crate::models::user_session_model::SessionState;
use crate::policy::{self, HOME_ROUTE};
use crate::routes::route_table;

fn page(view: &str, state: &SessionState, content: Value) -> Json<Value> {
    Json(json!({
        "view": view,
        "user": state.profile(),
        "navigation": policy::navigation(state),
        "content": content,
    }))
}

pub async fn home(Extension(ctx): Extension<AppContext>) -> impl IntoResponse {
    let state = ctx.session_state().await;
    let call_to_action = if state.is_authenticated() { "/tickets" } else { "/login" };
    page(
        "home",
        &state,
        json!({
            "title": "Sistema de Tickets de Soporte Técnico",
            "call_to_action": call_to_action,
            "features": [
                "Gestión de Tickets",
                "Múltiples Roles",
                "Rápido y Eficiente",
                "Seguimiento",
            ],
        }),
    )
}

pub async fn about(Extension(ctx): Extension<AppContext>) -> impl IntoResponse {
    let state = ctx.session_state().await;
    page(
        "about",
        &state,
        json!({
            "title": "Acerca del Sistema",
            "roles": ["CLIENTE", "AGENTE", "ADMIN"],
        }),
    )
}

pub async fn login_page(Extension(ctx): Extension<AppContext>) -> impl IntoResponse {
    let state = ctx.session_state().await;
    page("login", &state, json!({ "fields": ["email", "password"] }))
}

pub async fn unauthorized(Extension(ctx): Extension<AppContext>) -> impl IntoResponse {
    let state = ctx.session_state().await;
    page(
        "unauthorized",
        &state,
        json!({
            "title": "Acceso no autorizado",
            "back": HOME_ROUTE,
        }),
    )
}

/// Catch-all for paths no view answers.
pub async fn fallback() -> Redirect {
    Redirect::to(HOME_ROUTE)
}

#[derive(Debug, Deserialize)]
pub struct NavigateQuery {
    #[serde(default)]
    pub path: String,
}

/// Resolves a path without opening it.
pub async fn navigate(
    Extension(ctx): Extension<AppContext>,
    Query(query): Query<NavigateQuery>,
) -> impl IntoResponse {
    let state = ctx.session_state().await;
    let outcome = route_table::navigate(&query.path, &state);
    log::debug!("navigate {} -> {:?}", query.path, outcome);
    Json(outcome)
}
