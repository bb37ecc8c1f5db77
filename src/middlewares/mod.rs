use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Extension, Json};
use serde_json::json;

use log;

use crate::context::AppContext;
use crate::policy::{self, Decision};
use crate::routes::route_table;

/// Applies the access policy to every request aimed at a view of the route
/// table. Requests outside the table pass through untouched.
pub async fn access_guard(Extension(ctx): Extension<AppContext>, req: Request, next: Next) -> Response {
    let Some(found) = route_table::match_path(req.uri().path()) else {
        return next.run(req).await;
    };

    let state = ctx.session_state().await;
    let decision = policy::decide(found.route.access, &state);
    log::debug!(
        "{} {} -> {:?} ({})",
        req.method(),
        found.route.pattern,
        decision,
        state.label()
    );

    match decision_response(decision) {
        Some(response) => response,
        None => next.run(req).await,
    }
}

/// Response standing in for a view the session may not see yet, `None` when
/// the decision allows it.
pub fn decision_response(decision: Decision) -> Option<Response> {
    match decision {
        Decision::Allow => None,
        Decision::Loading => Some(loading_view()),
        denied => denied
            .redirect_target()
            .map(|target| Redirect::to(target).into_response()),
    }
}

pub fn loading_view() -> Response {
    (StatusCode::ACCEPTED, Json(json!({"view": "loading"}))).into_response()
}
