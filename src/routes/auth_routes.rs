use axum::{routing::get, Router};

use crate::controllers::{auth_controllers, pages_controllers};

pub fn auth_routing() -> Router {
    Router::new()
        .route(
            "/login",
            get(pages_controllers::login_page).post(auth_controllers::login),
        )
        .route("/logout", get(auth_controllers::logout))
        .route("/session", get(auth_controllers::get_session))
}
