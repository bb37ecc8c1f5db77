use axum::{routing::get, Router};

use crate::controllers::pages_controllers;

pub fn pages_routing() -> Router {
    Router::new()
        .route("/", get(pages_controllers::home))
        .route("/about", get(pages_controllers::about))
        .route("/unauthorized", get(pages_controllers::unauthorized))
        .route("/navigate", get(pages_controllers::navigate))
}
