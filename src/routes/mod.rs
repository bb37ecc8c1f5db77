use axum::{middleware, Extension, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};

use tracing::Level;

mod auth_routes;
mod catalog_routes;
mod pages_routes;
pub mod route_table;
mod tickets_routes;
mod users_routes;

use crate::context::AppContext;
use crate::controllers::pages_controllers;
use crate::middlewares;

pub fn routing(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(pages_routes::pages_routing())
        .merge(auth_routes::auth_routing())
        .merge(tickets_routes::tickets_routing())
        .merge(users_routes::user_routing())
        .merge(catalog_routes::catalog_routing())
        .fallback(pages_controllers::fallback)
        .layer(middleware::from_fn(middlewares::access_guard))
        .layer(Extension(ctx))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
