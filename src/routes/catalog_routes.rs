use axum::{
    routing::{delete, get},
    Router,
};

use crate::controllers::catalog_controllers;
use crate::models::catalog_model::{CatalogEntry, Category, Channel, TicketState};

fn catalog<T: CatalogEntry>() -> Router {
    let base = format!("/admin/{}", T::VIEW);
    Router::new()
        .route(&base, get(catalog_controllers::list::<T>))
        .route(
            &format!("{}/nuevo", base),
            get(catalog_controllers::new_form::<T>).post(catalog_controllers::create::<T>),
        )
        .route(
            &format!("{}/{{id}}/editar", base),
            get(catalog_controllers::edit_form::<T>).post(catalog_controllers::update::<T>),
        )
        .route(&format!("{}/{{id}}", base), delete(catalog_controllers::delete::<T>))
}

pub fn catalog_routing() -> Router {
    Router::new()
        .merge(catalog::<Category>())
        .merge(catalog::<TicketState>())
        .merge(catalog::<Channel>())
}
