use axum::{
    routing::{get, post},
    Router,
};

use crate::controllers::tickets_controllers;

pub fn tickets_routing() -> Router {
    Router::new()
        .route("/tickets", get(tickets_controllers::dashboard))
        .route(
            "/tickets/nuevo",
            get(tickets_controllers::new_form).post(tickets_controllers::create),
        )
        .route(
            "/tickets/{id}",
            get(tickets_controllers::detail).delete(tickets_controllers::delete_ticket),
        )
        .route(
            "/tickets/{id}/editar",
            get(tickets_controllers::edit_form).post(tickets_controllers::update),
        )
        .route("/tickets/{id}/comentarios", post(tickets_controllers::add_comment))
        .route("/admin/tickets", get(tickets_controllers::admin_tickets))
}
