use axum::{
    routing::{delete, get},
    Router,
};

use crate::controllers::users_controllers;

pub fn user_routing() -> Router {
    Router::new()
        .route("/admin/usuarios", get(users_controllers::all_users))
        .route(
            "/admin/usuarios/nuevo",
            get(users_controllers::new_user).post(users_controllers::create_user),
        )
        .route(
            "/admin/usuarios/{id}/editar",
            get(users_controllers::one_user).post(users_controllers::modify_user),
        )
        .route("/admin/usuarios/{id}", delete(users_controllers::delete_user))
}
