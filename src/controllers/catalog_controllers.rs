//! Administration of the ticket catalogs (categories, states, channels).
//!
//! Every handler is generic over [`CatalogEntry`] and mounted once per
//! catalog under `/admin/<view>`.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{extract, Extension, Json};
use serde_json::json;

use log::{info, warn};

use crate::context::AppContext;
use crate::controllers::{backend_failure, guard_action};
use crate::gateway::resources::ResourceClient;
use crate::models::catalog_model::CatalogEntry;
use crate::policy::{self, UiAction};

fn list_route<T: CatalogEntry>() -> String {
    format!("/admin/{}", T::VIEW)
}

pub async fn list<T: CatalogEntry>(Extension(ctx): Extension<AppContext>) -> Response {
    let state = match guard_action(&ctx, UiAction::ManageCatalogs).await {
        Ok(state) => state,
        Err(response) => return response,
    };
    let client = ResourceClient::new(ctx.gateway.as_ref(), state.access_token());
    match client.list::<T>(T::RESOURCE, Vec::new()).await {
        Ok(listing) => Json(json!({
            "view": T::VIEW,
            "items": listing.items,
            "navigation": policy::navigation(&state),
        }))
        .into_response(),
        Err(err) => backend_failure(&ctx, err, T::LOAD_ERROR).await,
    }
}

pub async fn new_form<T: CatalogEntry>(Extension(ctx): Extension<AppContext>) -> Response {
    if let Err(response) = guard_action(&ctx, UiAction::ManageCatalogs).await {
        return response;
    }
    Json(json!({
        "view": format!("{}_new", T::VIEW),
        "form": T::Form::default(),
    }))
    .into_response()
}

/// The backend has no single-entry lookup the screens rely on, so the entry
/// is found in the full listing.
pub async fn edit_form<T: CatalogEntry>(Extension(ctx): Extension<AppContext>, Path(id): Path<i64>) -> Response {
    let state = match guard_action(&ctx, UiAction::ManageCatalogs).await {
        Ok(state) => state,
        Err(response) => return response,
    };
    let client = ResourceClient::new(ctx.gateway.as_ref(), state.access_token());
    let listing = match client.list::<T>(T::RESOURCE, Vec::new()).await {
        Ok(listing) => listing,
        Err(err) => return backend_failure(&ctx, err, T::LOAD_ERROR).await,
    };

    match listing.items.iter().find(|entry| entry.id() == id) {
        Some(entry) => Json(json!({
            "view": format!("{}_edit", T::VIEW),
            "id": id,
            "form": entry.to_form(),
        }))
        .into_response(),
        None => {
            warn!("{} {} not in the catalog listing", T::VIEW, id);
            (StatusCode::NOT_FOUND, Json(json!({ "error": T::LOAD_ERROR }))).into_response()
        }
    }
}

pub async fn create<T: CatalogEntry>(
    Extension(ctx): Extension<AppContext>,
    extract::Json(form): extract::Json<T::Form>,
) -> Response {
    let state = match guard_action(&ctx, UiAction::ManageCatalogs).await {
        Ok(state) => state,
        Err(response) => return response,
    };
    let client = ResourceClient::new(ctx.gateway.as_ref(), state.access_token());
    match client.create(T::RESOURCE, &form).await {
        Ok(created) => {
            info!("{} entry created", T::VIEW);
            (
                StatusCode::CREATED,
                Json(json!({ "item": created, "redirect": list_route::<T>() })),
            )
                .into_response()
        }
        Err(err) => backend_failure(&ctx, err, T::SAVE_ERROR).await,
    }
}

pub async fn update<T: CatalogEntry>(
    Extension(ctx): Extension<AppContext>,
    Path(id): Path<i64>,
    extract::Json(form): extract::Json<T::Form>,
) -> Response {
    let state = match guard_action(&ctx, UiAction::ManageCatalogs).await {
        Ok(state) => state,
        Err(response) => return response,
    };
    let client = ResourceClient::new(ctx.gateway.as_ref(), state.access_token());
    match client.update(T::RESOURCE, id, &form).await {
        Ok(updated) => {
            info!("{} {} updated", T::VIEW, id);
            Json(json!({ "item": updated, "redirect": list_route::<T>() })).into_response()
        }
        Err(err) => backend_failure(&ctx, err, T::SAVE_ERROR).await,
    }
}

pub async fn delete<T: CatalogEntry>(Extension(ctx): Extension<AppContext>, Path(id): Path<i64>) -> Response {
    let state = match guard_action(&ctx, UiAction::ManageCatalogs).await {
        Ok(state) => state,
        Err(response) => return response,
    };
    let client = ResourceClient::new(ctx.gateway.as_ref(), state.access_token());
    match client.delete(T::RESOURCE, id).await {
        Ok(()) => {
            info!("{} {} deleted", T::VIEW, id);
            Json(json!({ "deleted": id, "redirect": list_route::<T>() })).into_response()
        }
        Err(err) => backend_failure(&ctx, err, T::DELETE_ERROR).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::test_support::*;
    use crate::gateway::testing::ScriptedGateway;
    use crate::models::catalog_model::{Category, Channel, ChannelForm, StateForm, TicketState};
    use crate::models::user_model::Role;
    use axum::http::header::LOCATION;
    use reqwest::Method;
    use serde_json::Value;

    fn states() -> Value {
        json!({"results": [
            {"id_estado": 1, "nombre_estado": "Abierto", "es_final": false},
            {"id_estado": 4, "nombre_estado": "Cerrado", "es_final": true},
        ], "next": null, "previous": null})
    }

    #[tokio::test]
    async fn edit_form_finds_entry_in_listing() {
        let gateway = ScriptedGateway::new().ok(Method::GET, "/api/estados/", states());
        let (ctx, _) = signed_in(Role::Admin, gateway);

        let body = body_json(edit_form::<TicketState>(Extension(ctx), Path(4)).await).await;
        assert_eq!(body["view"], "estados_edit");
        assert_eq!(body["form"], json!({"nombre_estado": "Cerrado", "es_final": true}));
    }

    #[tokio::test]
    async fn edit_form_of_unknown_entry_is_not_found() {
        let gateway = ScriptedGateway::new().ok(Method::GET, "/api/estados/", states());
        let (ctx, _) = signed_in(Role::Admin, gateway);

        let response = edit_form::<TicketState>(Extension(ctx), Path(99)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Unable to load states");
    }

    #[tokio::test]
    async fn catalogs_are_admin_only() {
        let (ctx, gateway) = signed_in(Role::Agente, ScriptedGateway::new());
        let response = list::<Category>(Extension(ctx.clone())).await;
        assert_eq!(response.headers()[LOCATION], "/unauthorized");

        let form = extract::Json(ChannelForm {
            nombre_canal: "Chat".to_string(),
            descripcion: String::new(),
        });
        let response = create::<Channel>(Extension(ctx), form).await;
        assert_eq!(response.headers()[LOCATION], "/unauthorized");
        assert!(gateway.requests().is_empty());
    }

    #[tokio::test]
    async fn update_patches_and_returns_to_list() {
        let gateway = ScriptedGateway::new().ok(
            Method::PATCH,
            "/api/estados/1/",
            json!({"id_estado": 1, "nombre_estado": "Nuevo", "es_final": false}),
        );
        let (ctx, gateway) = signed_in(Role::Admin, gateway);
        let form = extract::Json(StateForm {
            nombre_estado: "Nuevo".to_string(),
            es_final: false,
        });

        let body = body_json(update::<TicketState>(Extension(ctx), Path(1), form).await).await;
        assert_eq!(body["redirect"], "/admin/estados");
        assert_eq!(
            gateway.requests()[0].body,
            Some(json!({"nombre_estado": "Nuevo", "es_final": false}))
        );
    }

    #[tokio::test]
    async fn failed_save_uses_backend_message() {
        let gateway = ScriptedGateway::new().fail(
            Method::POST,
            "/api/categorias/",
            400,
            Some(json!({"message": "Nombre duplicado"})),
        );
        let (ctx, _) = signed_in(Role::Admin, gateway);
        let form = extract::Json(crate::models::catalog_model::CategoryForm {
            nombre_categoria: "Hardware".to_string(),
            descripcion: String::new(),
        });

        let response = create::<Category>(Extension(ctx), form).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Nombre duplicado");
    }

    #[tokio::test]
    async fn delete_returns_to_list() {
        let gateway = ScriptedGateway::new().ok(Method::DELETE, "/api/canales/2/", Value::Null);
        let (ctx, _) = signed_in(Role::Admin, gateway);
        let body = body_json(delete::<Channel>(Extension(ctx), Path(2)).await).await;
        assert_eq!(body, json!({"deleted": 2, "redirect": "/admin/canales"}));
    }
}
