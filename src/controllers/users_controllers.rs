use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{extract, Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;

use log::info;

use crate::context::AppContext;
use crate::controllers::{backend_failure, guard_action, invalid_form};
use crate::gateway::resources::{Resource, ResourceClient};
use crate::models::page_model::Pagination;
use crate::models::user_model::{Role, UserForm, UserRecord};
use crate::policy::{self, UiAction};

const USERS_ROUTE: &str = "/admin/usuarios";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UserQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub search: Option<String>,
}

impl UserQuery {
    fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("page".to_string(), self.page().to_string())];
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            params.push(("search".to_string(), search.to_string()));
        }
        params
    }
}

//CRUD BASICS
pub async fn all_users(Extension(ctx): Extension<AppContext>, Query(query): Query<UserQuery>) -> Response {
    let state = match guard_action(&ctx, UiAction::ManageUsers).await {
        Ok(state) => state,
        Err(response) => return response,
    };
    let client = ResourceClient::new(ctx.gateway.as_ref(), state.access_token());
    match client.list::<UserRecord>(Resource::Users, query.to_params()).await {
        Ok(listing) => Json(json!({
            "view": "users",
            "filters": query,
            "users": listing.items,
            "pagination": Pagination::of(query.page(), &listing),
            "can_delete": policy::can(&state, UiAction::DeleteUser),
            "navigation": policy::navigation(&state),
        }))
        .into_response(),
        Err(err) => backend_failure(&ctx, err, "Unable to load users").await,
    }
}

fn form_view(form: UserForm, id: Option<i64>) -> Response {
    let view = if id.is_some() { "user_edit" } else { "user_new" };
    Json(json!({
        "view": view,
        "id": id,
        "form": form,
        "roles": Role::ALL,
    }))
    .into_response()
}

pub async fn new_user(Extension(ctx): Extension<AppContext>) -> Response {
    match guard_action(&ctx, UiAction::ManageUsers).await {
        Ok(_) => form_view(UserForm::default(), None),
        Err(response) => response,
    }
}

pub async fn one_user(Extension(ctx): Extension<AppContext>, Path(id): Path<i64>) -> Response {
    let state = match guard_action(&ctx, UiAction::ManageUsers).await {
        Ok(state) => state,
        Err(response) => return response,
    };
    let client = ResourceClient::new(ctx.gateway.as_ref(), state.access_token());
    match client.get::<UserRecord>(Resource::Users, id).await {
        Ok(user) => form_view(UserForm::from(user), Some(id)),
        Err(err) => backend_failure(&ctx, err, "Unable to load the user").await,
    }
}

pub async fn create_user(
    Extension(ctx): Extension<AppContext>,
    extract::Json(body): extract::Json<UserForm>,
) -> Response {
    let state = match guard_action(&ctx, UiAction::ManageUsers).await {
        Ok(state) => state,
        Err(response) => return response,
    };
    if body.email.trim().is_empty() {
        return invalid_form("Email is required");
    }
    let client = ResourceClient::new(ctx.gateway.as_ref(), state.access_token());
    match client.create(Resource::Users, &body).await {
        Ok(created) => {
            info!("user created: {}", body.email);
            (
                StatusCode::CREATED,
                Json(json!({ "user": created, "redirect": USERS_ROUTE })),
            )
                .into_response()
        }
        Err(err) => backend_failure(&ctx, err, "Unable to save the user").await,
    }
}

pub async fn modify_user(
    Extension(ctx): Extension<AppContext>,
    Path(id): Path<i64>,
    extract::Json(body): extract::Json<UserForm>,
) -> Response {
    let state = match guard_action(&ctx, UiAction::ManageUsers).await {
        Ok(state) => state,
        Err(response) => return response,
    };
    if body.email.trim().is_empty() {
        return invalid_form("Email is required");
    }
    let client = ResourceClient::new(ctx.gateway.as_ref(), state.access_token());
    match client.update(Resource::Users, id, &body).await {
        Ok(updated) => {
            info!("user {} modified", id);
            Json(json!({ "user": updated, "redirect": USERS_ROUTE })).into_response()
        }
        Err(err) => backend_failure(&ctx, err, "Unable to save the user").await,
    }
}

pub async fn delete_user(Extension(ctx): Extension<AppContext>, Path(id): Path<i64>) -> Response {
    let state = match guard_action(&ctx, UiAction::DeleteUser).await {
        Ok(state) => state,
        Err(response) => return response,
    };
    let client = ResourceClient::new(ctx.gateway.as_ref(), state.access_token());
    match client.delete(Resource::Users, id).await {
        Ok(()) => {
            info!("user {} deleted", id);
            Json(json!({ "deleted": id, "redirect": USERS_ROUTE })).into_response()
        }
        Err(err) => backend_failure(&ctx, err, "Unable to delete the user").await,
    }
}
