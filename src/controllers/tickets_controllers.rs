use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{extract, Extension, Json};
use serde_json::json;

use log::{self, info, warn};

use crate::board;
use crate::context::AppContext;
use crate::controllers::{backend_failure, guard_action, guard_signed_in, invalid_form, load_catalog};
use crate::gateway::resources::{Resource, ResourceClient};
use crate::models::catalog_model::{priority_catalog, Category, Channel, TicketState};
use crate::models::page_model::Pagination;
use crate::models::ticket_model::{
    Comment, CommentPayload, NewComment, Ticket, TicketFilters, TicketForm, TicketPayload,
};
use crate::models::user_session_model::SessionState;
use crate::policy::{self, UiAction};

const TICKETS_ROUTE: &str = "/tickets";

fn profile_id(state: &SessionState) -> Option<i64> {
    state.profile().and_then(|profile| profile.id)
}

/// Kanban dashboard with filters, counters and pagination.
pub async fn dashboard(
    Extension(ctx): Extension<AppContext>,
    Query(filters): Query<TicketFilters>,
) -> Response {
    let state = match guard_signed_in(&ctx).await {
        Ok(state) => state,
        Err(response) => return response,
    };
    let token = state.access_token();
    let client = ResourceClient::new(ctx.gateway.as_ref(), token);

    let listing = match client.list::<Ticket>(Resource::Tickets, filters.to_params(true)).await {
        Ok(listing) => listing,
        Err(err) => return backend_failure(&ctx, err, "Unable to load tickets").await,
    };
    let states: Vec<TicketState> = match load_catalog(&ctx, token, Resource::States).await {
        Ok(states) => states,
        Err(response) => return response,
    };
    let channels: Vec<Channel> = match load_catalog(&ctx, token, Resource::Channels).await {
        Ok(channels) => channels,
        Err(response) => return response,
    };

    let columns = board::group_by_state(&listing.items, &states);
    let counters = board::stats(&listing.items, board::local_today());
    let pagination = Pagination::of(filters.page(), &listing);

    Json(json!({
        "view": "tickets",
        "filters": filters,
        "tickets": listing.items,
        "board": columns,
        "stats": counters,
        "pagination": pagination,
        "catalogs": {
            "estados": states,
            "prioridades": priority_catalog(),
            "canales": channels,
        },
        "can_create": policy::can(&state, UiAction::CreateTicket),
        "navigation": policy::navigation(&state),
    }))
    .into_response()
}

/// Table listing used by staff. Filters on search, state and priority only.
pub async fn admin_tickets(
    Extension(ctx): Extension<AppContext>,
    Query(mut filters): Query<TicketFilters>,
) -> Response {
    let state = match guard_signed_in(&ctx).await {
        Ok(state) => state,
        Err(response) => return response,
    };
    filters.canal = None;
    let token = state.access_token();
    let client = ResourceClient::new(ctx.gateway.as_ref(), token);

    let listing = match client.list::<Ticket>(Resource::Tickets, filters.to_params(true)).await {
        Ok(listing) => listing,
        Err(err) => return backend_failure(&ctx, err, "Unable to load tickets").await,
    };
    let states: Vec<TicketState> = match load_catalog(&ctx, token, Resource::States).await {
        Ok(states) => states,
        Err(response) => return response,
    };

    let shortcuts: Vec<String> = if policy::can(&state, UiAction::ManageCatalogs) {
        ["categorias", "estados", "canales"]
            .iter()
            .map(|catalog| format!("/admin/{}", catalog))
            .collect()
    } else {
        Vec::new()
    };

    Json(json!({
        "view": "admin_tickets",
        "filters": filters,
        "tickets": listing.items,
        "pagination": Pagination::of(filters.page(), &listing),
        "actions": policy::ticket_actions(&state),
        "catalog_shortcuts": shortcuts,
        "catalogs": {
            "estados": states,
            "prioridades": priority_catalog(),
        },
        "navigation": policy::navigation(&state),
    }))
    .into_response()
}

async fn form_view(ctx: &AppContext, state: &SessionState, form: TicketForm, ticket_id: Option<i64>) -> Response {
    let token = state.access_token();
    let categories: Vec<Category> = match load_catalog(ctx, token, Resource::Categories).await {
        Ok(categories) => categories,
        Err(response) => return response,
    };
    let channels: Vec<Channel> = match load_catalog(ctx, token, Resource::Channels).await {
        Ok(channels) => channels,
        Err(response) => return response,
    };
    let states: Vec<TicketState> = match load_catalog(ctx, token, Resource::States).await {
        Ok(states) => states,
        Err(response) => return response,
    };

    let view = if ticket_id.is_some() { "ticket_edit" } else { "ticket_new" };
    // state can only be picked when editing
    let can_edit_state = ticket_id.is_some() && policy::can(state, UiAction::EditTicketState);

    Json(json!({
        "view": view,
        "id": ticket_id,
        "form": form,
        "can_edit_state": can_edit_state,
        "catalogs": {
            "categorias": categories,
            "prioridades": priority_catalog(),
            "canales": channels,
            "estados": states,
        },
    }))
    .into_response()
}

pub async fn new_form(Extension(ctx): Extension<AppContext>) -> Response {
    match guard_action(&ctx, UiAction::CreateTicket).await {
        Ok(state) => form_view(&ctx, &state, TicketForm::default(), None).await,
        Err(response) => response,
    }
}

pub async fn create(
    Extension(ctx): Extension<AppContext>,
    extract::Json(form): extract::Json<TicketForm>,
) -> Response {
    let state = match guard_action(&ctx, UiAction::CreateTicket).await {
        Ok(state) => state,
        Err(response) => return response,
    };
    if form.titulo.trim().is_empty() {
        return invalid_form("Title is required");
    }

    let payload = TicketPayload::from_form(form, profile_id(&state), false);
    let client = ResourceClient::new(ctx.gateway.as_ref(), state.access_token());
    match client.create(Resource::Tickets, &payload).await {
        Ok(created) => {
            info!("ticket created: {}", payload.titulo);
            (
                StatusCode::CREATED,
                Json(json!({ "ticket": created, "redirect": TICKETS_ROUTE })),
            )
                .into_response()
        }
        Err(err) => backend_failure(&ctx, err, "Unable to save the ticket").await,
    }
}

pub async fn detail(Extension(ctx): Extension<AppContext>, Path(id): Path<i64>) -> Response {
    let state = match guard_signed_in(&ctx).await {
        Ok(state) => state,
        Err(response) => return response,
    };
    let client = ResourceClient::new(ctx.gateway.as_ref(), state.access_token());

    let ticket = match client.get::<Ticket>(Resource::Tickets, id).await {
        Ok(ticket) => ticket,
        Err(err) => return backend_failure(&ctx, err, "Unable to load the ticket").await,
    };
    let comments = match client
        .list::<Comment>(Resource::Comments, vec![("id_ticket".to_string(), id.to_string())])
        .await
    {
        Ok(listing) => listing.items,
        Err(err) if err.is_unauthorized() => return backend_failure(&ctx, err, "Unable to load comments").await,
        Err(err) => {
            warn!("comments of ticket {} unavailable: {}", id, err);
            Vec::new()
        }
    };

    Json(json!({
        "view": "ticket_detail",
        "ticket": ticket,
        "comments": comments,
        "actions": policy::ticket_actions(&state),
    }))
    .into_response()
}

pub async fn edit_form(Extension(ctx): Extension<AppContext>, Path(id): Path<i64>) -> Response {
    let state = match guard_signed_in(&ctx).await {
        Ok(state) => state,
        Err(response) => return response,
    };
    let client = ResourceClient::new(ctx.gateway.as_ref(), state.access_token());
    match client.get::<Ticket>(Resource::Tickets, id).await {
        Ok(ticket) => form_view(&ctx, &state, TicketForm::from(&ticket), Some(id)).await,
        Err(err) => backend_failure(&ctx, err, "Unable to load the ticket").await,
    }
}

pub async fn update(
    Extension(ctx): Extension<AppContext>,
    Path(id): Path<i64>,
    extract::Json(form): extract::Json<TicketForm>,
) -> Response {
    let state = match guard_signed_in(&ctx).await {
        Ok(state) => state,
        Err(response) => return response,
    };
    if form.titulo.trim().is_empty() {
        return invalid_form("Title is required");
    }

    let may_set_state = policy::can(&state, UiAction::EditTicketState);
    let payload = TicketPayload::from_form(form, profile_id(&state), may_set_state);
    let client = ResourceClient::new(ctx.gateway.as_ref(), state.access_token());
    match client.update(Resource::Tickets, id, &payload).await {
        Ok(updated) => {
            info!("ticket {} updated", id);
            Json(json!({ "ticket": updated, "redirect": TICKETS_ROUTE })).into_response()
        }
        Err(err) => backend_failure(&ctx, err, "Unable to save the ticket").await,
    }
}

pub async fn delete_ticket(Extension(ctx): Extension<AppContext>, Path(id): Path<i64>) -> Response {
    let state = match guard_action(&ctx, UiAction::DeleteTicket).await {
        Ok(state) => state,
        Err(response) => return response,
    };
    let client = ResourceClient::new(ctx.gateway.as_ref(), state.access_token());
    match client.delete(Resource::Tickets, id).await {
        Ok(()) => {
            info!("ticket {} deleted", id);
            Json(json!({ "deleted": id, "redirect": TICKETS_ROUTE })).into_response()
        }
        Err(err) => backend_failure(&ctx, err, "Unable to delete the ticket").await,
    }
}

pub async fn add_comment(
    Extension(ctx): Extension<AppContext>,
    Path(id): Path<i64>,
    extract::Json(body): extract::Json<NewComment>,
) -> Response {
    let state = match guard_action(&ctx, UiAction::Comment).await {
        Ok(state) => state,
        Err(response) => return response,
    };
    if body.contenido.trim().is_empty() {
        return invalid_form("Comment cannot be empty");
    }

    let payload = CommentPayload {
        id_ticket: id,
        id_usuario_autor: profile_id(&state),
        contenido: body.contenido,
        es_interno: false,
    };
    let client = ResourceClient::new(ctx.gateway.as_ref(), state.access_token());
    match client.create(Resource::Comments, &payload).await {
        Ok(created) => {
            log::debug!("comment added to ticket {}", id);
            (StatusCode::CREATED, Json(json!({ "comment": created }))).into_response()
        }
        Err(err) => backend_failure(&ctx, err, "Unable to send the comment").await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::test_support::*;
    use crate::gateway::testing::ScriptedGateway;
    use crate::models::user_model::Role;
    use axum::http::header::LOCATION;
    use reqwest::Method;
    use serde_json::Value;

    fn ticket_json(id: i64, state_id: i64, state_name: &str) -> Value {
        json!({
            "id_ticket": id,
            "titulo": format!("ticket {}", id),
            "descripcion": "",
            "id_estado": {"id_estado": state_id, "nombre_estado": state_name, "es_final": false},
            "id_prioridad": {"id_prioridad": 7, "nombre_prioridad": "Crítica"},
        })
    }

    fn form(state: Option<i64>) -> extract::Json<TicketForm> {
        extract::Json(TicketForm {
            titulo: "Printer down".to_string(),
            descripcion: "Third floor".to_string(),
            id_categoria: Some(1),
            id_prioridad: Some(7),
            id_canal: Some(2),
            id_estado: state,
        })
    }

    fn sent_body(gateway: &ScriptedGateway, method: Method) -> Value {
        gateway
            .requests()
            .into_iter()
            .find(|request| request.method == method)
            .and_then(|request| request.body)
            .unwrap()
    }

    #[tokio::test]
    async fn dashboard_groups_tickets_and_paginates() {
        let gateway = ScriptedGateway::new()
            .ok(
                Method::GET,
                "/api/tickets/",
                json!({
                    "results": [ticket_json(1, 1, "Abierto"), ticket_json(2, 2, "En progreso")],
                    "next": "http://api/tickets/?page=3",
                    "previous": null,
                }),
            )
            .ok(
                Method::GET,
                "/api/estados/",
                json!([
                    {"id_estado": 1, "nombre_estado": "Abierto"},
                    {"id_estado": 2, "nombre_estado": "En progreso"},
                ]),
            );
        let (ctx, gateway) = signed_in(Role::Cliente, gateway);
        let filters = TicketFilters {
            page: Some(2),
            search: Some("  ".to_string()),
            ..Default::default()
        };

        let response = dashboard(Extension(ctx), Query(filters)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;

        assert_eq!(body["board"][0]["tickets"][0]["id_ticket"], 1);
        assert_eq!(body["board"][1]["tickets"][0]["id_ticket"], 2);
        assert_eq!(body["stats"]["open"], 1);
        assert_eq!(body["stats"]["critical"], 2);
        assert_eq!(body["pagination"]["next_page"], 3);
        assert!(body["pagination"]["previous_page"].is_null());
        // channels were not scripted
        assert_eq!(body["catalogs"]["canales"], json!([]));
        assert_eq!(body["catalogs"]["prioridades"].as_array().unwrap().len(), 4);

        let listing = &gateway.requests()[0];
        assert_eq!(listing.query, vec![("page".to_string(), "2".to_string())]);
        assert_eq!(listing.bearer.as_deref(), Some("T1"));
    }

    #[tokio::test]
    async fn expired_token_on_dashboard_signs_out() {
        let gateway = ScriptedGateway::new().fail(
            Method::GET,
            "/api/tickets/",
            401,
            Some(json!({"detail": "Given token not valid for any token type"})),
        );
        let (ctx, _) = signed_in(Role::Agente, gateway);

        let response = dashboard(Extension(ctx.clone()), Query(TicketFilters::default())).await;
        assert_eq!(response.headers()[LOCATION], "/login");
        assert!(!ctx.session_state().await.is_authenticated());
    }

    #[tokio::test]
    async fn dashboard_tolerates_naive_dates() {
        let mut undated = ticket_json(1, 1, "Abierto");
        undated["fecha_creacion"] = json!("2026-10-16T08:30:00");
        let mut dated = ticket_json(2, 1, "Abierto");
        dated["fecha_creacion"] = json!("2026-10-16T08:30:00Z");
        let gateway = ScriptedGateway::new().ok(Method::GET, "/api/tickets/", json!([undated, dated]));
        let (ctx, _) = signed_in(Role::Agente, gateway);

        let response = dashboard(Extension(ctx), Query(TicketFilters::default())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["tickets"].as_array().unwrap().len(), 2);
        assert_eq!(body["stats"]["open"], 2);
    }

    #[tokio::test]
    async fn last_page_number_does_not_overflow() {
        let gateway = ScriptedGateway::new().ok(
            Method::GET,
            "/api/tickets/",
            json!({"results": [], "next": "http://api/tickets/?page=2", "previous": null}),
        );
        let (ctx, _) = signed_in(Role::Cliente, gateway);
        let filters = TicketFilters {
            page: Some(u32::MAX),
            ..Default::default()
        };

        let response = dashboard(Extension(ctx), Query(filters)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["pagination"]["page"], u32::MAX);
        assert!(body["pagination"]["next_page"].is_null());
    }

    #[tokio::test]
    async fn expired_token_on_form_catalogs_signs_out() {
        let gateway = ScriptedGateway::new()
            .fail(Method::GET, "/api/categorias/", 401, None)
            .fail(Method::GET, "/api/canales/", 401, None)
            .fail(Method::GET, "/api/estados/", 401, None);
        let (ctx, _) = signed_in(Role::Cliente, gateway);

        let response = new_form(Extension(ctx.clone())).await;
        assert_eq!(response.headers()[LOCATION], "/login");
        assert!(!ctx.session_state().await.is_authenticated());
    }

    #[tokio::test]
    async fn expired_token_on_comments_signs_out() {
        let gateway = ScriptedGateway::new()
            .ok(Method::GET, "/api/tickets/5/", ticket_json(5, 1, "Abierto"))
            .fail(Method::GET, "/api/comentarios/", 401, None);
        let (ctx, _) = signed_in(Role::Admin, gateway);

        let response = detail(Extension(ctx.clone()), Path(5)).await;
        assert_eq!(response.headers()[LOCATION], "/login");
        assert!(!ctx.session_state().await.is_authenticated());
    }

    #[tokio::test]
    async fn admin_table_ignores_channel_filter() {
        let gateway = ScriptedGateway::new().ok(Method::GET, "/api/tickets/", json!([]));
        let (ctx, gateway) = signed_in(Role::Agente, gateway);
        let filters = TicketFilters {
            canal: Some("2".to_string()),
            prioridad: Some("7".to_string()),
            ..Default::default()
        };

        let body = body_json(admin_tickets(Extension(ctx), Query(filters)).await).await;
        assert_eq!(body["actions"]["edit_state"], true);
        assert_eq!(body["actions"]["delete"], false);
        assert_eq!(body["catalog_shortcuts"], json!([]));
        assert_eq!(
            gateway.requests()[0].query,
            vec![
                ("page".to_string(), "1".to_string()),
                ("prioridad".to_string(), "7".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn create_never_sends_state_and_uses_profile_id() {
        let gateway = ScriptedGateway::new().ok(Method::POST, "/api/tickets/", json!({"id_ticket": 9}));
        let (ctx, gateway) = signed_in(Role::Admin, gateway);

        let response = create(Extension(ctx), form(Some(3))).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let sent = sent_body(&gateway, Method::POST);
        assert!(sent.get("id_estado").is_none());
        assert_eq!(sent["id_cliente"], 7);
        assert_eq!(sent["id_prioridad"], 7);
    }

    #[tokio::test]
    async fn blank_title_is_rejected_locally() {
        let (ctx, gateway) = signed_in(Role::Cliente, ScriptedGateway::new());
        let mut blank = form(None);
        blank.titulo = "   ".to_string();
        let response = create(Extension(ctx), blank).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(gateway.requests().is_empty());
    }

    #[tokio::test]
    async fn update_carries_state_only_for_staff() {
        let gateway = ScriptedGateway::new().ok(Method::PATCH, "/api/tickets/4/", json!({"id_ticket": 4}));
        let (ctx, gateway) = signed_in(Role::Agente, gateway);
        update(Extension(ctx), Path(4), form(Some(3))).await;
        assert_eq!(sent_body(&gateway, Method::PATCH)["id_estado"], 3);

        let gateway = ScriptedGateway::new().ok(Method::PATCH, "/api/tickets/4/", json!({"id_ticket": 4}));
        let (ctx, gateway) = signed_in(Role::Cliente, gateway);
        update(Extension(ctx), Path(4), form(Some(3))).await;
        assert!(sent_body(&gateway, Method::PATCH).get("id_estado").is_none());
    }

    #[tokio::test]
    async fn edit_form_prefills_from_ticket() {
        let gateway = ScriptedGateway::new().ok(Method::GET, "/api/tickets/5/", ticket_json(5, 2, "En progreso"));
        let (ctx, _) = signed_in(Role::Cliente, gateway);

        let body = body_json(edit_form(Extension(ctx), Path(5)).await).await;
        assert_eq!(body["view"], "ticket_edit");
        assert_eq!(body["form"]["id_estado"], 2);
        assert_eq!(body["can_edit_state"], false);
    }

    #[tokio::test]
    async fn detail_survives_missing_comments() {
        let gateway = ScriptedGateway::new()
            .ok(Method::GET, "/api/tickets/5/", ticket_json(5, 1, "Abierto"))
            .fail(Method::GET, "/api/comentarios/", 500, None);
        let (ctx, gateway) = signed_in(Role::Admin, gateway);

        let body = body_json(detail(Extension(ctx), Path(5)).await).await;
        assert_eq!(body["ticket"]["id_ticket"], 5);
        assert_eq!(body["comments"], json!([]));
        assert_eq!(body["actions"]["delete"], true);
        assert_eq!(
            gateway.requests()[1].query,
            vec![("id_ticket".to_string(), "5".to_string())]
        );
    }

    #[tokio::test]
    async fn only_admin_deletes_tickets() {
        let (ctx, gateway) = signed_in(Role::Agente, ScriptedGateway::new());
        let response = delete_ticket(Extension(ctx), Path(4)).await;
        assert_eq!(response.headers()[LOCATION], "/unauthorized");
        assert!(gateway.requests().is_empty());

        let gateway = ScriptedGateway::new().ok(Method::DELETE, "/api/tickets/4/", Value::Null);
        let (ctx, _) = signed_in(Role::Admin, gateway);
        let body = body_json(delete_ticket(Extension(ctx), Path(4)).await).await;
        assert_eq!(body["redirect"], "/tickets");
    }

    #[tokio::test]
    async fn comments_are_public_and_authored_by_profile() {
        let (ctx, gateway) = signed_in(Role::Cliente, ScriptedGateway::new());
        let blank = extract::Json(NewComment {
            contenido: " \n".to_string(),
        });
        let response = add_comment(Extension(ctx), Path(5), blank).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(gateway.requests().is_empty());

        let gateway = ScriptedGateway::new().ok(Method::POST, "/api/comentarios/", json!({"id_comentario": 1}));
        let (ctx, gateway) = signed_in(Role::Cliente, gateway);
        let comment = extract::Json(NewComment {
            contenido: "Any news?".to_string(),
        });
        let response = add_comment(Extension(ctx), Path(5), comment).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let sent = sent_body(&gateway, Method::POST);
        assert_eq!(
            sent,
            json!({"id_ticket": 5, "id_usuario_autor": 7, "contenido": "Any news?", "es_interno": false})
        );
    }

    #[tokio::test]
    async fn anonymous_comment_goes_to_login() {
        let (ctx, _) = anonymous(ScriptedGateway::new());
        let comment = extract::Json(NewComment {
            contenido: "hi".to_string(),
        });
        let response = add_comment(Extension(ctx), Path(5), comment).await;
        assert_eq!(response.headers()[LOCATION], "/login");
    }
}
