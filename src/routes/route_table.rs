use serde::Serialize;

use crate::models::user_model::Role;
use crate::models::user_session_model::SessionState;
use crate::policy::{self, Decision, RouteAccess, HOME_ROUTE};

/// A navigable view and who may reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewRoute {
    pub pattern: &'static str,
    pub view: &'static str,
    pub access: RouteAccess,
}

const fn public(pattern: &'static str, view: &'static str) -> ViewRoute {
    ViewRoute {
        pattern,
        view,
        access: RouteAccess::Public,
    }
}

const fn signed_in(pattern: &'static str, view: &'static str) -> ViewRoute {
    ViewRoute {
        pattern,
        view,
        access: RouteAccess::Authenticated,
    }
}

const fn admin(pattern: &'static str, view: &'static str) -> ViewRoute {
    ViewRoute {
        pattern,
        view,
        access: RouteAccess::Role(Role::Admin),
    }
}

/// Literal paths are listed before parameterised siblings; the first match
/// wins.
pub const ROUTES: &[ViewRoute] = &[
    public("/", "home"),
    public("/about", "about"),
    public("/login", "login"),
    public("/unauthorized", "unauthorized"),
    signed_in("/tickets", "tickets"),
    signed_in("/tickets/nuevo", "ticket_new"),
    signed_in("/tickets/{id}", "ticket_detail"),
    signed_in("/tickets/{id}/editar", "ticket_edit"),
    // Any signed-in user; only the navigation link is limited to staff.
    signed_in("/admin/tickets", "admin_tickets"),
    admin("/admin/usuarios", "users"),
    admin("/admin/usuarios/nuevo", "user_new"),
    admin("/admin/usuarios/{id}/editar", "user_edit"),
    admin("/admin/categorias", "categorias"),
    admin("/admin/categorias/nuevo", "categorias_new"),
    admin("/admin/categorias/{id}/editar", "categorias_edit"),
    admin("/admin/estados", "estados"),
    admin("/admin/estados/nuevo", "estados_new"),
    admin("/admin/estados/{id}/editar", "estados_edit"),
    admin("/admin/canales", "canales"),
    admin("/admin/canales/nuevo", "canales_new"),
    admin("/admin/canales/{id}/editar", "canales_edit"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub route: &'static ViewRoute,
    pub params: Vec<(&'static str, String)>,
}

pub fn match_path(path: &str) -> Option<RouteMatch> {
    let path = normalize(path);
    ROUTES.iter().find_map(|route| {
        match_pattern(route.pattern, path).map(|params| RouteMatch { route, params })
    })
}

fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

fn match_pattern(pattern: &'static str, path: &str) -> Option<Vec<(&'static str, String)>> {
    let mut wanted = pattern.split('/');
    let mut given = path.split('/');
    let mut params = Vec::new();
    loop {
        match (wanted.next(), given.next()) {
            (None, None) => return Some(params),
            (Some(expected), Some(actual)) => {
                if let Some(name) = expected.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    if actual.is_empty() {
                        return None;
                    }
                    params.push((name, actual.to_string()));
                } else if expected != actual {
                    return None;
                }
            }
            _ => return None,
        }
    }
}

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Navigation {
    Render {
        view: &'static str,
        params: Vec<(&'static str, String)>,
    },
    Loading,
    Redirect { to: &'static str },
}

/// Resolves `path` against the table and the session. Unknown paths go home.
pub fn navigate(path: &str, state: &SessionState) -> Navigation {
    let Some(found) = match_path(path) else {
        return Navigation::Redirect { to: HOME_ROUTE };
    };
    match policy::decide(found.route.access, state) {
        Decision::Allow => Navigation::Render {
            view: found.route.view,
            params: found.params,
        },
        Decision::Loading => Navigation::Loading,
        denied => Navigation::Redirect {
            to: denied.redirect_target().unwrap_or(HOME_ROUTE),
        },
    }
}
