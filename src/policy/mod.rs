//! Role-based access decisions for views and UI actions.
//!
//! These checks decide what the portal shows and where it navigates. They are
//! NOT a security boundary: the role comes from the client-held profile, and
//! the backend remains the only place where authorization is enforced. A
//! tampered local profile changes what this module allows, never what the
//! backend accepts.

use serde::Serialize;

use crate::models::user_model::Role;
use crate::models::user_session_model::SessionState;

pub const HOME_ROUTE: &str = "/";
pub const LOGIN_ROUTE: &str = "/login";
pub const UNAUTHORIZED_ROUTE: &str = "/unauthorized";

/// Who may reach a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// No check at all.
    Public,
    /// Any signed-in user, whatever the role.
    Authenticated,
    Role(Role),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allow,
    /// The session is still resolving; show a neutral loading view.
    Loading,
    RedirectToLogin,
    RedirectToUnauthorized,
}

impl Decision {
    pub fn redirect_target(&self) -> Option<&'static str> {
        match self {
            Decision::RedirectToLogin => Some(LOGIN_ROUTE),
            Decision::RedirectToUnauthorized => Some(UNAUTHORIZED_ROUTE),
            _ => None,
        }
    }
}

/// Decision for navigating to a view with the given access rule.
pub fn decide(access: RouteAccess, state: &SessionState) -> Decision {
    if access == RouteAccess::Public {
        return Decision::Allow;
    }
    match state {
        SessionState::Resolving(_) => Decision::Loading,
        SessionState::Anonymous => Decision::RedirectToLogin,
        SessionState::Authenticated(_, profile) => match access {
            RouteAccess::Role(required) if required != profile.role => {
                Decision::RedirectToUnauthorized
            }
            _ => Decision::Allow,
        },
    }
}

/// Role-sensitive actions inside views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    CreateTicket,
    Comment,
    EditTicket,
    EditTicketState,
    DeleteTicket,
    ViewAdminTickets,
    ManageUsers,
    DeleteUser,
    ManageCatalogs,
}

impl UiAction {
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            UiAction::CreateTicket | UiAction::Comment => &Role::ALL,
            UiAction::EditTicket | UiAction::EditTicketState | UiAction::ViewAdminTickets => {
                &[Role::Admin, Role::Agente]
            }
            UiAction::DeleteTicket
            | UiAction::ManageUsers
            | UiAction::DeleteUser
            | UiAction::ManageCatalogs => &[Role::Admin],
        }
    }
}

pub fn permits(role: Role, action: UiAction) -> bool {
    action.allowed_roles().contains(&role)
}

/// Same outcome space as [`decide`], for actions that are not views.
pub fn decide_action(action: UiAction, state: &SessionState) -> Decision {
    match state {
        SessionState::Resolving(_) => Decision::Loading,
        SessionState::Anonymous => Decision::RedirectToLogin,
        SessionState::Authenticated(_, profile) if permits(profile.role, action) => Decision::Allow,
        SessionState::Authenticated(..) => Decision::RedirectToUnauthorized,
    }
}

fn allowed(state: &SessionState, action: UiAction) -> bool {
    state.role().is_some_and(|role| permits(role, action))
}

/// Controls offered on a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TicketActions {
    pub edit: bool,
    pub edit_state: bool,
    pub delete: bool,
    pub comment: bool,
}

pub fn ticket_actions(state: &SessionState) -> TicketActions {
    TicketActions {
        edit: allowed(state, UiAction::EditTicket),
        edit_state: allowed(state, UiAction::EditTicketState),
        delete: allowed(state, UiAction::DeleteTicket),
        comment: allowed(state, UiAction::Comment),
    }
}

pub fn can(state: &SessionState, action: UiAction) -> bool {
    allowed(state, action)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub label: &'static str,
    pub path: &'static str,
}

const fn link(label: &'static str, path: &'static str) -> NavLink {
    NavLink { label, path }
}

/// Navigation bar entries for the current session.
pub fn navigation(state: &SessionState) -> Vec<NavLink> {
    let mut links = vec![link("Inicio", HOME_ROUTE), link("Acerca de", "/about")];
    if !state.is_authenticated() {
        links.push(link("Iniciar Sesión", LOGIN_ROUTE));
        return links;
    }
    links.push(link("Mis Tickets", "/tickets"));
    if allowed(state, UiAction::ManageUsers) {
        links.push(link("Usuarios", "/admin/usuarios"));
    }
    if allowed(state, UiAction::ViewAdminTickets) {
        links.push(link("Administración", "/admin/tickets"));
    }
    links.push(link("Cerrar Sesión", "/logout"));
    links
}
