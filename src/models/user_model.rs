use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    Cliente,
    Agente,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Cliente, Role::Agente, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Cliente => "CLIENTE",
            Role::Agente => "AGENTE",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile of the signed-in user as returned by `/api/usuarios/me/`.
///
/// The role is taken as-is from the backend (or from the persisted copy) and is
/// never re-derived locally.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserProfile {
    #[serde(rename = "id_usuario", alias = "id", default)]
    pub id: Option<i64>,
    pub email: String,
    #[serde(rename = "nombre_completo", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "rol_usuario", alias = "role")]
    pub role: Role,
}

impl UserProfile {
    /// Lowest-privilege profile used when the backend accepted the credentials
    /// but the profile lookup failed.
    pub fn degraded(email: &str) -> Self {
        Self {
            id: None,
            email: email.to_string(),
            display_name: None,
            role: Role::Cliente,
        }
    }
}

/// Body posted to the portal's `/login`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginUser {
    pub email: String,
    pub password: String,
}

/// Body sent to the backend token endpoint, which expects `username`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// A user as listed by the administration screens.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id_usuario: i64,
    #[serde(default)]
    pub nombre_completo: Option<String>,
    pub email: String,
    #[serde(default)]
    pub telefono: Option<String>,
    pub rol_usuario: Role,
    #[serde(default = "default_active")]
    pub activo: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserForm {
    #[serde(default)]
    pub nombre_completo: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telefono: String,
    #[serde(default)]
    pub rol_usuario: Role,
    #[serde(default = "default_active")]
    pub activo: bool,
}

impl Default for UserForm {
    fn default() -> Self {
        Self {
            nombre_completo: String::new(),
            email: String::new(),
            telefono: String::new(),
            rol_usuario: Role::Cliente,
            activo: true,
        }
    }
}

impl From<UserRecord> for UserForm {
    fn from(user: UserRecord) -> Self {
        Self {
            nombre_completo: user.nombre_completo.unwrap_or_default(),
            email: user.email,
            telefono: user.telefono.unwrap_or_default(),
            rol_usuario: user.rol_usuario,
            activo: user.activo,
        }
    }
}

fn default_active() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_uses_backend_spelling() {
        assert_eq!(serde_json::to_value(Role::Agente).unwrap(), json!("AGENTE"));
        let role: Role = serde_json::from_value(json!("ADMIN")).unwrap();
        assert_eq!(role, Role::Admin);
        assert!(serde_json::from_value::<Role>(json!("SUPERUSER")).is_err());
    }

    #[test]
    fn profile_accepts_short_field_names() {
        let profile: UserProfile =
            serde_json::from_value(json!({"id": 9, "email": "a@x.com", "role": "AGENTE"}))
                .unwrap();
        assert_eq!(profile.id, Some(9));
        assert_eq!(profile.role, Role::Agente);
        assert_eq!(profile.display_name, None);
    }

    #[test]
    fn profile_without_role_is_rejected() {
        let parsed = serde_json::from_value::<UserProfile>(json!({"email": "a@x.com"}));
        assert!(parsed.is_err());
    }

    #[test]
    fn new_user_form_defaults_to_active_client() {
        let form = UserForm::default();
        assert_eq!(form.rol_usuario, Role::Cliente);
        assert!(form.activo);
    }
}
