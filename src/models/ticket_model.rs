use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::catalog_model::{Category, Channel, Priority, TicketState};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserSummary {
    #[serde(default)]
    pub id_usuario: Option<i64>,
    #[serde(default)]
    pub nombre_completo: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// RFC 3339, or a timestamp without offset read as local time.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(stamped) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamped.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|local| local.with_timezone(&Utc))
}

/// Unreadable dates become `None` instead of failing the whole record.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(Value::as_str).and_then(parse_timestamp))
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Ticket {
    pub id_ticket: i64,
    #[serde(default)]
    pub codigo_ticket: Option<String>,
    pub titulo: String,
    #[serde(default)]
    pub descripcion: String,
    #[serde(default)]
    pub id_estado: Option<TicketState>,
    #[serde(default)]
    pub id_prioridad: Option<Priority>,
    #[serde(default)]
    pub id_categoria: Option<Category>,
    #[serde(default)]
    pub id_canal: Option<Channel>,
    #[serde(default)]
    pub id_cliente: Option<UserSummary>,
    #[serde(default)]
    pub id_agente_asignado: Option<UserSummary>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub fecha_creacion: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub fecha_actualizacion: Option<DateTime<Utc>>,
}

impl Ticket {
    pub fn state_name(&self) -> &str {
        self.id_estado
            .as_ref()
            .map(|state| state.nombre_estado.as_str())
            .unwrap_or_default()
    }

    pub fn priority_name(&self) -> &str {
        self.id_prioridad
            .as_ref()
            .map(|priority| priority.nombre_prioridad.as_str())
            .unwrap_or_default()
    }
}

/// Ticket form as submitted to the portal. Catalog references are ids.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct TicketForm {
    #[serde(default)]
    pub titulo: String,
    #[serde(default)]
    pub descripcion: String,
    #[serde(default)]
    pub id_categoria: Option<i64>,
    #[serde(default)]
    pub id_prioridad: Option<i64>,
    #[serde(default)]
    pub id_canal: Option<i64>,
    #[serde(default)]
    pub id_estado: Option<i64>,
}

impl From<&Ticket> for TicketForm {
    fn from(ticket: &Ticket) -> Self {
        Self {
            titulo: ticket.titulo.clone(),
            descripcion: ticket.descripcion.clone(),
            id_categoria: ticket.id_categoria.as_ref().map(|c| c.id_categoria),
            id_prioridad: ticket.id_prioridad.as_ref().map(|p| p.id_prioridad),
            id_canal: ticket.id_canal.as_ref().map(|c| c.id_canal),
            id_estado: ticket.id_estado.as_ref().map(|s| s.id_estado),
        }
    }
}

/// Body sent to the backend on ticket create and update.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TicketPayload {
    pub titulo: String,
    pub descripcion: String,
    pub id_categoria: Option<i64>,
    pub id_prioridad: Option<i64>,
    pub id_canal: Option<i64>,
    pub id_cliente: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_estado: Option<i64>,
}

impl TicketPayload {
    /// `id_estado` is only carried when the caller may change the state; a
    /// state chosen by anyone else is silently dropped.
    pub fn from_form(form: TicketForm, client_id: Option<i64>, may_set_state: bool) -> Self {
        Self {
            titulo: form.titulo,
            descripcion: form.descripcion,
            id_categoria: form.id_categoria,
            id_prioridad: form.id_prioridad,
            id_canal: form.id_canal,
            id_cliente: client_id,
            id_estado: if may_set_state { form.id_estado } else { None },
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Comment {
    #[serde(default)]
    pub id_comentario: Option<i64>,
    #[serde(default)]
    pub id_ticket: Option<i64>,
    #[serde(default)]
    pub id_usuario_autor: Option<serde_json::Value>,
    pub contenido: String,
    #[serde(default)]
    pub es_interno: bool,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub fecha_creacion: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NewComment {
    #[serde(default)]
    pub contenido: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CommentPayload {
    pub id_ticket: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_usuario_autor: Option<i64>,
    pub contenido: String,
    pub es_interno: bool,
}

/// Query string of the ticket screens.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TicketFilters {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub estado: Option<String>,
    #[serde(default)]
    pub prioridad: Option<String>,
    #[serde(default)]
    pub canal: Option<String>,
}

impl TicketFilters {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Query parameters for the backend, empty filters left out.
    pub fn to_params(&self, paginated: bool) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if paginated {
            params.push(("page".to_string(), self.page().to_string()));
        }
        let filters = [
            ("search", &self.search),
            ("estado", &self.estado),
            ("prioridad", &self.prioridad),
            ("canal", &self.canal),
        ];
        for (key, value) in filters {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                params.push((key.to_string(), value.to_string()));
            }
        }
        params
    }
}
