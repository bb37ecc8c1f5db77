use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::gateway::resources::Resource;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Category {
    pub id_categoria: i64,
    pub nombre_categoria: String,
    #[serde(default)]
    pub descripcion: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TicketState {
    pub id_estado: i64,
    pub nombre_estado: String,
    #[serde(default)]
    pub es_final: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Channel {
    pub id_canal: i64,
    pub nombre_canal: String,
    #[serde(default)]
    pub descripcion: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Priority {
    pub id_prioridad: i64,
    pub nombre_prioridad: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiempo_respuesta_hrs: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiempo_resolucion_hrs: Option<i64>,
}

/// Priorities offered on the ticket form.
///
/// Deliberately not read from `/api/prioridades/`: the ids mirror the backend
/// database rows and the form only ever offers these four.
pub const PRIORITY_CATALOG: [(i64, &str); 4] =
    [(1, "Baja"), (2, "Media"), (3, "Alta"), (7, "Crítica")];

pub fn priority_catalog() -> Vec<Priority> {
    PRIORITY_CATALOG
        .iter()
        .map(|(id, name)| Priority {
            id_prioridad: *id,
            nombre_prioridad: name.to_string(),
            tiempo_respuesta_hrs: None,
            tiempo_resolucion_hrs: None,
        })
        .collect()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct CategoryForm {
    #[serde(default)]
    pub nombre_categoria: String,
    #[serde(default)]
    pub descripcion: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct StateForm {
    #[serde(default)]
    pub nombre_estado: String,
    #[serde(default)]
    pub es_final: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ChannelForm {
    #[serde(default)]
    pub nombre_canal: String,
    #[serde(default)]
    pub descripcion: String,
}

/// A catalog administered from the `/admin/...` screens.
pub trait CatalogEntry: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    type Form: Serialize + DeserializeOwned + Default + Send + Sync + 'static;

    const RESOURCE: Resource;
    /// View name, also the path segment under `/admin/`.
    const VIEW: &'static str;
    const LOAD_ERROR: &'static str;
    const SAVE_ERROR: &'static str;
    const DELETE_ERROR: &'static str;

    fn id(&self) -> i64;
    fn to_form(&self) -> Self::Form;
}

impl CatalogEntry for Category {
    type Form = CategoryForm;

    const RESOURCE: Resource = Resource::Categories;
    const VIEW: &'static str = "categorias";
    const LOAD_ERROR: &'static str = "Unable to load categories";
    const SAVE_ERROR: &'static str = "Unable to save the category";
    const DELETE_ERROR: &'static str = "Unable to delete the category";

    fn id(&self) -> i64 {
        self.id_categoria
    }

    fn to_form(&self) -> CategoryForm {
        CategoryForm {
            nombre_categoria: self.nombre_categoria.clone(),
            descripcion: self.descripcion.clone().unwrap_or_default(),
        }
    }
}

impl CatalogEntry for TicketState {
    type Form = StateForm;

    const RESOURCE: Resource = Resource::States;
    const VIEW: &'static str = "estados";
    const LOAD_ERROR: &'static str = "Unable to load states";
    const SAVE_ERROR: &'static str = "Unable to save the state";
    const DELETE_ERROR: &'static str = "Unable to delete the state";

    fn id(&self) -> i64 {
        self.id_estado
    }

    fn to_form(&self) -> StateForm {
        StateForm {
            nombre_estado: self.nombre_estado.clone(),
            es_final: self.es_final,
        }
    }
}

impl CatalogEntry for Channel {
    type Form = ChannelForm;

    const RESOURCE: Resource = Resource::Channels;
    const VIEW: &'static str = "canales";
    const LOAD_ERROR: &'static str = "Unable to load channels";
    const SAVE_ERROR: &'static str = "Unable to save the channel";
    const DELETE_ERROR: &'static str = "Unable to delete the channel";

    fn id(&self) -> i64 {
        self.id_canal
    }

    fn to_form(&self) -> ChannelForm {
        ChannelForm {
            nombre_canal: self.nombre_canal.clone(),
            descripcion: self.descripcion.clone().unwrap_or_default(),
        }
    }
}
