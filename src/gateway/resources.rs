use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::errors::GatewayError;
use crate::gateway::{ApiRequest, BackendGateway};
use crate::models::page_model::Page;

/// Backend collections the screens work with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Tickets,
    Users,
    Categories,
    States,
    Channels,
    Comments,
}

impl Resource {
    pub fn collection_path(&self) -> &'static str {
        match self {
            Resource::Tickets => "/api/tickets/",
            Resource::Users => "/api/usuarios/",
            Resource::Categories => "/api/categorias/",
            Resource::States => "/api/estados/",
            Resource::Channels => "/api/canales/",
            Resource::Comments => "/api/comentarios/",
        }
    }

    pub fn item_path(&self, id: i64) -> String {
        format!("{}{}/", self.collection_path(), id)
    }
}

/// Typed CRUD calls on top of a gateway, carrying the caller's access token.
pub struct ResourceClient<'a> {
    gateway: &'a dyn BackendGateway,
    token: Option<&'a str>,
}

impl<'a> ResourceClient<'a> {
    pub fn new(gateway: &'a dyn BackendGateway, token: Option<&'a str>) -> Self {
        Self { gateway, token }
    }

    pub async fn list<T: DeserializeOwned>(
        &self,
        resource: Resource,
        params: Vec<(String, String)>,
    ) -> Result<Page<T>, GatewayError> {
        let request = ApiRequest::get(resource.collection_path())
            .query(params)
            .bearer(self.token);
        let body = self.gateway.send(request).await?;
        Page::from_value(body).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    pub async fn get<T: DeserializeOwned>(&self, resource: Resource, id: i64) -> Result<T, GatewayError> {
        let request = ApiRequest::get(resource.item_path(id)).bearer(self.token);
        decode(self.gateway.send(request).await?)
    }

    pub async fn create<B: Serialize + Sync>(&self, resource: Resource, body: &B) -> Result<Value, GatewayError> {
        let request = ApiRequest::post(resource.collection_path())
            .json(body)?
            .bearer(self.token);
        self.gateway.send(request).await
    }

    pub async fn update<B: Serialize + Sync>(
        &self,
        resource: Resource,
        id: i64,
        body: &B,
    ) -> Result<Value, GatewayError> {
        let request = ApiRequest::patch(resource.item_path(id))
            .json(body)?
            .bearer(self.token);
        self.gateway.send(request).await
    }

    pub async fn delete(&self, resource: Resource, id: i64) -> Result<(), GatewayError> {
        let request = ApiRequest::delete(resource.item_path(id)).bearer(self.token);
        self.gateway.send(request).await.map(|_| ())
    }
}

fn decode<T: DeserializeOwned>(body: Value) -> Result<T, GatewayError> {
    serde_json::from_value(body).map_err(|e| GatewayError::Decode(e.to_string()))
}
