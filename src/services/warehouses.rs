use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{Warehouse, WarehouseCreateRequest, WarehouseFilter, WarehousePatch};
use crate::services::api_client::ApiClient;
use crate::services::{with_id, ResourceService};

pub struct HttpWarehouses {
    client: Arc<ApiClient>,
}

impl HttpWarehouses {
    pub fn new(client: Arc<ApiClient>) -> Self {
        HttpWarehouses { client }
    }
}

#[async_trait]
impl ResourceService for HttpWarehouses {
    type Record = Warehouse;
    type Filter = WarehouseFilter;
    type Create = WarehouseCreateRequest;
    type Update = WarehousePatch;

    async fn list(&self, filter: &WarehouseFilter) -> Result<Vec<Warehouse>, ApiError> {
        self.client.get_with("/api/warehouses", filter).await
    }

    async fn get(&self, id: i64) -> Result<Warehouse, ApiError> {
        self.client.get(&format!("/api/warehouses/{}", id)).await
    }

    async fn create(&self, payload: &WarehouseCreateRequest) -> Result<Warehouse, ApiError> {
        self.client.post("/api/warehouses", payload).await
    }

    async fn update(&self, id: i64, patch: &WarehousePatch) -> Result<(), ApiError> {
        let body = with_id(id, patch)?;
        self.client.put(&format!("/api/warehouses/{}", id), &body).await
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("/api/warehouses/{}", id)).await
    }
}
