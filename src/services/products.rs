use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{Product, ProductCreateRequest, ProductFilter, ProductPatch};
use crate::services::api_client::ApiClient;
use crate::services::{with_id, ProductApi, ResourceService};

pub struct HttpProducts {
    client: Arc<ApiClient>,
}

impl HttpProducts {
    pub fn new(client: Arc<ApiClient>) -> Self {
        HttpProducts { client }
    }
}

#[async_trait]
impl ResourceService for HttpProducts {
    type Record = Product;
    type Filter = ProductFilter;
    type Create = ProductCreateRequest;
    type Update = ProductPatch;

    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, ApiError> {
        self.client.get_with("/api/products", filter).await
    }

    async fn get(&self, id: i64) -> Result<Product, ApiError> {
        self.client.get(&format!("/api/products/{}", id)).await
    }

    async fn create(&self, payload: &ProductCreateRequest) -> Result<Product, ApiError> {
        self.client.post("/api/products", payload).await
    }

    async fn update(&self, id: i64, patch: &ProductPatch) -> Result<(), ApiError> {
        let body = with_id(id, patch)?;
        self.client.put(&format!("/api/products/{}", id), &body).await
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("/api/products/{}", id)).await
    }
}

#[async_trait]
impl ProductApi for HttpProducts {
    async fn find_by_barcode(&self, barcode: &str, organization_id: i64) -> Result<Option<Product>, ApiError> {
        let segments = ["api", "products", "by-barcode", barcode];
        let query = [("organizationId", organization_id)];
        match self.client.get_segments_with::<_, Product>(&segments, &query).await {
            Ok(product) => Ok(Some(product)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }
}
