use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{Organization, OrganizationOption, OrganizationPatch, OrganizationPayload};
use crate::services::api_client::ApiClient;
use crate::services::ResourceService;

pub struct HttpOrganizations {
    client: Arc<ApiClient>,
}

impl HttpOrganizations {
    pub fn new(client: Arc<ApiClient>) -> Self {
        HttpOrganizations { client }
    }
}

#[async_trait]
impl ResourceService for HttpOrganizations {
    type Record = Organization;
    type Filter = ();
    type Create = OrganizationPayload;
    type Update = OrganizationPatch;

    async fn list(&self, _filter: &()) -> Result<Vec<Organization>, ApiError> {
        self.client.get("/api/Organizations/my").await
    }

    async fn get(&self, id: i64) -> Result<Organization, ApiError> {
        self.client.get(&format!("/api/Organizations/{}", id)).await
    }

    async fn create(&self, payload: &OrganizationPayload) -> Result<Organization, ApiError> {
        self.client.post("/api/Organizations", payload).await
    }

    async fn update(&self, id: i64, patch: &OrganizationPatch) -> Result<(), ApiError> {
        self.client.put(&format!("/api/Organizations/{}", id), patch).await
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("/api/Organizations/{}", id)).await
    }
}

pub fn organization_options(organizations: &[Organization]) -> Vec<OrganizationOption> {
    organizations
        .iter()
        .map(|org| OrganizationOption {
            value: org.id,
            label: org.name.clone(),
        })
        .collect()
}
