use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{
    Document, DocumentCreateRequest, DocumentFilter, DocumentItem, DocumentItemUpdate, DocumentPatch,
    DocumentStatus, NewDocumentItem,
};
use crate::services::api_client::ApiClient;
use crate::services::{with_id, DocumentApi, ResourceService};

pub struct HttpDocuments {
    client: Arc<ApiClient>,
}

impl HttpDocuments {
    pub fn new(client: Arc<ApiClient>) -> Self {
        HttpDocuments { client }
    }
}

#[async_trait]
impl ResourceService for HttpDocuments {
    type Record = Document;
    type Filter = DocumentFilter;
    type Create = DocumentCreateRequest;
    type Update = DocumentPatch;

    async fn list(&self, filter: &DocumentFilter) -> Result<Vec<Document>, ApiError> {
        self.client.get_with("/api/documents", filter).await
    }

    async fn get(&self, id: i64) -> Result<Document, ApiError> {
        self.client.get(&format!("/api/documents/{}", id)).await
    }

    async fn create(&self, payload: &DocumentCreateRequest) -> Result<Document, ApiError> {
        self.client.post("/api/documents", payload).await
    }

    async fn update(&self, id: i64, patch: &DocumentPatch) -> Result<(), ApiError> {
        let body = with_id(id, patch)?;
        self.client.put(&format!("/api/documents/{}", id), &body).await
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("/api/documents/{}", id)).await
    }
}

#[async_trait]
impl DocumentApi for HttpDocuments {
    /// The body is the bare JSON string, e.g. `"in_progress"`.
    async fn set_status(&self, id: i64, status: &DocumentStatus) -> Result<(), ApiError> {
        self.client
            .put(&format!("/api/documents/{}/status", id), status.as_str())
            .await
    }

    async fn items(&self, document_id: i64) -> Result<Vec<DocumentItem>, ApiError> {
        self.client
            .get(&format!("/api/documents/{}/items", document_id))
            .await
    }

    async fn add_item(&self, document_id: i64, item: &NewDocumentItem) -> Result<(), ApiError> {
        self.client
            .post_discard(&format!("/api/documents/{}/items", document_id), item)
            .await
    }

    async fn update_item(&self, document_id: i64, item_id: i64, update: &DocumentItemUpdate) -> Result<(), ApiError> {
        self.client
            .put(&format!("/api/documents/{}/items/{}", document_id, item_id), update)
            .await
    }

    async fn delete_item(&self, document_id: i64, item_id: i64) -> Result<(), ApiError> {
        self.client
            .delete(&format!("/api/documents/{}/items/{}", document_id, item_id))
            .await
    }
}
