pub mod api_client;
pub mod auth;
pub mod credentials;
pub mod crypto;
pub mod documents;
pub mod organizations;
pub mod products;
pub mod session;
pub mod warehouses;
pub mod workspace;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::models::{
    AuthResponse, Document, DocumentCreateRequest, DocumentItem, DocumentItemUpdate, DocumentStatus, LoginRequest, NewDocumentItem,
    Patch, Product, Record, RegisterRequest,
};

/// CRUD surface shared by every REST resource.
///
/// Implementations wrap exactly one HTTP call per method and hand errors back untouched.
#[async_trait]
pub trait ResourceService: Send + Sync + 'static {
    type Record: Record;
    type Filter: Send + Sync;
    type Create: Send + Sync;
    type Update: Patch<Self::Record> + Send + Sync;

    async fn list(&self, filter: &Self::Filter) -> Result<Vec<Self::Record>, ApiError>;
    async fn get(&self, id: i64) -> Result<Self::Record, ApiError>;
    async fn create(&self, payload: &Self::Create) -> Result<Self::Record, ApiError>;
    async fn update(&self, id: i64, patch: &Self::Update) -> Result<(), ApiError>;
    async fn delete(&self, id: i64) -> Result<(), ApiError>;
}

#[async_trait]
pub trait ProductApi: ResourceService<Record = Product> {
    /// `Ok(None)` when the server answers 404.
    async fn find_by_barcode(&self, barcode: &str, organization_id: i64) -> Result<Option<Product>, ApiError>;
}

#[async_trait]
pub trait DocumentApi: ResourceService<Record = Document, Create = DocumentCreateRequest> {
    async fn set_status(&self, id: i64, status: &DocumentStatus) -> Result<(), ApiError>;
    async fn items(&self, document_id: i64) -> Result<Vec<DocumentItem>, ApiError>;
    async fn add_item(&self, document_id: i64, item: &NewDocumentItem) -> Result<(), ApiError>;
    async fn update_item(&self, document_id: i64, item_id: i64, update: &DocumentItemUpdate) -> Result<(), ApiError>;
    async fn delete_item(&self, document_id: i64, item_id: i64) -> Result<(), ApiError>;
}

#[async_trait]
pub trait AuthApi: Send + Sync + 'static {
    async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, ApiError>;
    async fn register(&self, form: &RegisterRequest) -> Result<AuthResponse, ApiError>;
}

pub(crate) fn with_id<P: Serialize>(id: i64, patch: &P) -> Result<Value, ApiError> {
    let mut value = serde_json::to_value(patch)?;
    if let Value::Object(map) = &mut value {
        map.insert("id".to_string(), Value::from(id));
    }
    Ok(value)
}
