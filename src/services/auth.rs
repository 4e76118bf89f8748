use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest};
use crate::services::api_client::ApiClient;
use crate::services::AuthApi;

pub struct HttpAuth {
    client: Arc<ApiClient>,
}

impl HttpAuth {
    pub fn new(client: Arc<ApiClient>) -> Self {
        HttpAuth { client }
    }
}

#[async_trait]
impl AuthApi for HttpAuth {
    async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.client.post("/api/Auth/login", credentials).await
    }

    async fn register(&self, form: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.client.post("/api/Auth/register", form).await
    }
}
