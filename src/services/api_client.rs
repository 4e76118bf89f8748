use reqwest::{IntoUrl, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::normalize_base_url;
use crate::error::ApiError;
use crate::services::credentials::CredentialStore;
use crate::services::session::{SessionBus, SessionEvent};

/// A 401 response clears the persisted credentials and ends the session on the bus.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: RwLock<String>,
    credentials: Arc<CredentialStore>,
    bus: Arc<SessionBus>,
}

impl ApiClient {
    pub fn new(base_url: &str, credentials: Arc<CredentialStore>, bus: Arc<SessionBus>) -> Self {
        ApiClient {
            http: reqwest::Client::new(),
            base_url: RwLock::new(normalize_base_url(base_url)),
            credentials,
            bus,
        }
    }

    pub fn base_url(&self) -> String {
        self.base_url
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_base_url(&self, base_url: &str) {
        let mut guard = self.base_url.write().unwrap_or_else(PoisonError::into_inner);
        *guard = normalize_base_url(base_url);
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.execute(self.request(Method::GET, self.url(path))).await?;
        decode(&body)
    }

    pub async fn get_with<Q, T>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self
            .execute(self.request(Method::GET, self.url(path)).query(query))
            .await?;
        decode(&body)
    }

    pub async fn get_segments_with<Q, T>(&self, segments: &[&str], query: &Q) -> Result<T, ApiError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        let body = self
            .execute(self.request(Method::GET, url).query(query))
            .await?;
        decode(&body)
    }

    pub async fn post<B, T>(&self, path: &str, payload: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self
            .execute(self.request(Method::POST, self.url(path)).json(payload))
            .await?;
        decode(&body)
    }

    pub async fn post_discard<B: Serialize + ?Sized>(&self, path: &str, payload: &B) -> Result<(), ApiError> {
        self.execute(self.request(Method::POST, self.url(path)).json(payload))
            .await
            .map(|_| ())
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, payload: &B) -> Result<(), ApiError> {
        self.execute(self.request(Method::PUT, self.url(path)).json(payload))
            .await
            .map(|_| ())
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(self.request(Method::DELETE, self.url(path)))
            .await
            .map(|_| ())
    }

    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let base = self.base_url();
        let mut url = Url::parse(&base).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base, e)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(base.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request<U: IntoUrl>(&self, method: Method, url: U) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match self.credentials.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.expire_session();
            return Err(ApiError::Unauthorized);
        }

        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_response(status.as_u16(), &body));
        }
        Ok(body)
    }

    fn expire_session(&self) {
        tracing::warn!("API rejected the session token, signing out");
        if let Err(err) = self.credentials.clear() {
            tracing::warn!("failed to clear persisted credentials: {}", err);
        }
        self.bus.end_session(SessionEvent::Expired);
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    // Some endpoints answer 204; treat an empty body as JSON null.
    let body = if body.trim().is_empty() { "null" } else { body };
    Ok(serde_json::from_str(body)?)
}
