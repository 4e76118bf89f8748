use anyhow::Result;
use std::sync::{Arc, Mutex, PoisonError};

use crate::models::{AuthResponse, LoginRequest, RegisterRequest, User};
use crate::services::credentials::CredentialStore;
use crate::services::session::{SessionBus, SessionEvent, SessionListener};
use crate::services::AuthApi;

/// Who is signed in. Logging out publishes the teardown event; the other stores clear
/// themselves in response.
pub struct AuthStore<A: AuthApi> {
    service: A,
    credentials: Arc<CredentialStore>,
    bus: Arc<SessionBus>,
    user: Mutex<Option<User>>,
}

impl<A: AuthApi> AuthStore<A> {
    pub fn new(service: A, credentials: Arc<CredentialStore>, bus: Arc<SessionBus>) -> Self {
        AuthStore {
            service,
            credentials,
            bus,
            user: Mutex::new(None),
        }
    }

        pub fn initialize(&self) -> Option<User> {
        let restored = match (self.credentials.token(), self.credentials.user()) {
            (Some(_), Some(user)) => Some(user),
            _ => None,
        };
        *self.user.lock().unwrap_or_else(PoisonError::into_inner) = restored.clone();
        restored
    }

    pub fn current_user(&self) -> Option<User> {
        self.user.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let response = self.service.login(&request).await?;
        self.establish(response)
    }

    pub async fn register(&self, form: RegisterRequest) -> Result<User> {
        let response = self.service.register(&form).await?;
        self.establish(response)
    }

    pub fn logout(&self) {
        if let Err(err) = self.credentials.clear() {
            tracing::warn!("failed to clear persisted credentials: {}", err);
        }
        self.bus.end_session(SessionEvent::LoggedOut);
        *self.user.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn establish(&self, response: AuthResponse) -> Result<User> {
        self.credentials.save(&response.token, &response.user)?;
        tracing::info!(user_id = response.user.id, "signed in");
        *self.user.lock().unwrap_or_else(PoisonError::into_inner) = Some(response.user.clone());
        Ok(response.user)
    }
}

impl<A: AuthApi> SessionListener for AuthStore<A> {
    fn on_session_end(&self, _event: SessionEvent) {
        *self.user.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
