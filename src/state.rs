use std::sync::{Arc, Mutex};
use tauri::{AppHandle, Emitter};

use stockroom::db::Database;
use stockroom::models::Settings;
use stockroom::services::api_client::ApiClient;
use stockroom::services::session::{SessionEvent, SessionListener};
use stockroom::services::workspace::HttpWorkspace;
use stockroom::wizard::DocumentWizard;

pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub settings: Mutex<Settings>,
    pub client: Arc<ApiClient>,
    pub workspace: HttpWorkspace,
    pub wizard: tokio::sync::Mutex<Option<DocumentWizard>>,
    _redirect: Arc<LoginRedirect>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings, app: AppHandle) -> Self {
        let db = Arc::new(Mutex::new(db));
        let (workspace, client) = HttpWorkspace::connect(db.clone(), &settings);
        let redirect = Arc::new(LoginRedirect { app });
        workspace.bus().subscribe(redirect.clone());
        AppState {
            db,
            settings: Mutex::new(settings),
            client,
            workspace,
            wizard: tokio::sync::Mutex::new(None),
            _redirect: redirect,
        }
    }
}

struct LoginRedirect {
    app: AppHandle,
}

impl SessionListener for LoginRedirect {
    fn on_session_end(&self, event: SessionEvent) {
        if let Err(err) = self.app.emit("navigate", "/login") {
            tracing::warn!(?event, "could not route to login: {}", err);
        }
    }
}
