use serde::Deserialize;
use tauri::State;

use stockroom::config;
use stockroom::models::Settings;

use crate::state::AppState;

#[derive(Deserialize)]
pub struct SettingsPayload {
    pub api_base_url: Option<String>,
    pub use_keychain: Option<bool>,
    pub log_level: Option<String>,
}

#[tauri::command]
pub async fn get_settings(state: State<'_, AppState>) -> Result<Settings, String> {
    let settings = state.settings.lock().map_err(|_| "Settings lock".to_string())?;
    Ok(settings.clone())
}

#[tauri::command]
pub async fn save_settings(payload: SettingsPayload, state: State<'_, AppState>) -> Result<Settings, String> {
    let mut settings = state
        .settings
        .lock()
        .map_err(|_| "Settings lock".to_string())?
        .clone();
    if let Some(url) = payload.api_base_url.filter(|u| !u.trim().is_empty()) {
        settings.api_base_url = config::normalize_base_url(&url);
    }
    if let Some(use_keychain) = payload.use_keychain {
        settings.use_keychain = use_keychain;
    }
    if let Some(level) = payload.log_level {
        settings.log_level = level;
    }

    {
        let db = state.db.lock().map_err(|_| "DB lock".to_string())?;
        config::save_settings(&db, &settings).map_err(|e| e.to_string())?;
    }
    state.client.set_base_url(&settings.api_base_url);
    state.client.credentials().set_use_keychain(settings.use_keychain);
    *state.settings.lock().map_err(|_| "Settings lock".to_string())? = settings.clone();
    tracing::info!(base_url = %settings.api_base_url, "settings saved");
    Ok(settings)
}
