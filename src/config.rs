use anyhow::Result;

use crate::db::Database;
use crate::models::Settings;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5039";
pub const API_URL_ENV: &str = "STOCKROOM_API_URL";

const KEY_API_BASE_URL: &str = "api_base_url";
const KEY_USE_KEYCHAIN: &str = "use_keychain";
const KEY_LOG_LEVEL: &str = "log_level";

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            use_keychain: true,
            log_level: "info".to_string(),
        }
    }
}

/// Reads settings from the settings table; the environment wins for the API address.
pub fn load_settings(db: &Database) -> Settings {
    let defaults = Settings::default();
    let stored_url = db.get_setting(KEY_API_BASE_URL).ok().flatten();
    let env_url = std::env::var(API_URL_ENV).ok().filter(|v| !v.trim().is_empty());
    let api_base_url = env_url.or(stored_url).unwrap_or(defaults.api_base_url);

    let use_keychain = db
        .get_setting(KEY_USE_KEYCHAIN)
        .ok()
        .flatten()
        .map(|v| v == "true")
        .unwrap_or(defaults.use_keychain);
    let log_level = db
        .get_setting(KEY_LOG_LEVEL)
        .ok()
        .flatten()
        .unwrap_or(defaults.log_level);

    Settings {
        api_base_url: normalize_base_url(&api_base_url),
        use_keychain,
        log_level,
    }
}

pub fn save_settings(db: &Database, settings: &Settings) -> Result<()> {
    db.set_setting(KEY_API_BASE_URL, &normalize_base_url(&settings.api_base_url))?;
    db.set_setting(KEY_USE_KEYCHAIN, if settings.use_keychain { "true" } else { "false" })?;
    db.set_setting(KEY_LOG_LEVEL, &settings.log_level)?;
    Ok(())
}

pub fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}
