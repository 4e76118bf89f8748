use tauri::State;

use stockroom::models::{RegisterRequest, User};

use crate::state::AppState;

/// Restores the persisted session on startup. `None` sends the web view to the login screen.
#[tauri::command]
pub async fn initialize_session(state: State<'_, AppState>) -> Result<Option<User>, String> {
    Ok(state.workspace.initialize().await)
}

#[tauri::command]
pub async fn current_user(state: State<'_, AppState>) -> Result<Option<User>, String> {
    Ok(state.workspace.auth.current_user())
}

#[tauri::command]
pub async fn login(email: String, password: String, state: State<'_, AppState>) -> Result<User, String> {
    state
        .workspace
        .login(&email, &password)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn register(payload: RegisterRequest, state: State<'_, AppState>) -> Result<User, String> {
    let user = state
        .workspace
        .auth
        .register(payload)
        .await
        .map_err(|e| e.to_string())?;
    state.workspace.organizations.load(&()).await;
    Ok(user)
}

#[tauri::command]
pub async fn logout(state: State<'_, AppState>) -> Result<(), String> {
    state.workspace.logout();
    *state.wizard.lock().await = None;
    Ok(())
}
