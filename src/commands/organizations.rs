use tauri::State;

use stockroom::models::{Organization, OrganizationOption, OrganizationPatch, OrganizationPayload};
use stockroom::stores::StoreSnapshot;

use crate::state::AppState;

#[tauri::command]
pub async fn get_organizations(
    refresh: Option<bool>,
    state: State<'_, AppState>,
) -> Result<StoreSnapshot<Organization>, String> {
    if refresh.unwrap_or(false) {
        state.workspace.organizations.load(&()).await;
    }
    Ok(state.workspace.organizations.snapshot())
}

#[tauri::command]
pub async fn get_organization_options(state: State<'_, AppState>) -> Result<Vec<OrganizationOption>, String> {
    Ok(state.workspace.organization_options())
}

#[tauri::command]
pub async fn select_organization(
    organization_id: Option<i64>,
    state: State<'_, AppState>,
) -> Result<Option<Organization>, String> {
    Ok(state.workspace.select_organization(organization_id).await)
}

#[tauri::command]
pub async fn create_organization(
    payload: OrganizationPayload,
    state: State<'_, AppState>,
) -> Result<Organization, String> {
    state
        .workspace
        .organizations
        .create(&payload)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn update_organization(
    id: i64,
    patch: OrganizationPatch,
    state: State<'_, AppState>,
) -> Result<(), String> {
    state
        .workspace
        .organizations
        .update(id, &patch)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn delete_organization(id: i64, state: State<'_, AppState>) -> Result<(), String> {
    let was_current = state.workspace.current_organization().map(|o| o.id) == Some(id);
    state
        .workspace
        .organizations
        .delete(id)
        .await
        .map_err(|e| e.to_string())?;
    if was_current {
        state.workspace.select_organization(None).await;
    }
    Ok(())
}
