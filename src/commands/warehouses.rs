use serde::Serialize;
use tauri::State;

use stockroom::models::{Warehouse, WarehouseCreateRequest, WarehousePatch};
use stockroom::views::{filter_warehouses, warehouse_stats, ActivityFilter, WarehouseStats};

use crate::commands::{require_organization, Listing};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WarehouseRow {
    #[serde(flatten)]
    pub warehouse: Warehouse,
    pub stats: WarehouseStats,
}

#[tauri::command]
pub async fn get_warehouses(
    search: Option<String>,
    activity: Option<ActivityFilter>,
    state: State<'_, AppState>,
) -> Result<Listing<Vec<WarehouseRow>>, String> {
    let snapshot = state.workspace.warehouses.snapshot();
    let documents = state.workspace.documents.records();
    let rows = filter_warehouses(
        &snapshot.records,
        search.as_deref().unwrap_or(""),
        activity.unwrap_or(ActivityFilter::All),
    )
    .into_iter()
    .map(|wh| WarehouseRow {
        stats: warehouse_stats(&documents, wh.id),
        warehouse: wh.clone(),
    })
    .collect();
    Ok(Listing {
        items: rows,
        loading: snapshot.loading,
        error: snapshot.error,
    })
}

#[tauri::command]
pub async fn create_warehouse(mut payload: WarehouseCreateRequest, state: State<'_, AppState>) -> Result<Warehouse, String> {
    payload.organization_id = require_organization(state.workspace.current_organization().map(|o| o.id))?;
    state
        .workspace
        .warehouses
        .create(&payload)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn update_warehouse(id: i64, patch: WarehousePatch, state: State<'_, AppState>) -> Result<(), String> {
    state
        .workspace
        .warehouses
        .update(id, &patch)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn delete_warehouse(id: i64, state: State<'_, AppState>) -> Result<(), String> {
    state
        .workspace
        .warehouses
        .delete(id)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn toggle_warehouse_active(id: i64, state: State<'_, AppState>) -> Result<bool, String> {
    state
        .workspace
        .toggle_warehouse_active(id)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| "Склад не найден".to_string())
}
