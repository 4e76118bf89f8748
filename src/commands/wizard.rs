use tauri::State;

use stockroom::models::{Document, DocumentType, Product};
use stockroom::views::filter_products;
use stockroom::wizard::{CompletionReport, DocumentWizard};

use crate::commands::require_organization;
use crate::state::AppState;

const NO_WIZARD: &str = "Мастер создания документа не открыт";

async fn with_wizard<T, F>(state: &AppState, edit: F) -> Result<T, String>
where
    F: FnOnce(&mut DocumentWizard) -> Result<T, String>,
{
    let mut guard = state.wizard.lock().await;
    let wizard = guard.as_mut().ok_or_else(|| NO_WIZARD.to_string())?;
    edit(wizard)
}

#[tauri::command]
pub async fn wizard_start(state: State<'_, AppState>) -> Result<DocumentWizard, String> {
    let wizard = state.workspace.new_wizard();
    *state.wizard.lock().await = Some(wizard.clone());
    Ok(wizard)
}

#[tauri::command]
pub async fn wizard_state(state: State<'_, AppState>) -> Result<Option<DocumentWizard>, String> {
    Ok(state.wizard.lock().await.clone())
}

#[tauri::command]
pub async fn wizard_set_header(
    doc_type: DocumentType,
    warehouse_id: Option<i64>,
    description: String,
    state: State<'_, AppState>,
) -> Result<DocumentWizard, String> {
    let warehouse = match warehouse_id {
        Some(id) => Some(
            state
                .workspace
                .warehouses
                .records()
                .into_iter()
                .find(|wh| wh.id == id)
                .ok_or_else(|| "Склад не найден".to_string())?,
        ),
        None => None,
    };
    with_wizard(&state, |wizard| {
        wizard.set_type(doc_type).map_err(|e| e.to_string())?;
        wizard.set_warehouse(warehouse.as_ref()).map_err(|e| e.to_string())?;
        wizard.set_description(&description).map_err(|e| e.to_string())?;
        Ok(wizard.clone())
    })
    .await
}

#[tauri::command]
pub async fn wizard_next(state: State<'_, AppState>) -> Result<DocumentWizard, String> {
    with_wizard(&state, |wizard| {
        wizard.next().map_err(|e| e.to_string())?;
        Ok(wizard.clone())
    })
    .await
}

#[tauri::command]
pub async fn wizard_back(state: State<'_, AppState>) -> Result<DocumentWizard, String> {
    with_wizard(&state, |wizard| {
        wizard.back().map_err(|e| e.to_string())?;
        Ok(wizard.clone())
    })
    .await
}

#[tauri::command]
pub async fn wizard_search_products(term: String, state: State<'_, AppState>) -> Result<Vec<Product>, String> {
    let products = state.workspace.products.records();
    Ok(filter_products(&products, term.trim()).into_iter().cloned().collect())
}

#[tauri::command]
pub async fn wizard_add_product(product_id: i64, state: State<'_, AppState>) -> Result<bool, String> {
    let product = state
        .workspace
        .products
        .records()
        .into_iter()
        .find(|p| p.id == product_id)
        .ok_or_else(|| "Товар не найден".to_string())?;
    with_wizard(&state, |wizard| wizard.add_product(&product).map_err(|e| e.to_string())).await
}

/// Scanner input: looks the code up on the server and adds the product. `false` when the
/// code is unknown or the product is already in the document.
#[tauri::command]
pub async fn wizard_add_by_barcode(barcode: String, state: State<'_, AppState>) -> Result<bool, String> {
    let organization_id = require_organization(state.workspace.current_organization().map(|o| o.id))?;
    let found = state
        .workspace
        .products
        .search_by_barcode(barcode.trim(), organization_id)
        .await
        .map_err(|e| e.to_string())?;
    let Some(product) = found else {
        return Ok(false);
    };
    with_wizard(&state, |wizard| wizard.add_product(&product).map_err(|e| e.to_string())).await
}

#[tauri::command]
pub async fn wizard_remove_product(product_id: i64, state: State<'_, AppState>) -> Result<bool, String> {
    with_wizard(&state, |wizard| wizard.remove_product(product_id).map_err(|e| e.to_string())).await
}

#[tauri::command]
pub async fn wizard_set_quantities(
    product_id: i64,
    expected: Option<i64>,
    scanned: Option<i64>,
    state: State<'_, AppState>,
) -> Result<DocumentWizard, String> {
    with_wizard(&state, |wizard| {
        if let Some(quantity) = expected {
            wizard.set_expected(product_id, quantity).map_err(|e| e.to_string())?;
        }
        if let Some(quantity) = scanned {
            wizard.set_scanned(product_id, quantity).map_err(|e| e.to_string())?;
        }
        Ok(wizard.clone())
    })
    .await
}

#[tauri::command]
pub async fn wizard_save_draft(state: State<'_, AppState>) -> Result<Document, String> {
    let mut guard = state.wizard.lock().await;
    let wizard = guard.as_mut().ok_or_else(|| NO_WIZARD.to_string())?;
    let document = wizard
        .save_draft(&state.workspace.documents)
        .await
        .map_err(|e| e.to_string())?;
    *guard = None;
    Ok(document)
}

/// Runs the header/items/status sequence. A partial report keeps the wizard open for retry.
#[tauri::command]
pub async fn wizard_complete(state: State<'_, AppState>) -> Result<CompletionReport, String> {
    let mut guard = state.wizard.lock().await;
    let wizard = guard.as_mut().ok_or_else(|| NO_WIZARD.to_string())?;
    let report = wizard
        .complete(&state.workspace.documents)
        .await
        .map_err(|e| e.to_string())?;
    state.workspace.record_completion(&report);
    if !report.is_partial() {
        *guard = None;
    }
    Ok(report)
}

#[tauri::command]
pub async fn wizard_retry(state: State<'_, AppState>) -> Result<CompletionReport, String> {
    let mut guard = state.wizard.lock().await;
    let wizard = guard.as_mut().ok_or_else(|| NO_WIZARD.to_string())?;
    let report = wizard
        .retry(&state.workspace.documents)
        .await
        .map_err(|e| e.to_string())?;
    state.workspace.record_completion(&report);
    if !report.is_partial() {
        *guard = None;
    }
    Ok(report)
}

#[tauri::command]
pub async fn wizard_cancel(state: State<'_, AppState>) -> Result<(), String> {
    *state.wizard.lock().await = None;
    Ok(())
}
