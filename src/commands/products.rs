use tauri::State;

use stockroom::models::{Product, ProductCreateRequest, ProductPatch};
use stockroom::views::{filter_products, paginate, Page, DEFAULT_PAGE_SIZE};

use crate::commands::{require_organization, Listing};
use crate::state::AppState;

#[tauri::command]
pub async fn get_products(
    search: Option<String>,
    page: Option<usize>,
    per_page: Option<usize>,
    state: State<'_, AppState>,
) -> Result<Listing<Page<Product>>, String> {
    let snapshot = state.workspace.products.snapshot();
    let matching: Vec<Product> = filter_products(&snapshot.records, search.as_deref().unwrap_or(""))
        .into_iter()
        .cloned()
        .collect();
    Ok(Listing {
        items: paginate(&matching, page.unwrap_or(1), per_page.unwrap_or(DEFAULT_PAGE_SIZE)),
        loading: snapshot.loading,
        error: snapshot.error,
    })
}

#[tauri::command]
pub async fn find_product_by_barcode(barcode: String, state: State<'_, AppState>) -> Result<Option<Product>, String> {
    let organization_id = require_organization(state.workspace.current_organization().map(|o| o.id))?;
    state
        .workspace
        .products
        .search_by_barcode(barcode.trim(), organization_id)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn create_product(mut payload: ProductCreateRequest, state: State<'_, AppState>) -> Result<Product, String> {
    payload.organization_id = require_organization(state.workspace.current_organization().map(|o| o.id))?;
    state
        .workspace
        .products
        .create(&payload)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn update_product(id: i64, patch: ProductPatch, state: State<'_, AppState>) -> Result<(), String> {
    state
        .workspace
        .products
        .update(id, &patch)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn delete_product(id: i64, state: State<'_, AppState>) -> Result<(), String> {
    state
        .workspace
        .products
        .delete(id)
        .await
        .map_err(|e| e.to_string())
}
