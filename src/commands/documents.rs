use tauri::State;

use stockroom::models::{Document, DocumentItem, DocumentItemUpdate};
use stockroom::views::DocumentListView;

use crate::state::AppState;

#[tauri::command]
pub async fn get_documents(
    search: Option<String>,
    refresh: Option<bool>,
    state: State<'_, AppState>,
) -> Result<DocumentListView, String> {
    if refresh.unwrap_or(false) {
        state.workspace.refresh_documents().await;
    }
    Ok(state.workspace.document_list_view(search.as_deref().unwrap_or("")))
}

#[tauri::command]
pub async fn get_document_detail(id: i64, state: State<'_, AppState>) -> Result<Document, String> {
    let documents = &state.workspace.documents;
    documents.load_document(id).await;
    match documents.selected().filter(|d| d.id == id) {
        Some(document) => Ok(document),
        None => Err(documents
            .error()
            .unwrap_or_else(|| "Документ не найден".to_string())),
    }
}

#[tauri::command]
pub async fn get_document_items(id: i64, state: State<'_, AppState>) -> Result<Vec<DocumentItem>, String> {
    let documents = &state.workspace.documents;
    if documents.selected().map(|d| d.id) == Some(id) {
        documents.load_items().await;
    } else {
        documents.load_document(id).await;
    }
    if let Some(message) = documents.error() {
        return Err(message);
    }
    documents
        .selected()
        .filter(|d| d.id == id)
        .map(|d| d.items.unwrap_or_default())
        .ok_or_else(|| "Документ не найден".to_string())
}

/// The "complete" action of the document list. Only drafts move; anything else returns false.
#[tauri::command]
pub async fn complete_document(id: i64, state: State<'_, AppState>) -> Result<bool, String> {
    state
        .workspace
        .complete_draft(id)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn delete_document(id: i64, state: State<'_, AppState>) -> Result<(), String> {
    state
        .workspace
        .documents
        .delete(id)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn update_document_item(
    document_id: i64,
    item_id: i64,
    update: DocumentItemUpdate,
    state: State<'_, AppState>,
) -> Result<(), String> {
    state
        .workspace
        .documents
        .update_item(document_id, item_id, &update)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn delete_document_item(document_id: i64, item_id: i64, state: State<'_, AppState>) -> Result<(), String> {
    state
        .workspace
        .documents
        .delete_item(document_id, item_id)
        .await
        .map_err(|e| e.to_string())
}
