use crate::error::ApiError;
use crate::models::{Document, DocumentItemUpdate, DocumentStatus};
use crate::services::DocumentApi;
use crate::stores::ResourceStore;

const LOAD_ONE_FAILED: &str = "Ошибка загрузки документа";
const STATUS_FAILED: &str = "Ошибка обновления статуса документа";
const ITEM_UPDATE_FAILED: &str = "Ошибка обновления позиции документа";
const ITEM_DELETE_FAILED: &str = "Ошибка удаления позиции документа";

impl<S: DocumentApi> ResourceStore<S> {
    /// Fetches one document and its line items into the selection. Opening another document
    /// before this one arrives drops this result.
    pub async fn load_document(&self, id: i64) {
        let ticket = self.begin_detail();
        let fetched = async {
            let mut document = self.service().get(id).await?;
            document.items = Some(self.service().items(id).await?);
            Ok::<Document, ApiError>(document)
        }
        .await;

        match fetched {
            Ok(document) => {
                self.settle(ticket, |state| state.selected = Some(document));
            }
            Err(err) => self.record_failure(ticket, &err, LOAD_ONE_FAILED),
        }
    }

    pub async fn load_items(&self) {
        let Some(id) = self.selected().map(|d| d.id) else {
            return;
        };
        let ticket = self.begin_write();
        match self.service().items(id).await {
            Ok(items) => {
                self.settle(ticket, |state| {
                    if let Some(selected) = state.selected.as_mut().filter(|d| d.id == id) {
                        selected.items = Some(items);
                    }
                });
            }
            Err(err) => self.record_failure(ticket, &err, LOAD_ONE_FAILED),
        }
    }

    pub async fn set_status(&self, id: i64, status: DocumentStatus) -> Result<(), ApiError> {
        let ticket = self.begin_write();
        match self.service().set_status(id, &status).await {
            Ok(()) => {
                self.settle(ticket, |state| {
                    if let Some(doc) = state.records.iter_mut().find(|d| d.id == id) {
                        doc.status = status.clone();
                    }
                    if let Some(selected) = state.selected.as_mut().filter(|d| d.id == id) {
                        selected.status = status;
                    }
                });
                Ok(())
            }
            Err(err) => {
                self.record_failure(ticket, &err, STATUS_FAILED);
                Err(err)
            }
        }
    }

    pub async fn update_item(&self, document_id: i64, item_id: i64, update: &DocumentItemUpdate) -> Result<(), ApiError> {
        let ticket = self.begin_write();
        match self.service().update_item(document_id, item_id, update).await {
            Ok(()) => {
                self.settle(ticket, |state| {
                    let items = state
                        .selected
                        .as_mut()
                        .filter(|d| d.id == document_id)
                        .and_then(|d| d.items.as_mut());
                    if let Some(item) = items.and_then(|items| items.iter_mut().find(|i| i.id == item_id)) {
                        item.quantity_expected = update.quantity_expected;
                        item.quantity_actual = update.quantity_actual;
                    }
                });
                Ok(())
            }
            Err(err) => {
                self.record_failure(ticket, &err, ITEM_UPDATE_FAILED);
                Err(err)
            }
        }
    }

    pub async fn delete_item(&self, document_id: i64, item_id: i64) -> Result<(), ApiError> {
        let ticket = self.begin_write();
        match self.service().delete_item(document_id, item_id).await {
            Ok(()) => {
                self.settle(ticket, |state| {
                    let items = state
                        .selected
                        .as_mut()
                        .filter(|d| d.id == document_id)
                        .and_then(|d| d.items.as_mut());
                    if let Some(items) = items {
                        items.retain(|i| i.id != item_id);
                    }
                });
                Ok(())
            }
            Err(err) => {
                self.record_failure(ticket, &err, ITEM_DELETE_FAILED);
                Err(err)
            }
        }
    }
}
