//! Two-step document authoring.
//!
//! Step one picks the document type, warehouse and description. Step two collects line items
//! with expected and scanned quantities. "Save as draft" writes only the header. "Complete"
//! writes the header, then every line item, then moves the status to in-progress. Item and
//! status failures after the header exists do not abort the run. They are collected in a
//! [`CompletionReport`] and the wizard parks in [`WizardStep::Partial`], where
//! [`DocumentWizard::retry`] replays only what failed.

use serde::Serialize;
use thiserror::Error;

use crate::error::ApiError;
use crate::models::{
    Document, DocumentCreateRequest, DocumentStatus, DocumentType, NewDocumentItem, Product, Warehouse,
};
use crate::services::DocumentApi;
use crate::stores::ResourceStore;
use crate::utils::now_rfc3339;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Header,
    Items,
    Partial,
    Closed,
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Организация не выбрана")]
    NoOrganization,
    #[error("Выберите склад")]
    NoWarehouse,
    #[error("Склад неактивен")]
    InactiveWarehouse,
    #[error("Добавьте хотя бы один товар")]
    NoItems,
    #[error("товар {0} не добавлен в документ")]
    UnknownProduct(i64),
    #[error("действие недоступно на шаге {0:?}")]
    WrongStep(WizardStep),
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WizardItem {
    pub product_id: i64,
    pub product_name: String,
    pub product_barcode: Option<String>,
    pub quantity_expected: i64,
    pub quantity_actual: i64,
    pub difference: i64,
}

impl WizardItem {
    fn for_product(product: &Product) -> Self {
        WizardItem {
            product_id: product.id,
            product_name: product.name.clone(),
            product_barcode: product.barcode.clone(),
            quantity_expected: 0,
            quantity_actual: 0,
            difference: 0,
        }
    }

    fn recompute(&mut self) {
        self.difference = self.quantity_actual - self.quantity_expected;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemFailure {
    pub product_id: i64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionReport {
    pub document: Document,
    pub items_written: usize,
    pub failed_items: Vec<ItemFailure>,
    pub status_applied: bool,
    pub status_error: Option<String>,
}

impl CompletionReport {
    /// The header exists on the server but some later write did not land.
    pub fn is_partial(&self) -> bool {
        !self.failed_items.is_empty() || !self.status_applied
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentWizard {
    step: WizardStep,
    organization_id: Option<i64>,
    doc_type: DocumentType,
    warehouse_id: Option<i64>,
    description: String,
    items: Vec<WizardItem>,
    report: Option<CompletionReport>,
}

impl DocumentWizard {
    pub fn new(organization_id: Option<i64>) -> Self {
        DocumentWizard {
            step: WizardStep::Header,
            organization_id,
            doc_type: DocumentType::Inventory,
            warehouse_id: None,
            description: String::new(),
            items: Vec::new(),
            report: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn doc_type(&self) -> DocumentType {
        self.doc_type
    }

    pub fn warehouse_id(&self) -> Option<i64> {
        self.warehouse_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn items(&self) -> &[WizardItem] {
        &self.items
    }

    pub fn report(&self) -> Option<&CompletionReport> {
        self.report.as_ref()
    }

    pub fn set_type(&mut self, doc_type: DocumentType) -> Result<(), WizardError> {
        self.require(WizardStep::Header)?;
        self.doc_type = doc_type;
        Ok(())
    }

    pub fn set_warehouse(&mut self, warehouse: Option<&Warehouse>) -> Result<(), WizardError> {
        self.require(WizardStep::Header)?;
        match warehouse {
            Some(wh) if !wh.is_active => Err(WizardError::InactiveWarehouse),
            Some(wh) => {
                self.warehouse_id = Some(wh.id);
                Ok(())
            }
            None => {
                self.warehouse_id = None;
                Ok(())
            }
        }
    }

    pub fn set_description(&mut self, description: &str) -> Result<(), WizardError> {
        self.require(WizardStep::Header)?;
        self.description = description.to_string();
        Ok(())
    }

    pub fn next(&mut self) -> Result<(), WizardError> {
        self.require(WizardStep::Header)?;
        self.organization()?;
        if self.warehouse_id.is_none() {
            return Err(WizardError::NoWarehouse);
        }
        self.step = WizardStep::Items;
        Ok(())
    }

    pub fn back(&mut self) -> Result<(), WizardError> {
        self.require(WizardStep::Items)?;
        self.step = WizardStep::Header;
        Ok(())
    }

    /// Adds a zeroed line for `product`; returns false if it is already in the document.
    pub fn add_product(&mut self, product: &Product) -> Result<bool, WizardError> {
        self.require(WizardStep::Items)?;
        if self.items.iter().any(|item| item.product_id == product.id) {
            return Ok(false);
        }
        self.items.push(WizardItem::for_product(product));
        Ok(true)
    }

    pub fn remove_product(&mut self, product_id: i64) -> Result<bool, WizardError> {
        self.require(WizardStep::Items)?;
        let before = self.items.len();
        self.items.retain(|item| item.product_id != product_id);
        Ok(self.items.len() != before)
    }

    pub fn set_expected(&mut self, product_id: i64, quantity: i64) -> Result<&WizardItem, WizardError> {
        self.edit_item(product_id, |item| item.quantity_expected = quantity)
    }

    pub fn set_scanned(&mut self, product_id: i64, quantity: i64) -> Result<&WizardItem, WizardError> {
        self.edit_item(product_id, |item| item.quantity_actual = quantity)
    }

    /// Submission gate: organization, warehouse and at least one line.
    pub fn validate(&self) -> Result<(), WizardError> {
        self.require(WizardStep::Items)?;
        self.organization()?;
        if self.warehouse_id.is_none() {
            return Err(WizardError::NoWarehouse);
        }
        if self.items.is_empty() {
            return Err(WizardError::NoItems);
        }
        Ok(())
    }

    /// Writes the header only. Line items collected in step two are not sent.
    pub async fn save_draft<S: DocumentApi>(&mut self, store: &ResourceStore<S>) -> Result<Document, WizardError> {
        self.validate()?;
        let document = store.create(&self.header_request()?).await?;
        tracing::info!(document_id = document.id, "draft document created");
        self.step = WizardStep::Closed;
        Ok(document)
    }

    pub async fn complete<S: DocumentApi>(&mut self, store: &ResourceStore<S>) -> Result<CompletionReport, WizardError> {
        self.validate()?;
        let document = store.create(&self.header_request()?).await?;
        tracing::info!(document_id = document.id, items = self.items.len(), "document created, writing items");

        let mut report = CompletionReport {
            document,
            items_written: 0,
            failed_items: Vec::new(),
            status_applied: false,
            status_error: None,
        };
        let pending: Vec<i64> = self.items.iter().map(|item| item.product_id).collect();
        self.write_items(store, &mut report, &pending).await;
        Self::transition(store, &mut report).await;
        Ok(self.finish(report))
    }

    /// Replays the failed item writes and a pending status transition after a partial run.
    pub async fn retry<S: DocumentApi>(&mut self, store: &ResourceStore<S>) -> Result<CompletionReport, WizardError> {
        self.require(WizardStep::Partial)?;
        let Some(mut report) = self.report.take() else {
            return Err(WizardError::WrongStep(self.step));
        };
        let pending: Vec<i64> = report.failed_items.drain(..).map(|f| f.product_id).collect();
        self.write_items(store, &mut report, &pending).await;
        if !report.status_applied {
            Self::transition(store, &mut report).await;
        }
        Ok(self.finish(report))
    }

    fn finish(&mut self, report: CompletionReport) -> CompletionReport {
        if report.is_partial() {
            tracing::warn!(
                document_id = report.document.id,
                failed_items = report.failed_items.len(),
                status_applied = report.status_applied,
                "document partially created"
            );
            self.step = WizardStep::Partial;
            self.report = Some(report.clone());
        } else {
            self.step = WizardStep::Closed;
            self.report = None;
        }
        report
    }

    async fn write_items<S: DocumentApi>(
        &self,
        store: &ResourceStore<S>,
        report: &mut CompletionReport,
        product_ids: &[i64],
    ) {
        let document_id = report.document.id;
        for item in self.items.iter().filter(|i| product_ids.contains(&i.product_id)) {
            let payload = NewDocumentItem {
                document_id,
                product_id: item.product_id,
                quantity_expected: item.quantity_expected,
                quantity_actual: item.quantity_actual,
            };
            match store.service().add_item(document_id, &payload).await {
                Ok(()) => report.items_written += 1,
                Err(err) => {
                    tracing::warn!(document_id, product_id = item.product_id, "line item not saved: {}", err);
                    report.failed_items.push(ItemFailure {
                        product_id: item.product_id,
                        message: err.to_string(),
                    });
                }
            }
        }
    }

    async fn transition<S: DocumentApi>(store: &ResourceStore<S>, report: &mut CompletionReport) {
        match store.set_status(report.document.id, DocumentStatus::InProgress).await {
            Ok(()) => {
                report.status_applied = true;
                report.status_error = None;
                report.document.status = DocumentStatus::InProgress;
            }
            Err(err) => report.status_error = Some(err.to_string()),
        }
    }

    fn header_request(&self) -> Result<DocumentCreateRequest, WizardError> {
        let description = self.description.trim();
        Ok(DocumentCreateRequest {
            doc_type: self.doc_type,
            organization_id: self.organization()?,
            warehouse_id: self.warehouse_id,
            description: (!description.is_empty()).then(|| description.to_string()),
            document_date: now_rfc3339(),
        })
    }

    fn edit_item<F>(&mut self, product_id: i64, edit: F) -> Result<&WizardItem, WizardError>
    where
        F: FnOnce(&mut WizardItem),
    {
        self.require(WizardStep::Items)?;
        let item = self
            .items
            .iter_mut()
            .find(|item| item.product_id == product_id)
            .ok_or(WizardError::UnknownProduct(product_id))?;
        edit(item);
        item.recompute();
        Ok(item)
    }

    fn organization(&self) -> Result<i64, WizardError> {
        self.organization_id.ok_or(WizardError::NoOrganization)
    }

    fn require(&self, step: WizardStep) -> Result<(), WizardError> {
        if self.step == step {
            Ok(())
        } else {
            Err(WizardError::WrongStep(self.step))
        }
    }
}

pub fn selectable_warehouses(warehouses: &[Warehouse]) -> Vec<&Warehouse> {
    warehouses.iter().filter(|wh| wh.is_active).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, name: &str, barcode: Option<&str>) -> Product {
        Product {
            id,
            name: name.to_string(),
            barcode: barcode.map(str::to_string),
            description: None,
            unit: "шт".to_string(),
            is_active: true,
            organization_id: 1,
            organization_name: None,
            created_at: None,
        }
    }

    fn warehouse(id: i64, active: bool) -> Warehouse {
        Warehouse {
            id,
            name: format!("Склад {}", id),
            address: None,
            description: None,
            organization_id: 1,
            organization_name: None,
            is_active: active,
            created_at: None,
            updated_at: None,
        }
    }

    fn wizard_on_items() -> DocumentWizard {
        let mut wizard = DocumentWizard::new(Some(1));
        wizard.set_warehouse(Some(&warehouse(3, true))).unwrap();
        wizard.next().unwrap();
        wizard
    }

    #[test]
    fn advancing_needs_organization_and_warehouse() {
        let mut no_org = DocumentWizard::new(None);
        no_org.set_warehouse(Some(&warehouse(3, true))).unwrap();
        assert!(matches!(no_org.next(), Err(WizardError::NoOrganization)));

        let mut no_wh = DocumentWizard::new(Some(1));
        assert!(matches!(no_wh.next(), Err(WizardError::NoWarehouse)));
        assert_eq!(no_wh.step(), WizardStep::Header);

        assert!(matches!(
            no_wh.set_warehouse(Some(&warehouse(4, false))),
            Err(WizardError::InactiveWarehouse)
        ));
    }

    #[test]
    fn difference_tracks_every_edit_including_negatives() {
        let mut wizard = wizard_on_items();
        wizard.add_product(&product(10, "Гайка", Some("460001"))).unwrap();

        assert_eq!(wizard.set_expected(10, 12).unwrap().difference, -12);
        assert_eq!(wizard.set_scanned(10, 9).unwrap().difference, -3);
        assert_eq!(wizard.set_expected(10, -4).unwrap().difference, 13);
        assert_eq!(wizard.set_scanned(10, -10).unwrap().difference, -6);
        assert!(matches!(wizard.set_scanned(99, 1), Err(WizardError::UnknownProduct(99))));
    }

    #[test]
    fn adding_a_product_twice_keeps_one_line() {
        let mut wizard = wizard_on_items();
        let gaika = product(10, "Гайка", None);
        assert!(wizard.add_product(&gaika).unwrap());
        assert!(wizard.add_product(&product(11, "Болт", None)).unwrap());
        assert!(!wizard.add_product(&gaika).unwrap());
        assert_eq!(wizard.items().len(), 2);

        assert!(wizard.remove_product(10).unwrap());
        assert!(!wizard.remove_product(10).unwrap());
        assert_eq!(wizard.items().len(), 1);
    }

    #[test]
    fn submission_requires_a_line_item() {
        let wizard = wizard_on_items();
        assert!(matches!(wizard.validate(), Err(WizardError::NoItems)));
    }

    #[test]
    fn header_fields_are_locked_on_step_two() {
        let mut wizard = wizard_on_items();
        assert!(matches!(
            wizard.set_type(DocumentType::Receipt),
            Err(WizardError::WrongStep(WizardStep::Items))
        ));
        wizard.back().unwrap();
        wizard.set_type(DocumentType::Receipt).unwrap();
        assert_eq!(wizard.doc_type(), DocumentType::Receipt);
    }

    #[test]
    fn inactive_warehouses_are_not_offered() {
        let all = vec![warehouse(1, true), warehouse(2, false), warehouse(3, true)];
        let ids: Vec<i64> = selectable_warehouses(&all).iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
