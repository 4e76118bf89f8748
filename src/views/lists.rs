use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::{Document, DocumentStatus, Organization, Product, Warehouse};
use crate::utils::contains_ci;

pub const DEFAULT_PAGE_SIZE: usize = 5;
pub const SELECT_ORGANIZATION_PROMPT: &str = "Выберите организацию для работы с документами";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// 1-based pagination; out-of-range pages are clamped to the nearest valid one.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(per_page);
    let page = page.clamp(1, total_pages.max(1));
    let start = (page - 1) * per_page;
    let end = (start + per_page).min(total);
    Page {
        items: items.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
        page,
        per_page,
        total,
        total_pages,
    }
}

pub fn filter_products<'a>(products: &'a [Product], term: &str) -> Vec<&'a Product> {
    products
        .iter()
        .filter(|p| contains_ci(&p.name, term) || p.barcode.as_deref().is_some_and(|code| code.contains(term)))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityFilter {
    #[default]
    All,
    Active,
    Inactive,
}

pub fn filter_warehouses<'a>(warehouses: &'a [Warehouse], term: &str, activity: ActivityFilter) -> Vec<&'a Warehouse> {
    warehouses
        .iter()
        .filter(|wh| {
            contains_ci(&wh.name, term) || wh.address.as_deref().is_some_and(|a| contains_ci(a, term))
        })
        .filter(|wh| match activity {
            ActivityFilter::All => true,
            ActivityFilter::Active => wh.is_active,
            ActivityFilter::Inactive => !wh.is_active,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WarehouseStats {
    pub products_count: usize,
    pub documents_count: usize,
}

/// Documents held by a warehouse and the distinct products across their loaded items.
pub fn warehouse_stats(documents: &[Document], warehouse_id: i64) -> WarehouseStats {
    let held: Vec<&Document> = documents
        .iter()
        .filter(|doc| doc.warehouse_id == Some(warehouse_id))
        .collect();
    let products: HashSet<i64> = held
        .iter()
        .flat_map(|doc| doc.items.iter().flatten())
        .map(|item| item.product_id)
        .collect();
    WarehouseStats {
        products_count: products.len(),
        documents_count: held.len(),
    }
}

pub fn filter_documents<'a>(documents: &'a [Document], term: &str) -> Vec<&'a Document> {
    documents
        .iter()
        .filter(|doc| {
            contains_ci(&doc.number, term) || doc.description.as_deref().is_some_and(|d| contains_ci(d, term))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentRow {
    pub id: i64,
    pub number: String,
    pub type_label: String,
    pub status: DocumentStatus,
    pub status_label: String,
    pub date: Option<String>,
    pub warehouse_name: Option<String>,
    pub description: Option<String>,
    pub items_count: usize,
    pub can_complete: bool,
    pub partially_created: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentListView {
    NoOrganization { prompt: String },
    Table { rows: Vec<DocumentRow> },
}

pub fn document_list(
    organization: Option<&Organization>,
    documents: &[Document],
    term: &str,
    partially_created: &HashSet<i64>,
) -> DocumentListView {
    if organization.is_none() {
        return DocumentListView::NoOrganization {
            prompt: SELECT_ORGANIZATION_PROMPT.to_string(),
        };
    }
    let rows = filter_documents(documents, term)
        .into_iter()
        .map(|doc| DocumentRow {
            id: doc.id,
            number: doc.number.clone(),
            type_label: doc
                .type_name
                .clone()
                .unwrap_or_else(|| doc.doc_type.label().to_string()),
            status: doc.status.clone(),
            status_label: doc.status.label().to_string(),
            date: doc.date.clone(),
            warehouse_name: doc.warehouse_name.clone(),
            description: doc.description.clone(),
            items_count: doc.items.as_ref().map_or(0, Vec::len),
            can_complete: doc.status == DocumentStatus::Draft,
            partially_created: partially_created.contains(&doc.id),
        })
        .collect();
    DocumentListView::Table { rows }
}
