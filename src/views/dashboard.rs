use chrono::{Datelike, NaiveDate};

use crate::models::{DashboardStats, Document, DocumentStatus, DocumentType, Product, Warehouse};
use crate::utils::parse_date;

const RECENT_LIMIT: usize = 4;

pub fn dashboard_stats(
    products: &[Product],
    warehouses: &[Warehouse],
    documents: &[Document],
    today: NaiveDate,
) -> DashboardStats {
    let active_inventories = documents
        .iter()
        .filter(|doc| doc.doc_type == DocumentType::Inventory && doc.status == DocumentStatus::InProgress)
        .count();

    let monthly_documents = documents
        .iter()
        .filter_map(document_date)
        .filter(|date| date.year() == today.year() && date.month() == today.month())
        .count();

    DashboardStats {
        total_products: products.len(),
        total_warehouses: warehouses.len(),
        active_warehouses: warehouses.iter().filter(|wh| wh.is_active).count(),
        active_inventories,
        monthly_documents,
        recent_documents: documents.iter().take(RECENT_LIMIT).cloned().collect(),
    }
}

/// Document date, or the creation timestamp when the server left it out.
fn document_date(doc: &Document) -> Option<NaiveDate> {
    doc.date
        .as_deref()
        .and_then(parse_date)
        .or_else(|| doc.created_at.as_deref().and_then(parse_date))
}
