//! Derived read models over already-loaded collections. Nothing here talks to the API.

pub mod dashboard;
pub mod lists;

pub use dashboard::dashboard_stats;
pub use lists::{
    document_list, filter_documents, filter_products, filter_warehouses, paginate, warehouse_stats,
    ActivityFilter, DocumentListView, DocumentRow, Page, WarehouseStats, DEFAULT_PAGE_SIZE,
};
