pub mod auth;
pub mod dashboard;
pub mod documents;
pub mod organizations;
pub mod products;
pub mod settings;
pub mod warehouses;
pub mod wizard;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Listing<T> {
    pub items: T,
    pub loading: bool,
    pub error: Option<String>,
}

pub(crate) fn require_organization(organization_id: Option<i64>) -> Result<i64, String> {
    organization_id.ok_or_else(|| "Организация не выбрана".to_string())
}
