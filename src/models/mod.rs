use serde::{Deserialize, Serialize};
use std::fmt;

pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> i64;
}

/// An update payload that can be shallow-merged into the record it targets.
pub trait Patch<R> {
    fn apply(&self, record: &mut R);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(rename = "name")]
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: i64,
    pub name: String,
    #[serde(rename = "inn")]
    pub tax_id: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_role: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizationPayload {
    pub name: String,
    #[serde(rename = "inn")]
    pub tax_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "inn", skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationOption {
    pub value: i64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub organization_id: i64,
    #[serde(default)]
    pub organization_name: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseCreateRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub organization_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehousePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub unit: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub organization_id: i64,
    #[serde(default)]
    pub organization_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreateRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    pub organization_id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
}

/// Document kinds, carried on the wire as their numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DocumentType {
    Inventory,
    Receipt,
    WriteOff,
    Transfer,
}

impl DocumentType {
    pub const ALL: [DocumentType; 4] = [
        DocumentType::Inventory,
        DocumentType::Receipt,
        DocumentType::WriteOff,
        DocumentType::Transfer,
    ];

    pub fn code(self) -> u8 {
        match self {
            DocumentType::Inventory => 1,
            DocumentType::Receipt => 2,
            DocumentType::WriteOff => 3,
            DocumentType::Transfer => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentType::Inventory => "Инвентаризация",
            DocumentType::Receipt => "Приход",
            DocumentType::WriteOff => "Списание",
            DocumentType::Transfer => "Перемещение",
        }
    }
}

impl From<DocumentType> for u8 {
    fn from(value: DocumentType) -> Self {
        value.code()
    }
}

impl TryFrom<u8> for DocumentType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(DocumentType::Inventory),
            2 => Ok(DocumentType::Receipt),
            3 => Ok(DocumentType::WriteOff),
            4 => Ok(DocumentType::Transfer),
            other => Err(format!("unknown document type {}", other)),
        }
    }
}

/// Document lifecycle label. Unrecognized server values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocumentStatus {
    Draft,
    InProgress,
    Completed,
    Cancelled,
    Other(String),
}

impl DocumentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::InProgress => "in_progress",
            DocumentStatus::Completed => "completed",
            DocumentStatus::Cancelled => "cancelled",
            DocumentStatus::Other(raw) => raw,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            DocumentStatus::Draft => "Черновик",
            DocumentStatus::InProgress => "В работе",
            DocumentStatus::Completed => "Завершен",
            DocumentStatus::Cancelled => "Отменен",
            DocumentStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for DocumentStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "draft" | "черновик" => DocumentStatus::Draft,
            "in_progress" | "in progress" | "inprogress" | "в работе" => DocumentStatus::InProgress,
            "completed" | "завершен" => DocumentStatus::Completed,
            "cancelled" | "canceled" | "отменен" => DocumentStatus::Cancelled,
            _ => DocumentStatus::Other(raw),
        }
    }
}

impl From<&str> for DocumentStatus {
    fn from(raw: &str) -> Self {
        DocumentStatus::from(raw.to_string())
    }
}

impl From<DocumentStatus> for String {
    fn from(status: DocumentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: i64,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub number: String,
    #[serde(default, alias = "documentDate")]
    pub date: Option<String>,
    pub status: DocumentStatus,
    pub organization_id: i64,
    #[serde(default)]
    pub organization_name: Option<String>,
    #[serde(default)]
    pub warehouse_id: Option<i64>,
    #[serde(default)]
    pub warehouse_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<DocumentItem>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", into = "DocumentItemRow")]
pub struct DocumentItem {
    pub id: i64,
    pub document_id: i64,
    pub product_id: i64,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub product_barcode: Option<String>,
    #[serde(default, alias = "quantity")]
    pub quantity_expected: i64,
    #[serde(default, alias = "scannedQuantity")]
    pub quantity_actual: i64,
}

impl DocumentItem {
    pub fn difference(&self) -> i64 {
        self.quantity_actual - self.quantity_expected
    }
}

// Outgoing shape of a line item; `difference` is always derived from the current quantities.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentItemRow {
    id: i64,
    document_id: i64,
    product_id: i64,
    product_name: String,
    product_barcode: Option<String>,
    quantity_expected: i64,
    quantity_actual: i64,
    difference: i64,
}

impl From<DocumentItem> for DocumentItemRow {
    fn from(item: DocumentItem) -> Self {
        let difference = item.difference();
        DocumentItemRow {
            id: item.id,
            document_id: item.document_id,
            product_id: item.product_id,
            product_name: item.product_name,
            product_barcode: item.product_barcode,
            quantity_expected: item.quantity_expected,
            quantity_actual: item.quantity_actual,
            difference,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentCreateRequest {
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub organization_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub document_date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DocumentStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<i64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<DocumentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DocumentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocumentItem {
    pub document_id: i64,
    pub product_id: i64,
    pub quantity_expected: i64,
    pub quantity_actual: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentItemUpdate {
    pub quantity_expected: i64,
    pub quantity_actual: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub api_base_url: String,
    pub use_keychain: bool,
    pub log_level: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_products: usize,
    pub total_warehouses: usize,
    pub active_warehouses: usize,
    pub active_inventories: usize,
    pub monthly_documents: usize,
    pub recent_documents: Vec<Document>,
}

impl Record for Organization {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Record for Warehouse {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Record for Product {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Record for Document {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Patch<Organization> for OrganizationPatch {
    fn apply(&self, record: &mut Organization) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(tax_id) = &self.tax_id {
            record.tax_id = tax_id.clone();
        }
        if let Some(address) = &self.address {
            record.address = address.clone();
        }
        if let Some(phone) = &self.phone {
            record.phone = phone.clone();
        }
    }
}

impl Patch<Warehouse> for WarehousePatch {
    fn apply(&self, record: &mut Warehouse) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if self.address.is_some() {
            record.address = self.address.clone();
        }
        if self.description.is_some() {
            record.description = self.description.clone();
        }
        if let Some(active) = self.is_active {
            record.is_active = active;
        }
        if let Some(organization_id) = self.organization_id {
            record.organization_id = organization_id;
        }
    }
}

impl Patch<Product> for ProductPatch {
    fn apply(&self, record: &mut Product) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if self.barcode.is_some() {
            record.barcode = self.barcode.clone();
        }
        if self.description.is_some() {
            record.description = self.description.clone();
        }
        if let Some(unit) = &self.unit {
            record.unit = unit.clone();
        }
        if let Some(active) = self.is_active {
            record.is_active = active;
        }
        if let Some(organization_id) = self.organization_id {
            record.organization_id = organization_id;
        }
    }
}

impl Patch<Document> for DocumentPatch {
    fn apply(&self, record: &mut Document) {
        if self.description.is_some() {
            record.description = self.description.clone();
        }
        if let Some(status) = &self.status {
            record.status = status.clone();
        }
    }
}

fn default_active() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn document_type_travels_as_numeric_code() {
        let value = serde_json::to_value(DocumentType::WriteOff).unwrap();
        assert_eq!(value, json!(3));
        let parsed: DocumentType = serde_json::from_value(json!(4)).unwrap();
        assert_eq!(parsed, DocumentType::Transfer);
        assert!(serde_json::from_value::<DocumentType>(json!(9)).is_err());
    }

    #[test]
    fn status_parsing_accepts_localized_and_spaced_forms() {
        assert_eq!(DocumentStatus::from("В работе"), DocumentStatus::InProgress);
        assert_eq!(DocumentStatus::from("In Progress"), DocumentStatus::InProgress);
        assert_eq!(DocumentStatus::from("DRAFT"), DocumentStatus::Draft);
        assert_eq!(
            DocumentStatus::from("archived"),
            DocumentStatus::Other("archived".to_string())
        );
        assert_eq!(DocumentStatus::InProgress.to_string(), "in_progress");
    }

    #[test]
    fn document_decodes_server_payload() {
        let doc: Document = serde_json::from_value(json!({
            "id": 7,
            "type": 1,
            "number": "INV-0007",
            "documentDate": "2026-10-02T08:00:00Z",
            "status": "draft",
            "organizationId": 3,
            "warehouseId": 11,
            "items": [{
                "id": 1,
                "documentId": 7,
                "productId": 5,
                "productName": "Гайка М8",
                "quantity": 10,
                "scannedQuantity": 7
            }]
        }))
        .unwrap();

        assert_eq!(doc.doc_type, DocumentType::Inventory);
        assert_eq!(doc.date.as_deref(), Some("2026-10-02T08:00:00Z"));
        let items = doc.items.unwrap();
        assert_eq!(items[0].difference(), -3);
    }

    #[test]
    fn line_item_json_carries_a_fresh_difference() {
        let mut item: DocumentItem = serde_json::from_value(json!({
            "id": 1,
            "documentId": 7,
            "productId": 5,
            "productName": "Гайка М8",
            "quantity": 10,
            "scannedQuantity": 7,
            "difference": -3
        }))
        .unwrap();

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["quantityExpected"], json!(10));
        assert_eq!(value["quantityActual"], json!(7));
        assert_eq!(value["difference"], json!(-3));

        item.quantity_actual = 12;
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["difference"], json!(2));

        let reread: DocumentItem = serde_json::from_value(value).unwrap();
        assert_eq!(reread, item);
    }

    #[test]
    fn patch_merges_only_present_fields() {
        let mut product = Product {
            id: 1,
            name: "Болт".to_string(),
            barcode: Some("4600001".to_string()),
            description: None,
            unit: "шт".to_string(),
            is_active: true,
            organization_id: 2,
            organization_name: Some("ООО Склад".to_string()),
            created_at: None,
        };
        let patch = ProductPatch {
            name: Some("Болт М10".to_string()),
            is_active: Some(false),
            ..ProductPatch::default()
        };
        patch.apply(&mut product);

        assert_eq!(product.name, "Болт М10");
        assert!(!product.is_active);
        assert_eq!(product.barcode.as_deref(), Some("4600001"));
        assert_eq!(product.organization_name.as_deref(), Some("ООО Склад"));
    }

    #[test]
    fn filters_omit_absent_fields() {
        let filter = DocumentFilter {
            organization_id: Some(4),
            doc_type: Some(DocumentType::Receipt),
            ..DocumentFilter::default()
        };
        let value = serde_json::to_value(&filter).unwrap();
        assert_eq!(value, json!({"organizationId": 4, "type": 2}));
    }
}
