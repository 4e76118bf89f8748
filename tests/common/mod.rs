#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use stockroom::db::Database;
use stockroom::error::ApiError;
use stockroom::models::{
    AuthResponse, Document, DocumentCreateRequest, DocumentFilter, DocumentItem, DocumentItemUpdate, DocumentPatch,
    DocumentStatus, DocumentType, LoginRequest, NewDocumentItem, Organization, OrganizationPatch, OrganizationPayload,
    Product, ProductCreateRequest, ProductFilter, ProductPatch, Record, RegisterRequest, User, Warehouse,
    WarehouseCreateRequest, WarehouseFilter, WarehousePatch,
};
use stockroom::services::credentials::CredentialStore;
use stockroom::services::session::SessionBus;
use stockroom::services::{AuthApi, DocumentApi, ProductApi, ResourceService};
use stockroom::services::workspace::Workspace;
use stockroom::stores::auth::AuthStore;
use stockroom::stores::ResourceStore;

pub type CallLog = Arc<Mutex<Vec<String>>>;

/// In-memory backend for one resource. Every call is appended to the shared log; failures are
/// scripted per call label (`"list"`, `"create"`, `"add_item:11"`, `"set_status"`, ...).
pub struct Fake<R> {
    pub records: Mutex<Vec<R>>,
    pub items: Mutex<Vec<DocumentItem>>,
    pub added: Mutex<Vec<NewDocumentItem>>,
    log: CallLog,
    failures: Mutex<HashMap<String, (u16, String)>>,
    gates: Mutex<VecDeque<oneshot::Receiver<Vec<R>>>>,
    holds: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    next_id: AtomicI64,
}

impl<R: Clone> Fake<R> {
    pub fn new(log: CallLog, records: Vec<R>) -> Arc<Self> {
        Arc::new(Fake {
            records: Mutex::new(records),
            items: Mutex::new(Vec::new()),
            added: Mutex::new(Vec::new()),
            log,
            failures: Mutex::new(HashMap::new()),
            gates: Mutex::new(VecDeque::new()),
            holds: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(100),
        })
    }

    pub fn fail(&self, label: &str, status: u16, body: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(label.to_string(), (status, body.to_string()));
    }

    pub fn heal(&self, label: &str) {
        self.failures.lock().unwrap().remove(label);
    }

    /// The next `list` call waits for the returned sender and answers with what it is sent.
    pub fn gate_next_list(&self) -> oneshot::Sender<Vec<R>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push_back(rx);
        tx
    }

    /// The next call with this label waits until the returned sender fires (or is dropped).
    pub fn hold(&self, label: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.holds.lock().unwrap().insert(label.to_string(), rx);
        tx
    }

    async fn wait(&self, label: &str) {
        let held = self.holds.lock().unwrap().remove(label);
        if let Some(rx) = held {
            let _ = rx.await;
        }
    }

    pub fn set_records(&self, records: Vec<R>) {
        *self.records.lock().unwrap() = records;
    }

    fn call(&self, label: String) -> Result<(), ApiError> {
        self.log.lock().unwrap().push(label.clone());
        match self.failures.lock().unwrap().get(&label) {
            Some((status, body)) => Err(ApiError::from_response(*status, body)),
            None => Ok(()),
        }
    }

    async fn list_records(&self) -> Result<Vec<R>, ApiError> {
        self.call("list".to_string())?;
        let gate = self.gates.lock().unwrap().pop_front();
        match gate {
            Some(rx) => Ok(rx.await.unwrap_or_default()),
            None => Ok(self.records.lock().unwrap().clone()),
        }
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

impl<R: Record> Fake<R> {
    fn find(&self, id: i64) -> Result<R, ApiError> {
        self.call(format!("get:{}", id))?;
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or_else(|| ApiError::from_response(404, ""))
    }

    fn push(&self, record: R) -> R {
        self.records.lock().unwrap().push(record.clone());
        record
    }
}

pub struct FakeService<R>(pub Arc<Fake<R>>);

#[async_trait]
impl ResourceService for FakeService<Organization> {
    type Record = Organization;
    type Filter = ();
    type Create = OrganizationPayload;
    type Update = OrganizationPatch;

    async fn list(&self, _filter: &()) -> Result<Vec<Organization>, ApiError> {
        self.0.list_records().await
    }

    async fn get(&self, id: i64) -> Result<Organization, ApiError> {
        self.0.find(id)
    }

    async fn create(&self, payload: &OrganizationPayload) -> Result<Organization, ApiError> {
        self.0.call("create".to_string())?;
        Ok(self.0.push(Organization {
            id: self.0.next_id(),
            name: payload.name.clone(),
            tax_id: payload.tax_id.clone(),
            address: payload.address.clone().unwrap_or_default(),
            phone: payload.phone.clone().unwrap_or_default(),
            user_role: Some("owner".to_string()),
        }))
    }

    async fn update(&self, id: i64, _patch: &OrganizationPatch) -> Result<(), ApiError> {
        self.0.call(format!("update:{}", id))
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.0.call(format!("delete:{}", id))
    }
}

#[async_trait]
impl ResourceService for FakeService<Product> {
    type Record = Product;
    type Filter = ProductFilter;
    type Create = ProductCreateRequest;
    type Update = ProductPatch;

    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, ApiError> {
        let all = self.0.list_records().await?;
        Ok(match filter.organization_id {
            Some(org) => all.into_iter().filter(|p| p.organization_id == org).collect(),
            None => all,
        })
    }

    async fn get(&self, id: i64) -> Result<Product, ApiError> {
        self.0.find(id)
    }

    async fn create(&self, payload: &ProductCreateRequest) -> Result<Product, ApiError> {
        self.0.call("create".to_string())?;
        let mut created = product(self.0.next_id(), &payload.name, payload.barcode.as_deref());
        created.organization_id = payload.organization_id;
        Ok(self.0.push(created))
    }

    async fn update(&self, id: i64, _patch: &ProductPatch) -> Result<(), ApiError> {
        self.0.call(format!("update:{}", id))
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.0.call(format!("delete:{}", id))
    }
}

#[async_trait]
impl ProductApi for FakeService<Product> {
    async fn find_by_barcode(&self, barcode: &str, organization_id: i64) -> Result<Option<Product>, ApiError> {
        self.0.wait(&format!("by_barcode:{}", barcode)).await;
        self.0.call(format!("by_barcode:{}", barcode))?;
        Ok(self
            .0
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.organization_id == organization_id && p.barcode.as_deref() == Some(barcode))
            .cloned())
    }
}

#[async_trait]
impl ResourceService for FakeService<Warehouse> {
    type Record = Warehouse;
    type Filter = WarehouseFilter;
    type Create = WarehouseCreateRequest;
    type Update = WarehousePatch;

    async fn list(&self, filter: &WarehouseFilter) -> Result<Vec<Warehouse>, ApiError> {
        let all = self.0.list_records().await?;
        Ok(match filter.organization_id {
            Some(org) => all.into_iter().filter(|w| w.organization_id == org).collect(),
            None => all,
        })
    }

    async fn get(&self, id: i64) -> Result<Warehouse, ApiError> {
        self.0.find(id)
    }

    async fn create(&self, payload: &WarehouseCreateRequest) -> Result<Warehouse, ApiError> {
        self.0.call("create".to_string())?;
        let mut created = warehouse(self.0.next_id(), &payload.name, payload.is_active.unwrap_or(true));
        created.organization_id = payload.organization_id;
        created.address = payload.address.clone();
        Ok(self.0.push(created))
    }

    async fn update(&self, id: i64, _patch: &WarehousePatch) -> Result<(), ApiError> {
        self.0.call(format!("update:{}", id))
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.0.call(format!("delete:{}", id))
    }
}

#[async_trait]
impl ResourceService for FakeService<Document> {
    type Record = Document;
    type Filter = DocumentFilter;
    type Create = DocumentCreateRequest;
    type Update = DocumentPatch;

    async fn list(&self, filter: &DocumentFilter) -> Result<Vec<Document>, ApiError> {
        let all = self.0.list_records().await?;
        Ok(match filter.organization_id {
            Some(org) => all.into_iter().filter(|d| d.organization_id == org).collect(),
            None => all,
        })
    }

    async fn get(&self, id: i64) -> Result<Document, ApiError> {
        self.0.wait(&format!("get:{}", id)).await;
        self.0.find(id)
    }

    async fn create(&self, payload: &DocumentCreateRequest) -> Result<Document, ApiError> {
        self.0.call("create".to_string())?;
        let id = self.0.next_id();
        let mut created = document(id, payload.doc_type, DocumentStatus::Draft, Some(&payload.document_date));
        created.organization_id = payload.organization_id;
        created.warehouse_id = payload.warehouse_id;
        created.description = payload.description.clone();
        Ok(self.0.push(created))
    }

    async fn update(&self, id: i64, _patch: &DocumentPatch) -> Result<(), ApiError> {
        self.0.call(format!("update:{}", id))
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.0.call(format!("delete:{}", id))
    }
}

#[async_trait]
impl DocumentApi for FakeService<Document> {
    async fn set_status(&self, id: i64, status: &DocumentStatus) -> Result<(), ApiError> {
        self.0.call("set_status".to_string())?;
        if let Some(doc) = self.0.records.lock().unwrap().iter_mut().find(|d| d.id == id) {
            doc.status = status.clone();
        }
        Ok(())
    }

    async fn items(&self, document_id: i64) -> Result<Vec<DocumentItem>, ApiError> {
        self.0.call(format!("items:{}", document_id))?;
        Ok(self
            .0
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.document_id == document_id)
            .cloned()
            .collect())
    }

    async fn add_item(&self, _document_id: i64, item: &NewDocumentItem) -> Result<(), ApiError> {
        self.0.call(format!("add_item:{}", item.product_id))?;
        self.0.added.lock().unwrap().push(item.clone());
        Ok(())
    }

    async fn update_item(&self, _document_id: i64, item_id: i64, _update: &DocumentItemUpdate) -> Result<(), ApiError> {
        self.0.call(format!("update_item:{}", item_id))
    }

    async fn delete_item(&self, _document_id: i64, item_id: i64) -> Result<(), ApiError> {
        self.0.call(format!("delete_item:{}", item_id))
    }
}

/// Accepts one fixed password and hands out a fixed token.
pub struct FakeAuth {
    pub log: CallLog,
}

#[async_trait]
impl AuthApi for FakeAuth {
    async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.log.lock().unwrap().push("login".to_string());
        if credentials.password != "secret" {
            return Err(ApiError::from_response(400, r#"{"message":"Неверный email или пароль"}"#));
        }
        Ok(AuthResponse {
            token: "jwt-test-token".to_string(),
            user: user(&credentials.email),
        })
    }

    async fn register(&self, form: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.log.lock().unwrap().push("register".to_string());
        let mut registered = user(&form.email);
        registered.full_name = form.full_name.clone();
        Ok(AuthResponse {
            token: "jwt-test-token".to_string(),
            user: registered,
        })
    }
}

pub type FakeWorkspace = Workspace<
    FakeAuth,
    FakeService<Organization>,
    FakeService<Product>,
    FakeService<Warehouse>,
    FakeService<Document>,
>;

/// A workspace over fakes plus handles on every backend.
pub struct Harness {
    pub workspace: FakeWorkspace,
    pub credentials: Arc<CredentialStore>,
    pub log: CallLog,
    pub organizations: Arc<Fake<Organization>>,
    pub products: Arc<Fake<Product>>,
    pub warehouses: Arc<Fake<Warehouse>>,
    pub documents: Arc<Fake<Document>>,
}

impl Harness {
    pub fn new() -> Self {
        let log: CallLog = Arc::default();
        let db = Arc::new(Mutex::new(Database::in_memory().unwrap()));
        let credentials = Arc::new(CredentialStore::new(db, false));
        let bus = Arc::new(SessionBus::new());

        let organizations = Fake::new(log.clone(), vec![organization(1, "ООО Ромашка"), organization(2, "ИП Сидоров")]);
        let products = Fake::new(
            log.clone(),
            vec![
                product(10, "Гайка М8", Some("4600000000010")),
                product(11, "Болт М8", Some("4600000000011")),
                product(12, "Шайба", None),
            ],
        );
        let warehouses = Fake::new(
            log.clone(),
            vec![warehouse(3, "Основной склад", true), warehouse(4, "Архив", false)],
        );
        let documents = Fake::new(log.clone(), Vec::new());

        let workspace = Workspace::new(
            AuthStore::new(FakeAuth { log: log.clone() }, credentials.clone(), bus.clone()),
            ResourceStore::new(FakeService(organizations.clone())),
            ResourceStore::new(FakeService(products.clone())),
            ResourceStore::new(FakeService(warehouses.clone())),
            ResourceStore::new(FakeService(documents.clone())),
            bus,
        );

        Harness {
            workspace,
            credentials,
            log,
            organizations,
            products,
            warehouses,
            documents,
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn reset_calls(&self) {
        self.log.lock().unwrap().clear();
    }
}

pub fn user(email: &str) -> User {
    User {
        id: 1,
        email: email.to_string(),
        full_name: "Анна Петрова".to_string(),
        created_at: None,
    }
}

pub fn organization(id: i64, name: &str) -> Organization {
    Organization {
        id,
        name: name.to_string(),
        tax_id: format!("77000000{:02}", id),
        address: String::new(),
        phone: String::new(),
        user_role: None,
    }
}

pub fn product(id: i64, name: &str, barcode: Option<&str>) -> Product {
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

pub fn warehouse(id: i64, name: &str, active: bool) -> Warehouse {
    Warehouse {
        id,
        name: name.to_string(),
        address: None,
        description: None,
        organization_id: 1,
        organization_name: None,
        is_active: active,
        created_at: None,
        updated_at: None,
    }
}

pub fn document(id: i64, doc_type: DocumentType, status: DocumentStatus, date: Option<&str>) -> Document {
    Document {
        id,
        doc_type,
        type_name: None,
        number: format!("DOC-{:04}", id),
        date: date.map(str::to_string),
        status,
        organization_id: 1,
        organization_name: None,
        warehouse_id: Some(3),
        warehouse_name: None,
        description: None,
        created_at: None,
        updated_at: None,
        items: None,
    }
}

/// Serves exactly one HTTP request on a random local port and returns the raw request text.
pub async fn serve_once(status: u16, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let body = body.to_string();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {} Scripted\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });
    (format!("http://{}", addr), handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}
