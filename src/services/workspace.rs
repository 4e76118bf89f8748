use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::db::Database;
use crate::error::ApiError;
use crate::models::{
    DashboardStats, DocumentFilter, DocumentStatus, Organization, OrganizationOption, ProductFilter, Settings, User,
    Warehouse, WarehouseFilter, WarehousePatch,
};
use crate::services::api_client::ApiClient;
use crate::services::auth::HttpAuth;
use crate::services::credentials::CredentialStore;
use crate::services::documents::HttpDocuments;
use crate::services::organizations::{organization_options, HttpOrganizations};
use crate::services::products::HttpProducts;
use crate::services::session::{SessionBus, SessionEvent, SessionListener};
use crate::services::warehouses::HttpWarehouses;
use crate::services::{AuthApi, DocumentApi, ProductApi, ResourceService};
use crate::stores::auth::AuthStore;
use crate::stores::ResourceStore;
use crate::views::{dashboard_stats, document_list, DocumentListView};
use crate::wizard::{CompletionReport, DocumentWizard};

pub type HttpWorkspace = Workspace<HttpAuth, HttpOrganizations, HttpProducts, HttpWarehouses, HttpDocuments>;

/// Ids of documents whose "complete" run stopped after the header was written.
#[derive(Default)]
struct PartialDocuments {
    ids: Mutex<HashSet<i64>>,
}

impl PartialDocuments {
    fn ids(&self) -> HashSet<i64> {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn mark(&self, id: i64, partial: bool) {
        let mut ids = self.ids.lock().unwrap_or_else(PoisonError::into_inner);
        if partial {
            ids.insert(id);
        } else {
            ids.remove(&id);
        }
    }
}

impl SessionListener for PartialDocuments {
    fn on_session_end(&self, _event: SessionEvent) {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

/// Selecting an organization is the only place that triggers the dependent loads.
pub struct Workspace<A, O, P, W, D>
where
    A: AuthApi,
    O: ResourceService<Record = Organization, Filter = ()>,
    P: ProductApi<Filter = ProductFilter>,
    W: ResourceService<Record = Warehouse, Filter = WarehouseFilter, Update = WarehousePatch>,
    D: DocumentApi<Filter = DocumentFilter>,
{
    pub auth: Arc<AuthStore<A>>,
    pub organizations: Arc<ResourceStore<O>>,
    pub products: Arc<ResourceStore<P>>,
    pub warehouses: Arc<ResourceStore<W>>,
    pub documents: Arc<ResourceStore<D>>,
    bus: Arc<SessionBus>,
    partial: Arc<PartialDocuments>,
}

impl HttpWorkspace {
    pub fn connect(db: Arc<Mutex<Database>>, settings: &Settings) -> (Self, Arc<ApiClient>) {
        let bus = Arc::new(SessionBus::new());
        let credentials = Arc::new(CredentialStore::new(db, settings.use_keychain));
        let client = Arc::new(ApiClient::new(&settings.api_base_url, credentials.clone(), bus.clone()));
        tracing::info!(base_url = %client.base_url(), "api client ready");

        let workspace = Workspace::new(
            AuthStore::new(HttpAuth::new(client.clone()), credentials, bus.clone()),
            ResourceStore::new(HttpOrganizations::new(client.clone())),
            ResourceStore::new(HttpProducts::new(client.clone())),
            ResourceStore::new(HttpWarehouses::new(client.clone())),
            ResourceStore::new(HttpDocuments::new(client.clone())),
            bus,
        );
        (workspace, client)
    }
}

impl<A, O, P, W, D> Workspace<A, O, P, W, D>
where
    A: AuthApi,
    O: ResourceService<Record = Organization, Filter = ()>,
    P: ProductApi<Filter = ProductFilter>,
    W: ResourceService<Record = Warehouse, Filter = WarehouseFilter, Update = WarehousePatch>,
    D: DocumentApi<Filter = DocumentFilter>,
{
    pub fn new(
        auth: AuthStore<A>,
        organizations: ResourceStore<O>,
        products: ResourceStore<P>,
        warehouses: ResourceStore<W>,
        documents: ResourceStore<D>,
        bus: Arc<SessionBus>,
    ) -> Self {
        let workspace = Workspace {
            auth: Arc::new(auth),
            organizations: Arc::new(organizations),
            products: Arc::new(products),
            warehouses: Arc::new(warehouses),
            documents: Arc::new(documents),
            bus,
            partial: Arc::new(PartialDocuments::default()),
        };
        workspace.bus.subscribe(workspace.auth.clone());
        workspace.bus.subscribe(workspace.organizations.clone());
        workspace.bus.subscribe(workspace.products.clone());
        workspace.bus.subscribe(workspace.warehouses.clone());
        workspace.bus.subscribe(workspace.documents.clone());
        workspace.bus.subscribe(workspace.partial.clone());
        workspace
    }

    pub fn bus(&self) -> &Arc<SessionBus> {
        &self.bus
    }

    pub async fn initialize(&self) -> Option<User> {
        let user = self.auth.initialize()?;
        self.organizations.load(&()).await;
        Some(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> anyhow::Result<User> {
        let user = self.auth.login(email, password).await?;
        self.organizations.load(&()).await;
        Ok(user)
    }

    pub fn logout(&self) {
        self.auth.logout();
    }

    pub fn current_organization(&self) -> Option<Organization> {
        self.organizations.selected()
    }

    pub fn organization_options(&self) -> Vec<OrganizationOption> {
        organization_options(&self.organizations.records())
    }

    pub async fn select_organization(&self, id: Option<i64>) -> Option<Organization> {
        let selected = self.organizations.select_by_id(id);
        match selected.as_ref() {
            Some(org) => {
                tracing::info!(organization_id = org.id, "organization selected");
                let products = ProductFilter {
                    organization_id: Some(org.id),
                    ..ProductFilter::default()
                };
                let warehouses = WarehouseFilter {
                    organization_id: Some(org.id),
                    ..WarehouseFilter::default()
                };
                tokio::join!(
                    self.products.load(&products),
                    self.warehouses.load(&warehouses),
                    self.refresh_documents(),
                );
            }
            None => {
                self.products.clear();
                self.warehouses.clear();
                self.documents.clear();
            }
        }
        selected
    }

    pub async fn refresh_documents(&self) {
        let Some(org) = self.current_organization() else {
            return;
        };
        let filter = DocumentFilter {
            organization_id: Some(org.id),
            ..DocumentFilter::default()
        };
        self.documents.load(&filter).await;
    }

    pub fn dashboard(&self, today: NaiveDate) -> DashboardStats {
        dashboard_stats(
            &self.products.records(),
            &self.warehouses.records(),
            &self.documents.records(),
            today,
        )
    }

    pub fn document_list_view(&self, term: &str) -> DocumentListView {
        let organization = self.current_organization();
        document_list(
            organization.as_ref(),
            &self.documents.records(),
            term,
            &self.partial.ids(),
        )
    }

    pub fn new_wizard(&self) -> DocumentWizard {
        DocumentWizard::new(self.current_organization().map(|org| org.id))
    }

    pub fn record_completion(&self, report: &CompletionReport) {
        self.partial.mark(report.document.id, report.is_partial());
    }

    pub fn partially_created(&self) -> HashSet<i64> {
        self.partial.ids()
    }

    pub async fn toggle_warehouse_active(&self, id: i64) -> Result<Option<bool>, ApiError> {
        let Some(current) = self.warehouses.records().into_iter().find(|wh| wh.id == id) else {
            return Ok(None);
        };
        let patch = WarehousePatch {
            is_active: Some(!current.is_active),
            ..WarehousePatch::default()
        };
        self.warehouses.update(id, &patch).await?;
        Ok(Some(!current.is_active))
    }

    /// The list action on a draft: straight to in-progress. Returns false for non-drafts.
    pub async fn complete_draft(&self, id: i64) -> Result<bool, ApiError> {
        let is_draft = self
            .documents
            .records()
            .iter()
            .any(|doc| doc.id == id && doc.status == DocumentStatus::Draft);
        if !is_draft {
            return Ok(false);
        }
        self.documents.set_status(id, DocumentStatus::InProgress).await?;
        self.partial.mark(id, false);
        Ok(true)
    }
}
