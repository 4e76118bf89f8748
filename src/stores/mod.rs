//! Per-resource state containers.
//!
//! Every container is a [`ResourceStore`] over some [`ResourceService`]: the last fetched
//! collection, an optional selection, a loading flag and the last error message. Loads swallow
//! failures into `error`; create/update/delete record the message and hand the error back.

pub mod auth;
pub mod documents;
pub mod products;

use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::ApiError;
use crate::models::{Document, Organization, Patch, Product, Record, Warehouse};
use crate::services::session::{SessionEvent, SessionListener};
use crate::services::ResourceService;

#[derive(Debug, Clone, Copy)]
pub struct ErrorMessages {
    pub load: &'static str,
    pub create: &'static str,
    pub update: &'static str,
    pub delete: &'static str,
}

pub trait DefaultMessages {
    const MESSAGES: ErrorMessages;
}

impl DefaultMessages for Organization {
    const MESSAGES: ErrorMessages = ErrorMessages {
        load: "Ошибка загрузки организаций",
        create: "Ошибка создания организации",
        update: "Ошибка обновления организации",
        delete: "Ошибка удаления организации",
    };
}

impl DefaultMessages for Product {
    const MESSAGES: ErrorMessages = ErrorMessages {
        load: "Ошибка загрузки товаров",
        create: "Ошибка создания товара",
        update: "Ошибка обновления товара",
        delete: "Ошибка удаления товара",
    };
}

impl DefaultMessages for Warehouse {
    const MESSAGES: ErrorMessages = ErrorMessages {
        load: "Ошибка загрузки складов",
        create: "Ошибка создания склада",
        update: "Ошибка обновления склада",
        delete: "Ошибка удаления склада",
    };
}

impl DefaultMessages for Document {
    const MESSAGES: ErrorMessages = ErrorMessages {
        load: "Ошибка загрузки документов",
        create: "Ошибка создания документа",
        update: "Ошибка обновления документа",
        delete: "Ошибка удаления документа",
    };
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreSnapshot<R> {
    pub records: Vec<R>,
    pub selected: Option<R>,
    pub loading: bool,
    pub error: Option<String>,
}

pub(crate) struct StoreState<R> {
    pub(crate) records: Vec<R>,
    pub(crate) selected: Option<R>,
    pub(crate) loading: bool,
    pub(crate) error: Option<String>,
    load_ticket: u64,
    detail_ticket: u64,
    epoch: u64,
}

impl<R> Default for StoreState<R> {
    fn default() -> Self {
        StoreState {
            records: Vec::new(),
            selected: None,
            loading: false,
            error: None,
            load_ticket: 0,
            detail_ticket: 0,
            epoch: 0,
        }
    }
}

/// Token taken when an operation starts; results are applied only while it is still current.
/// Collection loads and detail loads each supersede their own earlier runs.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Ticket {
    load: Option<u64>,
    detail: Option<u64>,
    epoch: u64,
    busy: bool,
}

pub struct ResourceStore<S: ResourceService> {
    service: S,
    state: Mutex<StoreState<S::Record>>,
}

impl<S: ResourceService> ResourceStore<S> {
    pub fn new(service: S) -> Self {
        ResourceStore {
            service,
            state: Mutex::new(StoreState::default()),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn snapshot(&self) -> StoreSnapshot<S::Record> {
        let state = self.lock();
        StoreSnapshot {
            records: state.records.clone(),
            selected: state.selected.clone(),
            loading: state.loading,
            error: state.error.clone(),
        }
    }

    pub fn records(&self) -> Vec<S::Record> {
        self.lock().records.clone()
    }

    pub fn selected(&self) -> Option<S::Record> {
        self.lock().selected.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn select(&self, record: Option<S::Record>) {
        self.lock().selected = record;
    }

    pub fn select_by_id(&self, id: Option<i64>) -> Option<S::Record> {
        let mut state = self.lock();
        let found = id.and_then(|id| state.records.iter().find(|r| r.id() == id).cloned());
        state.selected = found.clone();
        found
    }

    pub fn clear_error(&self) {
        self.lock().error = None;
    }

    /// Back to the empty initial state. In-flight results started before this are dropped.
    pub fn clear(&self) {
        let mut state = self.lock();
        let load_ticket = state.load_ticket + 1;
        let detail_ticket = state.detail_ticket + 1;
        let epoch = state.epoch + 1;
        *state = StoreState {
            load_ticket,
            detail_ticket,
            epoch,
            ..StoreState::default()
        };
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, StoreState<S::Record>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn begin_load(&self) -> Ticket {
        let mut state = self.lock();
        state.load_ticket += 1;
        state.loading = true;
        state.error = None;
        Ticket {
            load: Some(state.load_ticket),
            detail: None,
            epoch: state.epoch,
            busy: true,
        }
    }

    pub(crate) fn begin_detail(&self) -> Ticket {
        let mut state = self.lock();
        state.detail_ticket += 1;
        state.loading = true;
        state.error = None;
        Ticket {
            load: None,
            detail: Some(state.detail_ticket),
            epoch: state.epoch,
            busy: true,
        }
    }

    pub(crate) fn begin_write(&self) -> Ticket {
        let mut state = self.lock();
        state.loading = true;
        state.error = None;
        Ticket {
            load: None,
            detail: None,
            epoch: state.epoch,
            busy: true,
        }
    }

    pub(crate) fn begin_lookup(&self) -> Ticket {
        Ticket {
            load: None,
            detail: None,
            epoch: self.lock().epoch,
            busy: false,
        }
    }

    pub(crate) fn settle<F>(&self, ticket: Ticket, apply: F) -> bool
    where
        F: FnOnce(&mut StoreState<S::Record>),
    {
        let mut state = self.lock();
        let current = state.epoch == ticket.epoch
            && ticket.load.map_or(true, |load| load == state.load_ticket)
            && ticket.detail.map_or(true, |detail| detail == state.detail_ticket);
        if !current {
            tracing::debug!(
                ticket = ?ticket,
                latest = state.load_ticket,
                "discarding stale response"
            );
            return false;
        }
        apply(&mut state);
        if ticket.busy {
            state.loading = false;
        }
        true
    }

    pub(crate) fn record_failure(&self, ticket: Ticket, err: &ApiError, fallback: &str) {
        let message = err.user_message(fallback);
        tracing::warn!("{}: {}", fallback, err);
        self.settle(ticket, |state| state.error = Some(message));
    }
}

impl<S> ResourceStore<S>
where
    S: ResourceService,
    S::Record: DefaultMessages,
{
    pub async fn load(&self, filter: &S::Filter) {
        let ticket = self.begin_load();
        match self.service.list(filter).await {
            Ok(records) => {
                self.settle(ticket, |state| state.records = records);
            }
            Err(err) => self.record_failure(ticket, &err, S::Record::MESSAGES.load),
        }
    }

    pub async fn create(&self, payload: &S::Create) -> Result<S::Record, ApiError> {
        let ticket = self.begin_write();
        match self.service.create(payload).await {
            Ok(record) => {
                let appended = record.clone();
                self.settle(ticket, |state| state.records.push(appended));
                Ok(record)
            }
            Err(err) => {
                self.record_failure(ticket, &err, S::Record::MESSAGES.create);
                Err(err)
            }
        }
    }

    pub async fn update(&self, id: i64, patch: &S::Update) -> Result<(), ApiError> {
        let ticket = self.begin_write();
        match self.service.update(id, patch).await {
            Ok(()) => {
                self.settle(ticket, |state| {
                    if let Some(record) = state.records.iter_mut().find(|r| r.id() == id) {
                        patch.apply(record);
                    }
                    if let Some(selected) = state.selected.as_mut().filter(|r| r.id() == id) {
                        patch.apply(selected);
                    }
                });
                Ok(())
            }
            Err(err) => {
                self.record_failure(ticket, &err, S::Record::MESSAGES.update);
                Err(err)
            }
        }
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let ticket = self.begin_write();
        match self.service.delete(id).await {
            Ok(()) => {
                self.settle(ticket, |state| {
                    state.records.retain(|r| r.id() != id);
                    if state.selected.as_ref().map(|r| r.id()) == Some(id) {
                        state.selected = None;
                    }
                });
                Ok(())
            }
            Err(err) => {
                self.record_failure(ticket, &err, S::Record::MESSAGES.delete);
                Err(err)
            }
        }
    }
}

impl<S: ResourceService> SessionListener for ResourceStore<S> {
    fn on_session_end(&self, _event: SessionEvent) {
        self.clear();
    }
}
