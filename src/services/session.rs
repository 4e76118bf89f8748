use std::sync::{Arc, Mutex, PoisonError, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedOut,
    Expired,
}

pub trait SessionListener: Send + Sync {
    fn on_session_end(&self, event: SessionEvent);
}

/// Broadcasts session teardown to subscribed stores.
///
/// Listeners are held weakly so the bus never keeps a store alive.
#[derive(Default)]
pub struct SessionBus {
    listeners: Mutex<Vec<Weak<dyn SessionListener>>>,
}

impl SessionBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: Arc<dyn SessionListener>) {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        listeners.push(Arc::downgrade(&listener));
    }

    pub fn end_session(&self, event: SessionEvent) {
        let live: Vec<Arc<dyn SessionListener>> = {
            let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
            listeners.retain(|l| l.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };
        tracing::info!(?event, listeners = live.len(), "session ended");
        for listener in live {
            listener.on_session_end(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        let listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        listeners.iter().filter(|l| l.strong_count() > 0).count()
    }
}
