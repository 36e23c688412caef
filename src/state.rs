use std::{ops::Deref, sync::Arc};

use crate::store::BookStore;

/// Shared application state, cheap to clone.
///
/// The store is handed in at construction instead of living in a process-wide
/// global, so tests can build an isolated state per request.
#[derive(Clone)]
pub struct ApiState {
    inner: Arc<ApiStateInner>,
}

impl ApiState {
    pub fn new(store: BookStore) -> Self {
        Self {
            inner: Arc::new(ApiStateInner { store }),
        }
    }
}

impl Deref for ApiState {
    type Target = ApiStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

pub struct ApiStateInner {
    store: BookStore,
}

impl ApiStateInner {
    pub fn store(&self) -> &BookStore {
        &self.store
    }
}
