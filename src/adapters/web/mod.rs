//! Web server adapter.
//!
//! JSON-over-HTTP surface for the two views: public read-only routes, and
//! admin routes behind the placeholder `?auth=` gate.

mod error;
mod handlers;

pub use error::WebError;
pub use handlers::*;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::gate::{AccessGate, ViewMode};
use crate::domain::record::Dataset;
use crate::domain::store::Store;

/// One session's state. Requests are applied one at a time through the lock.
pub struct AppState {
    pub store: Mutex<Store>,
    pub gate: AccessGate,
}

impl AppState {
    pub fn new(dataset: Dataset, gate: AccessGate) -> Self {
        Self {
            store: Mutex::new(Store::new(dataset)),
            gate,
        }
    }

    fn lock_store(&self) -> Result<MutexGuard<'_, Store>, WebError> {
        self.store
            .lock()
            .map_err(|_| WebError::internal("store lock poisoned"))
    }

    fn require_admin(&self, auth: Option<&str>) -> Result<(), WebError> {
        match self.gate.view_mode(auth) {
            ViewMode::Admin => Ok(()),
            ViewMode::Public => Err(WebError::gate_closed()),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::public_view))
        .route("/api/pairs", get(handlers::list_pairs))
        .route("/api/pairs/{pair}", get(handlers::get_pair))
        .route("/admin", get(handlers::admin_view))
        .route("/admin/pairs", post(handlers::add_pair))
        .route("/admin/pairs/{pair}/records", put(handlers::save_record))
        .route(
            "/admin/pairs/{pair}/records/{id}",
            delete(handlers::delete_record),
        )
        .route("/admin/calc", post(handlers::calculate))
        .route("/admin/export", get(handlers::export))
        .fallback(handlers::not_found)
        .with_state(Arc::new(state))
}
