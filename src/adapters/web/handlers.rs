//! HTTP request handlers for web adapter.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::calculator::{self, DerivedFields};
use crate::domain::export::{self as exporter, EXPORT_FILENAME};
use crate::domain::form::RecordForm;
use crate::domain::record::{Dataset, PairData};

use super::{AppState, WebError};

#[derive(Debug, Default, Deserialize)]
pub struct AdminQuery {
    pub auth: Option<String>,
    #[serde(default)]
    pub auto_calc: bool,
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize)]
pub struct PairSummary {
    pub pair: String,
    pub records: usize,
    pub latest: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub mode: &'static str,
    pub revision: u64,
    pub pairs: Vec<PairSummary>,
}

fn summarize(dataset: &Dataset) -> Vec<PairSummary> {
    dataset
        .pairs()
        .iter()
        .map(|p| PairSummary {
            pair: p.pair.clone(),
            records: p.data.len(),
            latest: p.data.first().map(|r| r.date.clone()),
        })
        .collect()
}

pub async fn public_view(State(state): State<Arc<AppState>>) -> Result<Json<ViewResponse>, WebError> {
    let store = state.lock_store()?;
    Ok(Json(ViewResponse {
        mode: "public",
        revision: store.revision(),
        pairs: summarize(store.dataset()),
    }))
}

pub async fn list_pairs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PairSummary>>, WebError> {
    let store = state.lock_store()?;
    Ok(Json(summarize(store.dataset())))
}

pub async fn get_pair(
    State(state): State<Arc<AppState>>,
    Path(pair): Path<String>,
) -> Result<Json<PairData>, WebError> {
    let store = state.lock_store()?;
    store
        .dataset()
        .pair(&pair)
        .cloned()
        .map(Json)
        .ok_or_else(|| WebError::not_found(format!("unknown pair: {pair}")))
}

pub async fn admin_view(
    State(state): State<Arc<AppState>>,
    Query(q): Query<AdminQuery>,
) -> Result<Json<ViewResponse>, WebError> {
    state.require_admin(q.auth.as_deref())?;
    let store = state.lock_store()?;
    Ok(Json(ViewResponse {
        mode: "admin",
        revision: store.revision(),
        pairs: summarize(store.dataset()),
    }))
}

#[derive(Debug, Deserialize)]
pub struct NewPair {
    pub name: String,
}

pub async fn add_pair(
    State(state): State<Arc<AppState>>,
    Query(q): Query<AdminQuery>,
    Json(body): Json<NewPair>,
) -> Result<Response, WebError> {
    state.require_admin(q.auth.as_deref())?;
    let pair = state.lock_store()?.add_pair(&body.name)?;
    log::info!("pair {pair} added via web");
    Ok((StatusCode::CREATED, Json(PairData::new(pair))).into_response())
}

#[derive(Debug, Serialize)]
pub struct SavedRecord {
    pub id: String,
    pub pair: PairData,
}

pub async fn save_record(
    State(state): State<Arc<AppState>>,
    Path(pair): Path<String>,
    Query(q): Query<AdminQuery>,
    Form(mut form): Form<RecordForm>,
) -> Result<Json<SavedRecord>, WebError> {
    state.require_admin(q.auth.as_deref())?;
    if q.auto_calc {
        form.auto_calculate();
    }

    let mut store = state.lock_store()?;
    let id = store.upsert_record(&pair, form.to_record())?;
    let saved = store
        .dataset()
        .pair(&pair)
        .cloned()
        .ok_or_else(|| WebError::internal("pair vanished after save"))?;
    Ok(Json(SavedRecord { id, pair: saved }))
}

#[derive(Debug, Serialize)]
pub struct DeleteOutcome {
    pub deleted: bool,
}

/// Deletion needs `confirm=true`; without it nothing changes.
pub async fn delete_record(
    State(state): State<Arc<AppState>>,
    Path((pair, id)): Path<(String, String)>,
    Query(q): Query<AdminQuery>,
) -> Result<Json<DeleteOutcome>, WebError> {
    state.require_admin(q.auth.as_deref())?;
    if !q.confirm {
        return Err(WebError::bad_request(
            "deletion not confirmed (add confirm=true)",
        ));
    }
    let deleted = state.lock_store()?.delete_record(&pair, &id)?;
    Ok(Json(DeleteOutcome { deleted }))
}

#[derive(Debug, Deserialize)]
pub struct CalcRequest {
    pub longs: u64,
    pub shorts: u64,
}

pub async fn calculate(
    State(state): State<Arc<AppState>>,
    Query(q): Query<AdminQuery>,
    Json(body): Json<CalcRequest>,
) -> Result<Json<DerivedFields>, WebError> {
    state.require_admin(q.auth.as_deref())?;
    Ok(Json(calculator::calculate(body.longs, body.shorts)))
}

/// The interchange document as a `data.json` attachment.
pub async fn export(
    State(state): State<Arc<AppState>>,
    Query(q): Query<AdminQuery>,
) -> Result<Response, WebError> {
    state.require_admin(q.auth.as_deref())?;
    let document = exporter::to_document(state.lock_store()?.dataset())?;
    let disposition = format!("attachment; filename=\"{EXPORT_FILENAME}\"");
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document,
    )
        .into_response())
}

pub async fn not_found() -> WebError {
    WebError::not_found("no such route")
}
