//! Ledger entry routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;
use warden_core::ledger::{EntryFilter, EntryType, RecordEntryInput};
use warden_shared::types::PageRequest;

use crate::{AppState, error::ApiResult, middleware::Actor};

/// Creates the ledger routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ledger/entries", get(list_entries).post(record_transaction))
        .route("/ledger/entries/{entry_id}/void", post(void_entry))
        .route("/ledger/entries/{entry_id}/receipt", get(preview_receipt))
}

// ============================================================================
// Request Types
// ============================================================================

/// Body for recording a charge or payment.
///
/// `category` accepts canonical ledger names and their aliases.
#[derive(Debug, Deserialize)]
pub struct RecordEntryRequest {
    /// Occupant to post against.
    pub occupant_id: Uuid,
    /// Ledger name.
    pub category: String,
    /// Charge or payment.
    pub entry_type: EntryType,
    /// Amount in pesos.
    pub amount: Decimal,
    /// Optional note.
    pub note: Option<String>,
    /// Optional payment method.
    pub method: Option<String>,
    /// Linked event.
    pub event_id: Option<Uuid>,
    /// Linked fine.
    pub fine_id: Option<Uuid>,
    /// Optional metadata object.
    pub metadata: Option<Value>,
}

/// Query parameters for listing entries.
#[derive(Debug, Default, Deserialize)]
pub struct ListEntriesQuery {
    /// Only this occupant.
    pub occupant_id: Option<Uuid>,
    /// Only this term.
    pub term_id: Option<Uuid>,
    /// Ledger name or alias.
    pub category: Option<String>,
    /// Charges or payments.
    pub entry_type: Option<EntryType>,
    /// First day included.
    pub from: Option<NaiveDate>,
    /// Last day included.
    pub to: Option<NaiveDate>,
    /// Only entries linked to this fine.
    pub fine_id: Option<Uuid>,
    /// Only entries linked to this event.
    pub event_id: Option<Uuid>,
    /// Include voided entries.
    #[serde(default)]
    pub include_voided: bool,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

/// Body carrying a mandatory reason.
#[derive(Debug, Deserialize)]
pub struct ReasonRequest {
    /// Why the action is taken.
    #[serde(default)]
    pub reason: String,
}

// ============================================================================
// Handlers
// ============================================================================

async fn record_transaction(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Json(req): Json<RecordEntryRequest>,
) -> ApiResult<impl IntoResponse> {
    let category = state.engine.categories().normalize(&req.category)?;
    let input = RecordEntryInput {
        occupant_id: req.occupant_id.into(),
        category,
        entry_type: req.entry_type,
        amount: req.amount,
        note: req.note,
        method: req.method,
        event_id: req.event_id.map(Into::into),
        fine_id: req.fine_id.map(Into::into),
        metadata: req.metadata,
    };
    let entry = state.engine.record_transaction(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn list_entries(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Query(query): Query<ListEntriesQuery>,
) -> ApiResult<impl IntoResponse> {
    let category = query
        .category
        .as_deref()
        .map(|name| state.engine.categories().normalize(name))
        .transpose()?;
    let filter = EntryFilter {
        occupant_id: query.occupant_id.map(Into::into),
        term_id: query.term_id.map(Into::into),
        category,
        entry_type: query.entry_type,
        from: query.from,
        to: query.to,
        fine_id: query.fine_id.map(Into::into),
        event_id: query.event_id.map(Into::into),
        include_voided: query.include_voided,
    };
    let defaults = PageRequest::default();
    let page = PageRequest::new(
        query.page.unwrap_or(defaults.page),
        query.per_page.unwrap_or(defaults.per_page),
    );

    let entries = state.engine.list_entries(&actor, &filter, page).await?;
    Ok(Json(entries))
}

async fn void_entry(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(entry_id): Path<Uuid>,
    Json(req): Json<ReasonRequest>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state
        .engine
        .void_entry(&actor, entry_id.into(), &req.reason)
        .await?;
    Ok(Json(outcome))
}

/// Drafts a receipt for a payment. Nothing is sent.
async fn preview_receipt(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(entry_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let draft = state.engine.preview_receipt(&actor, entry_id.into()).await?;
    Ok(Json(draft))
}
