//! Report routes.
//!
//! Reports render as JSON workbooks by default. `format=csv` returns one
//! sheet as `text/csv`; `sheet` picks it, otherwise the first sheet is used.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use warden_core::EngineError;
use warden_core::reports::{ReportFilter, ReportKey};

use crate::{AppState, error::ApiResult, middleware::Actor};

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/reports/{report_key}", get(get_report))
}

/// Query parameters for a report.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// First day included.
    pub from: Option<NaiveDate>,
    /// Last day included.
    pub to: Option<NaiveDate>,
    /// Limit to one occupant.
    pub occupant_id: Option<Uuid>,
    /// `json` (default) or `csv`.
    pub format: Option<String>,
    /// Sheet to render when the format is CSV.
    pub sheet: Option<String>,
}

async fn get_report(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(report_key): Path<String>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Response> {
    let key = ReportKey::parse(&report_key)?;
    let filter = ReportFilter {
        from: query.from,
        to: query.to,
        occupant_id: query.occupant_id.map(Into::into),
    };

    let csv = match query.format.as_deref() {
        None | Some("json") => false,
        Some("csv") => true,
        Some(other) => {
            return Err(EngineError::invalid(format!("unsupported report format: {other}")).into());
        }
    };

    let workbook = state.engine.generate_report(&actor, key, filter).await?;
    if !csv {
        return Ok(Json(workbook).into_response());
    }

    let sheet = match query.sheet.as_deref() {
        Some(name) => workbook.sheet(name)?,
        None => workbook
            .sheets
            .first()
            .ok_or_else(|| EngineError::not_found("sheet"))?,
    };
    let body = sheet.to_csv()?;
    let disposition = format!("attachment; filename=\"{}-{}.csv\"", key, sheet.name.to_lowercase());
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
