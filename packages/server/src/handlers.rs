//! HTTP handler functions for the gradesheet API.

use actix_web::{HttpResponse, web};
use gradesheet_extract::extract_result;
use gradesheet_server_models::{
    ApiError, ApiHealth, ApiNotFound, GetResultRequest, SemestersResponse,
};

use crate::AppState;

/// `GET /health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /get_semesters`
///
/// Lists the configured semester labels in registry order.
pub async fn get_semesters(state: web::Data<AppState>) -> HttpResponse {
    let semesters: Vec<String> = state
        .registry
        .labels()
        .into_iter()
        .map(str::to_owned)
        .collect();
    HttpResponse::Ok().json(SemestersResponse { semesters })
}

/// `POST /get_result`
///
/// Downloads the requested semester's gradesheet and returns the row for
/// the given roll number as an ordered JSON object.
pub async fn get_result(
    state: web::Data<AppState>,
    body: web::Json<GetResultRequest>,
) -> HttpResponse {
    let (Some(roll_no), Some(semester)) = (
        body.roll_no.as_deref().filter(|s| !s.is_empty()),
        body.semester.as_deref().filter(|s| !s.is_empty()),
    ) else {
        return bad_request("Roll number and semester are required");
    };

    let Some(source) = state.registry.get(semester) else {
        return bad_request("Invalid semester selected");
    };

    let document = match state.fetcher.fetch(&source.url).await {
        Ok(bytes) => bytes,
        Err(e) => {
            log::error!(
                "Failed to fetch {semester} gradesheet from {}: {e}",
                source.url
            );
            return fetch_failed();
        }
    };

    match extract_result(&document, roll_no, &source.table, state.duplicate_policy) {
        Ok(Some(record)) => HttpResponse::Ok().json(record),
        Ok(None) => HttpResponse::NotFound().json(ApiNotFound {
            message: format!("Roll No. {roll_no} not found in {semester}"),
        }),
        Err(e) => {
            log::error!("Failed to process {semester} gradesheet: {e}");
            processing_failed()
        }
    }
}

/// 400 with the contract's error payload.
fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiError {
        error: message.to_owned(),
    })
}

/// 500 for a download failure. The cause is logged, not echoed.
fn fetch_failed() -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiError {
        error: "Failed to fetch PDF from Google Drive".to_owned(),
    })
}

/// 500 for any parse/normalize/lookup failure. The cause is logged, not
/// echoed.
fn processing_failed() -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiError {
        error: "Failed to process PDF".to_owned(),
    })
}
