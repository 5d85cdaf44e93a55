use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{EligibilityCriteria, SelectionRequest};
use super::form::DocumentRenderer;
use super::service::{SchoolSelectionService, SelectionError, NO_MATCH_MESSAGE};

/// Payload for validation: criteria are resent since requests are stateless.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRequest {
    pub criteria: EligibilityCriteria,
    pub selection: SelectionRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormRequest {
    pub student_name: String,
    pub criteria: EligibilityCriteria,
    pub selection: SelectionRequest,
}

/// Router builder exposing the filter, validation and form endpoints.
pub fn selection_router<D>(service: Arc<SchoolSelectionService<D>>) -> Router
where
    D: DocumentRenderer + 'static,
{
    Router::new()
        .route("/api/v1/regions", get(regions_handler::<D>))
        .route("/api/v1/schools/:code", get(school_handler::<D>))
        .route("/api/v1/schools/candidates", post(candidates_handler::<D>))
        .route("/api/v1/selection/validate", post(validate_handler::<D>))
        .route("/api/v1/selection/form", post(form_handler::<D>))
        .with_state(service)
}

pub(crate) async fn regions_handler<D>(
    State(service): State<Arc<SchoolSelectionService<D>>>,
) -> Response
where
    D: DocumentRenderer + 'static,
{
    let regions = service.regions();
    (StatusCode::OK, axum::Json(json!({ "regions": regions }))).into_response()
}

pub(crate) async fn school_handler<D>(
    State(service): State<Arc<SchoolSelectionService<D>>>,
    Path(code): Path<String>,
) -> Response
where
    D: DocumentRenderer + 'static,
{
    match service.school(&code) {
        Some(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        None => {
            let payload = json!({
                "error": format!("unknown school code {}", code.trim()),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn candidates_handler<D>(
    State(service): State<Arc<SchoolSelectionService<D>>>,
    axum::Json(criteria): axum::Json<EligibilityCriteria>,
) -> Response
where
    D: DocumentRenderer + 'static,
{
    match service.candidates(&criteria) {
        Ok(candidates) if candidates.is_empty() => {
            let payload = json!({
                "status": "no_match",
                "message": NO_MATCH_MESSAGE,
                "schools": [],
                "appendix_pool": [],
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Ok(candidates) => {
            let payload = json!({
                "status": "matched",
                "message": format!("{} schools match your criteria", candidates.schools.len()),
                "schools": candidates.schools,
                "appendix_pool": candidates.appendix_pool,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn validate_handler<D>(
    State(service): State<Arc<SchoolSelectionService<D>>>,
    axum::Json(request): axum::Json<ValidationRequest>,
) -> Response
where
    D: DocumentRenderer + 'static,
{
    match service.validate(&request.criteria, &request.selection) {
        Ok(bundle) => {
            let payload = json!({
                "valid": true,
                "main": bundle.main(),
                "alternates": bundle.alternates(),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => {
            let status = status_for(&error);
            let payload = json!({
                "valid": false,
                "reason": error.reason_code(),
                "error": error.to_string(),
            });
            (status, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn form_handler<D>(
    State(service): State<Arc<SchoolSelectionService<D>>>,
    axum::Json(request): axum::Json<FormRequest>,
) -> Response
where
    D: DocumentRenderer + 'static,
{
    match service.form(&request.student_name, &request.criteria, &request.selection) {
        Ok(document) => {
            let disposition = format!("attachment; filename=\"{}\"", document.file_name);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, document.content_type.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                document.bytes,
            )
                .into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) fn status_for(error: &SelectionError) -> StatusCode {
    match error {
        SelectionError::Criteria(_)
        | SelectionError::UnknownSchool { .. }
        | SelectionError::DuplicateChoice { .. } => StatusCode::BAD_REQUEST,
        SelectionError::Incomplete(_) | SelectionError::Guideline(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        SelectionError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: SelectionError) -> Response {
    let payload = json!({
        "reason": error.reason_code(),
        "error": error.to_string(),
    });
    (status_for(&error), axum::Json(payload)).into_response()
}
