use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::types::EvaluationSettings;
use crate::state::AppState;
use crate::submissions::service::{
    reevaluate_all, submit, PublicSubmission, ReevaluationReport, SubmitResponse,
};
use crate::submissions::{FormRecord, FormStatus, NewForm, SubmissionRecord};

const MIN_TITLE_CHARS: usize = 3;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFormRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub publish: bool,
    #[serde(default)]
    pub evaluation: Option<EvaluationSettings>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: FormStatus,
}

#[derive(Serialize)]
pub struct FormDetailResponse {
    pub form: FormRecord,
    pub submissions: Vec<SubmissionRecord>,
}

/// POST /api/v1/forms
pub async fn handle_create_form(
    State(state): State<AppState>,
    Json(req): Json<CreateFormRequest>,
) -> Result<(StatusCode, Json<FormRecord>), AppError> {
    let title = req.title.trim().to_string();
    if title.chars().count() < MIN_TITLE_CHARS {
        return Err(AppError::Validation(format!(
            "title must be at least {MIN_TITLE_CHARS} characters"
        )));
    }
    if let Some(settings) = &req.evaluation {
        settings.validate().map_err(AppError::Validation)?;
    }

    let form = state
        .registry
        .create_form(NewForm {
            title,
            description: req.description,
            publish: req.publish,
            evaluation: req.evaluation,
        })
        .await;
    info!(form_id = %form.id, slug = %form.slug, status = ?form.status, "Form created");
    Ok((StatusCode::CREATED, Json(form)))
}

/// GET /api/v1/forms/:id
pub async fn handle_get_form(
    State(state): State<AppState>,
    Path(form_id): Path<Uuid>,
) -> Result<Json<FormDetailResponse>, AppError> {
    let form = state.registry.form(form_id).await?;
    let submissions = state.registry.submissions_for(form_id).await;
    Ok(Json(FormDetailResponse { form, submissions }))
}

/// PATCH /api/v1/forms/:id/status
pub async fn handle_set_status(
    State(state): State<AppState>,
    Path(form_id): Path<Uuid>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<FormRecord>, AppError> {
    let form = state.registry.set_status(form_id, req.status).await?;
    info!(form_id = %form.id, status = ?form.status, "Form status changed");
    Ok(Json(form))
}

/// POST /api/v1/forms/:id/reevaluate
pub async fn handle_reevaluate(
    State(state): State<AppState>,
    Path(form_id): Path<Uuid>,
) -> Result<Json<ReevaluationReport>, AppError> {
    let report = reevaluate_all(&state.registry, &state.evaluator, form_id).await?;
    Ok(Json(report))
}

/// POST /api/v1/public/forms/:slug/submissions
pub async fn handle_public_submit(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<PublicSubmission>,
) -> Result<(StatusCode, Json<SubmitResponse>), AppError> {
    let response = submit(&state.registry, &state.evaluator, &slug, req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// DELETE /api/v1/submissions/:id
pub async fn handle_delete_submission(
    State(state): State<AppState>,
    Path(submission_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.registry.remove_submission(submission_id).await?;
    info!(submission_id = %submission_id, "Submission removed");
    Ok(StatusCode::NO_CONTENT)
}
