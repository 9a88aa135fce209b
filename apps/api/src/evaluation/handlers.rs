use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::evaluation::types::{EvaluationOutput, SubmissionInput};
use crate::state::AppState;

/// POST /api/v1/evaluations
/// Scores an ad-hoc submission without storing it.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Json(input): Json<SubmissionInput>,
) -> Result<Json<EvaluationOutput>, AppError> {
    if input.applicant_name.trim().is_empty() {
        return Err(AppError::Validation("applicantName is required".to_string()));
    }
    if input.form_title.trim().is_empty() {
        return Err(AppError::Validation("formTitle is required".to_string()));
    }
    if let Some(settings) = &input.evaluation_settings {
        settings.validate().map_err(AppError::Validation)?;
    }

    Ok(Json(state.evaluator.evaluate(&input).await))
}
