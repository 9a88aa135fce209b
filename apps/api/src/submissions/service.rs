//! Submission workflows: public submit and batch re-evaluation.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::types::SubmissionInput;
use crate::evaluation::Evaluator;
use crate::submissions::{NewSubmission, SubmissionRegistry};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ResumeFile {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub base64: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSubmission {
    pub applicant_name: String,
    #[serde(default)]
    pub applicant_email: Option<String>,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub resume_file: Option<ResumeFile>,
    #[serde(default)]
    pub answers: Map<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub submission_id: Uuid,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReevaluationFailure {
    pub submission_id: Uuid,
    pub message: String,
}

/// Outcome of re-scoring every submission of a form.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReevaluationReport {
    pub updated_count: usize,
    pub failures: Vec<ReevaluationFailure>,
}

// ────────────────────────────────────────────────────────────────────────────
// Workflows
// ────────────────────────────────────────────────────────────────────────────

/// Stores a public submission for an active form, evaluates it, and stores the evaluation.
pub async fn submit(
    registry: &SubmissionRegistry,
    evaluator: &Evaluator,
    form_slug: &str,
    request: PublicSubmission,
) -> Result<SubmitResponse, AppError> {
    validate_submission(&request)?;

    let form = registry.active_form_by_slug(form_slug).await?;

    let mut resume_text = None;
    if let Some(file) = &request.resume_file {
        info!(file_name = %file.name, mime_type = %file.mime_type, "Parsing uploaded résumé");
        resume_text = evaluator
            .resumes()
            .extract_from_base64(&file.base64)
            .await
            .usable_text();
    }

    let applicant_name = request.applicant_name.trim().to_string();
    let submission = registry
        .add_submission(
            form.id,
            NewSubmission {
                applicant_name: applicant_name.clone(),
                applicant_email: request.applicant_email,
                resume_url: request.resume_url.clone(),
                resume_text: resume_text.clone(),
                answers: request.answers.clone(),
            },
        )
        .await?;

    let output = evaluator
        .evaluate(&SubmissionInput {
            applicant_name,
            answers: request.answers,
            resume_url: request.resume_url,
            resume_text,
            form_title: form.title.clone(),
            evaluation_settings: form.evaluation.clone(),
        })
        .await;

    info!(
        submission_id = %submission.id,
        form = %form.slug,
        score = output.score,
        source = ?output.source,
        "Submission evaluated"
    );
    registry.record_evaluation(submission.id, output).await?;

    Ok(SubmitResponse {
        submission_id: submission.id,
        message: "Your application was received successfully.".to_string(),
    })
}

/// Re-scores every submission of a form, one at a time.
///
/// A submission whose evaluation cannot be stored is reported in `failures` and the
/// batch moves on to the next one.
pub async fn reevaluate_all(
    registry: &SubmissionRegistry,
    evaluator: &Evaluator,
    form_id: Uuid,
) -> Result<ReevaluationReport, AppError> {
    let form = registry.form(form_id).await?;
    let submissions = registry.submissions_for(form_id).await;

    let mut report = ReevaluationReport {
        updated_count: 0,
        failures: Vec::new(),
    };

    for submission in submissions {
        let output = evaluator
            .evaluate(&SubmissionInput {
                applicant_name: submission.applicant_name.clone(),
                answers: submission.answers.clone(),
                resume_url: submission.resume_url.clone(),
                resume_text: submission.known_resume_text(),
                form_title: form.title.clone(),
                evaluation_settings: form.evaluation.clone(),
            })
            .await;

        match registry.record_evaluation(submission.id, output).await {
            Ok(_) => report.updated_count += 1,
            Err(e) => {
                warn!(submission_id = %submission.id, error = %e, "Re-evaluation could not be stored");
                report.failures.push(ReevaluationFailure {
                    submission_id: submission.id,
                    message: e.to_string(),
                });
            }
        }
    }

    info!(
        form_id = %form_id,
        updated = report.updated_count,
        failed = report.failures.len(),
        "Batch re-evaluation finished"
    );
    Ok(report)
}

fn validate_submission(request: &PublicSubmission) -> Result<(), AppError> {
    if request.applicant_name.trim().chars().count() < 2 {
        return Err(AppError::Validation(
            "applicantName must be at least 2 characters".to_string(),
        ));
    }
    if let Some(email) = &request.applicant_email {
        if !is_plausible_email(email) {
            return Err(AppError::Validation("applicantEmail is not a valid e-mail address".to_string()));
        }
    }
    if let Some(url) = &request.resume_url {
        Url::parse(url)
            .map_err(|e| AppError::Validation(format!("resumeUrl is not a valid URL: {e}")))?;
    }
    for (key, value) in &request.answers {
        let allowed = match value {
            Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => true,
            Value::Array(items) => items.iter().all(Value::is_string),
            Value::Object(_) => false,
        };
        if !allowed {
            return Err(AppError::Validation(format!(
                "answer '{key}' must be a string, number, boolean, list of strings, or null"
            )));
        }
    }
    Ok(())
}

/// One `@`, a non-empty local part, and a dotted domain with no empty labels.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.trim().split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}
