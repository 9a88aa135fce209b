pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
    Router,
};

use crate::evaluation::handlers as evaluation;
use crate::state::AppState;
use crate::submissions::handlers as submissions;

/// Room for applicant details and answers alongside an uploaded résumé.
const SUBMISSION_FORM_ALLOWANCE: usize = 1024 * 1024;

/// Body limit for public submissions: a base64 résumé at the extractor's size cap
/// (4 encoded bytes per 3 raw) plus the rest of the form.
fn public_submission_limit(resume_max_bytes: usize) -> usize {
    resume_max_bytes.div_ceil(3) * 4 + SUBMISSION_FORM_ALLOWANCE
}

pub fn build_router(state: AppState) -> Router {
    let submission_limit = public_submission_limit(state.evaluator.resumes().max_bytes());

    Router::new()
        .route("/health", get(health::health_handler))
        // Evaluation API
        .route("/api/v1/evaluations", post(evaluation::handle_evaluate))
        // Form owner API
        .route("/api/v1/forms", post(submissions::handle_create_form))
        .route("/api/v1/forms/:id", get(submissions::handle_get_form))
        .route(
            "/api/v1/forms/:id/status",
            patch(submissions::handle_set_status),
        )
        .route(
            "/api/v1/forms/:id/reevaluate",
            post(submissions::handle_reevaluate),
        )
        .route(
            "/api/v1/submissions/:id",
            delete(submissions::handle_delete_submission),
        )
        // Public API
        .route(
            "/api/v1/public/forms/:slug/submissions",
            post(submissions::handle_public_submit)
                .layer(DefaultBodyLimit::max(submission_limit)),
        )
        .with_state(state)
}
