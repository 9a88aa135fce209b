use crate::evaluation::Evaluator;
use crate::submissions::SubmissionRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Scores submissions. Runs without a model when no API key is configured.
    pub evaluator: Evaluator,
    pub registry: SubmissionRegistry,
}
