//! Submission registry: forms, their submissions, and the latest evaluation of each.
//!
//! In-process storage shared by all handlers. Each submission keeps at most one evaluation;
//! re-evaluating replaces it.

pub mod handlers;
pub mod service;
pub mod slug;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::evaluation::types::{EvaluationOutput, EvaluationSettings};
use crate::submissions::slug::{slugify, unique_slug};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Form {0} not found")]
    FormNotFound(String),

    #[error("Form {0} is not accepting submissions")]
    FormInactive(String),

    #[error("Submission {0} not found")]
    SubmissionNotFound(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FormStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRecord {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub status: FormStatus,
    pub evaluation: Option<EvaluationSettings>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRecord {
    #[serde(flatten)]
    pub output: EvaluationOutput,
    pub evaluated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub id: Uuid,
    pub form_id: Uuid,
    pub applicant_name: String,
    pub applicant_email: Option<String>,
    pub resume_url: Option<String>,
    /// Text extracted from an uploaded résumé, kept so re-evaluation can reuse it.
    #[serde(skip_serializing)]
    pub resume_text: Option<String>,
    pub answers: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub evaluation: Option<EvaluationRecord>,
}

impl SubmissionRecord {
    /// Résumé text to feed back into the pipeline: the uploaded text, else whatever the
    /// previous evaluation extracted.
    pub fn known_resume_text(&self) -> Option<String> {
        self.resume_text.clone().or_else(|| {
            self.evaluation
                .as_ref()
                .and_then(|e| e.output.metadata.resume_text.clone())
        })
    }
}

pub struct NewForm {
    pub title: String,
    pub description: Option<String>,
    pub publish: bool,
    pub evaluation: Option<EvaluationSettings>,
}

pub struct NewSubmission {
    pub applicant_name: String,
    pub applicant_email: Option<String>,
    pub resume_url: Option<String>,
    pub resume_text: Option<String>,
    pub answers: Map<String, Value>,
}

#[derive(Default)]
struct RegistryInner {
    forms: HashMap<Uuid, FormRecord>,
    submissions: HashMap<Uuid, SubmissionRecord>,
}

#[derive(Clone, Default)]
pub struct SubmissionRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl SubmissionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create_form(&self, new_form: NewForm) -> FormRecord {
        let mut inner = self.inner.write().await;
        let base = slugify(&new_form.title);
        let slug = unique_slug(&base, |candidate| {
            inner.forms.values().any(|f| f.slug == candidate)
        });

        let form = FormRecord {
            id: Uuid::new_v4(),
            title: new_form.title,
            slug,
            description: new_form.description,
            status: if new_form.publish {
                FormStatus::Active
            } else {
                FormStatus::Inactive
            },
            evaluation: new_form.evaluation,
            created_at: Utc::now(),
        };
        inner.forms.insert(form.id, form.clone());
        form
    }

    pub async fn form(&self, form_id: Uuid) -> Result<FormRecord, RegistryError> {
        self.inner
            .read()
            .await
            .forms
            .get(&form_id)
            .cloned()
            .ok_or_else(|| RegistryError::FormNotFound(form_id.to_string()))
    }

    /// Looks up a form for public submission; inactive forms are rejected.
    pub async fn active_form_by_slug(&self, slug: &str) -> Result<FormRecord, RegistryError> {
        let inner = self.inner.read().await;
        let form = inner
            .forms
            .values()
            .find(|f| f.slug == slug)
            .ok_or_else(|| RegistryError::FormNotFound(slug.to_string()))?;
        if form.status != FormStatus::Active {
            return Err(RegistryError::FormInactive(slug.to_string()));
        }
        Ok(form.clone())
    }

    pub async fn set_status(
        &self,
        form_id: Uuid,
        status: FormStatus,
    ) -> Result<FormRecord, RegistryError> {
        let mut inner = self.inner.write().await;
        let form = inner
            .forms
            .get_mut(&form_id)
            .ok_or_else(|| RegistryError::FormNotFound(form_id.to_string()))?;
        form.status = status;
        Ok(form.clone())
    }

    pub async fn add_submission(
        &self,
        form_id: Uuid,
        new_submission: NewSubmission,
    ) -> Result<SubmissionRecord, RegistryError> {
        let mut inner = self.inner.write().await;
        if !inner.forms.contains_key(&form_id) {
            return Err(RegistryError::FormNotFound(form_id.to_string()));
        }
        let record = SubmissionRecord {
            id: Uuid::new_v4(),
            form_id,
            applicant_name: new_submission.applicant_name,
            applicant_email: new_submission.applicant_email,
            resume_url: new_submission.resume_url,
            resume_text: new_submission.resume_text,
            answers: new_submission.answers,
            created_at: Utc::now(),
            evaluation: None,
        };
        inner.submissions.insert(record.id, record.clone());
        Ok(record)
    }

    /// Submissions of a form, newest first.
    pub async fn submissions_for(&self, form_id: Uuid) -> Vec<SubmissionRecord> {
        let inner = self.inner.read().await;
        let mut submissions: Vec<SubmissionRecord> = inner
            .submissions
            .values()
            .filter(|s| s.form_id == form_id)
            .cloned()
            .collect();
        submissions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        submissions
    }

    /// Stores `output` as the submission's evaluation, replacing any previous one.
    pub async fn record_evaluation(
        &self,
        submission_id: Uuid,
        output: EvaluationOutput,
    ) -> Result<EvaluationRecord, RegistryError> {
        let mut inner = self.inner.write().await;
        let submission = inner
            .submissions
            .get_mut(&submission_id)
            .ok_or(RegistryError::SubmissionNotFound(submission_id))?;
        let record = EvaluationRecord {
            output,
            evaluated_at: Utc::now(),
        };
        submission.evaluation = Some(record.clone());
        Ok(record)
    }

    pub async fn remove_submission(&self, submission_id: Uuid) -> Result<(), RegistryError> {
        self.inner
            .write()
            .await
            .submissions
            .remove(&submission_id)
            .map(|_| ())
            .ok_or(RegistryError::SubmissionNotFound(submission_id))
    }
}
