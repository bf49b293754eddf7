//! Axum route handlers for the Evaluation API.
//!
//! One submit is one blocking request/response pass: acquire the job text,
//! render the resume, pick the template, make exactly one model call.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::evaluation::acquisition::scrape_job_description;
use crate::evaluation::action::EvaluationAction;
use crate::evaluation::renderer::render_first_page;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// One parsed submit form: the pressed action plus the three user inputs.
#[derive(Debug, Default)]
pub struct SubmitForm {
    pub action: Option<EvaluationAction>,
    pub job_text: String,
    pub job_url: String,
    pub resume: Option<Bytes>,
}

#[derive(Debug, Serialize)]
pub struct EvaluationResponse {
    /// The model's answer, verbatim.
    pub result: String,
    /// "scraped" when the job link yielded text, otherwise "typed".
    pub job_source: &'static str,
    /// Inline messages surfaced to the user (recovered acquisition failures).
    pub notices: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/evaluations
///
/// Multipart form: `action` ("review" | "percentage_match"), `job_text`,
/// `job_url` (both optional text fields), and a `resume` PDF file.
pub async fn handle_submit(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<EvaluationResponse>, AppError> {
    let form = read_submit_form(&mut multipart).await?;

    let action = form.action.ok_or_else(|| {
        AppError::Validation("action must be 'review' or 'percentage_match'".to_string())
    })?;

    let response = evaluate_submission(&state, action, form).await?;
    Ok(Json(response))
}

async fn read_submit_form(multipart: &mut Multipart) -> Result<SubmitForm, AppError> {
    let mut form = SubmitForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "action" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable field 'action': {e}")))?;
                form.action = Some(EvaluationAction::from_form_value(value.trim()).ok_or_else(
                    || {
                        AppError::Validation(format!(
                            "unknown action '{}': expected 'review' or 'percentage_match'",
                            value.trim()
                        ))
                    },
                )?);
            }
            "job_text" => {
                form.job_text = field.text().await.map_err(|e| {
                    AppError::Validation(format!("unreadable field 'job_text': {e}"))
                })?;
            }
            "job_url" => {
                form.job_url = field.text().await.map_err(|e| {
                    AppError::Validation(format!("unreadable field 'job_url': {e}"))
                })?;
            }
            "resume" => {
                form.resume = Some(field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("unreadable field 'resume': {e}"))
                })?);
            }
            other => warn!("ignoring unknown form field '{other}'"),
        }
    }

    Ok(form)
}

// ────────────────────────────────────────────────────────────────────────────
// Submit pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Runs one evaluation end to end.
///
/// Steps:
/// 1. job link present → scrape it, preferring the result over typed text;
///    any failure becomes a notice and the typed text stands
/// 2. require the resume upload — without it the model is never called
/// 3. rasterize page 1 on the blocking pool
/// 4. one model call with the action's template, the page, and the job text
pub async fn evaluate_submission(
    state: &AppState,
    action: EvaluationAction,
    form: SubmitForm,
) -> Result<EvaluationResponse, AppError> {
    let mut notices = Vec::new();
    let mut job_text = form.job_text;
    let mut job_source = "typed";

    // Step 1: Acquire job text
    let link = form.job_url.trim();
    if !link.is_empty() {
        match scrape_job_description(&state.http, link).await {
            Ok(scraped) => {
                job_text = scraped;
                job_source = "scraped";
            }
            Err(e) => {
                warn!("job-description acquisition failed: {e}");
                notices.push(e.to_string());
            }
        }
    }

    // Step 2: Require the resume upload
    let Some(resume_bytes) = form.resume else {
        return Err(AppError::Validation("Please upload the resume".to_string()));
    };

    // Step 3: Render page 1 (CPU-bound, off the async runtime)
    let rendered = tokio::task::spawn_blocking(move || render_first_page(&resume_bytes))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("render task panicked: {e}")))?
        .map_err(|e| AppError::UnprocessableEntity(format!("could not render resume: {e}")))?;

    // Step 4: One model call with the selected template
    info!(?action, job_source, "running evaluation");
    let result = state
        .evaluator
        .evaluate(action.instruction(), &rendered, &job_text)
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;

    Ok(EvaluationResponse {
        result,
        job_source,
        notices,
    })
}
