use std::sync::Arc;

use reqwest::Client as HttpClient;

use crate::config::Config;
use crate::llm_client::Evaluator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Browser-identified client used for job-posting fetches.
    pub http: HttpClient,
    /// The remote model behind both submit actions.
    /// Carried as `Arc<dyn Evaluator>` so tests substitute a stub client.
    pub evaluator: Arc<dyn Evaluator>,
    pub config: Config,
}
