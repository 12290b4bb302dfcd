use std::sync::Arc;
use std::time::Instant;

use crate::crew::ReportPipeline;

/// Shared state for the HTTP handlers.
pub struct AppState {
    pub pipeline: Arc<dyn ReportPipeline>,
    pub wrap_width: usize,
    pub model: String,
    pub search_configured: bool,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        pipeline: Arc<dyn ReportPipeline>,
        wrap_width: usize,
        model: impl Into<String>,
    ) -> Self {
        Self {
            pipeline,
            wrap_width,
            model: model.into(),
            search_configured: false,
            start_time: Instant::now(),
        }
    }

    pub fn with_search_configured(mut self, configured: bool) -> Self {
        self.search_configured = configured;
        self
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
