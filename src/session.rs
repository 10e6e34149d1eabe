//! The single "last result" slot of an interactive session.

use crate::extract::Upload;
use crate::pipeline::{Failure, Pipeline, Summarizer};
use crate::summary::SummaryResult;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Outcome of one pipeline run
pub type Outcome = Result<SummaryResult, Failure>;

/// Holds the outcome of the most recent run. Each run replaces it wholesale;
/// nothing is ever updated in place.
#[derive(Debug, Default)]
pub struct Session {
    last: Mutex<Option<Arc<Outcome>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<Arc<Outcome>>> {
        // The slot is only ever assigned whole, so a poisoned lock still holds a
        // consistent value.
        self.last.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clear the previous outcome, run the pipeline, and store the new one.
    pub async fn summarize<S: Summarizer>(
        &self,
        pipeline: &Pipeline<S>,
        upload: &Upload,
    ) -> Arc<Outcome> {
        self.clear();
        let outcome = Arc::new(pipeline.run(upload).await);
        *self.slot() = Some(Arc::clone(&outcome));
        outcome
    }

    /// Outcome of the last run, successful or not
    pub fn last(&self) -> Option<Arc<Outcome>> {
        self.slot().clone()
    }

    /// The stored summary, if the last run produced one
    pub fn last_result(&self) -> Option<SummaryResult> {
        match self.slot().as_deref() {
            Some(Ok(result)) => Some(result.clone()),
            _ => None,
        }
    }

    pub fn clear(&self) {
        self.slot().take();
    }
}
