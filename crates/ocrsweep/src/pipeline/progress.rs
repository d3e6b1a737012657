use log::{debug, info, warn};

use crate::processor::StageKind;
use crate::sanitize::{excerpt, EXCERPT_CHARS};

use super::state::PipelineState;

/// Events emitted by the pipeline while one document moves through its states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started {
        document: String,
    },
    Transition {
        from: PipelineState,
        to: PipelineState,
    },
    StageSkipped {
        stage: StageKind,
    },
    Warning {
        stage: StageKind,
        diagnostic: String,
    },
    Failed {
        stage: StageKind,
        diagnostic: String,
    },
    Finished {
        state: PipelineState,
    },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Writes events to the `log` facade, tagged with the document's display name.
pub struct LogProgress {
    document: String,
}

impl LogProgress {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
        }
    }
}

impl ProgressReporter for LogProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { document } => info!("[START] {}", document),
            ProgressEvent::Transition { from, to } => {
                debug!("{}: {:?} -> {:?}", self.document, from, to)
            }
            ProgressEvent::StageSkipped { stage } => {
                debug!("{}: {} disabled, skipping", self.document, stage)
            }
            ProgressEvent::Warning { stage, diagnostic } => warn!(
                "[WARN] {}: {} failed: {}",
                self.document,
                stage,
                excerpt(&diagnostic, EXCERPT_CHARS)
            ),
            ProgressEvent::Failed { stage, diagnostic } => warn!(
                "{}: {} failed: {}",
                self.document,
                stage,
                excerpt(&diagnostic, EXCERPT_CHARS)
            ),
            ProgressEvent::Finished { state } => debug!("{}: finished in {:?}", self.document, state),
        }
    }
}
