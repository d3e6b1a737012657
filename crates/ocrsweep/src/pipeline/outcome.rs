use serde::Serialize;

use crate::processor::StageKind;

/// A soft failure recorded while the pipeline kept going.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageWarning {
    pub stage: StageKind,
    pub diagnostic: String,
}

/// Terminal state of one document. Exactly one per document per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineOutcome {
    Success,
    SuccessWithWarnings { warnings: Vec<StageWarning> },
    FailedHard { stage: StageKind, diagnostic: String },
}

impl PipelineOutcome {
    pub fn failed(stage: StageKind, diagnostic: impl Into<String>) -> Self {
        PipelineOutcome::FailedHard {
            stage,
            diagnostic: diagnostic.into(),
        }
    }

    pub fn from_warnings(warnings: Vec<StageWarning>) -> Self {
        if warnings.is_empty() {
            PipelineOutcome::Success
        } else {
            PipelineOutcome::SuccessWithWarnings { warnings }
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, PipelineOutcome::FailedHard { .. })
    }

    pub fn warnings(&self) -> &[StageWarning] {
        match self {
            PipelineOutcome::SuccessWithWarnings { warnings } => warnings,
            _ => &[],
        }
    }

    pub fn failed_stage(&self) -> Option<StageKind> {
        match self {
            PipelineOutcome::FailedHard { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
