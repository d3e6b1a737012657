use serde::Serialize;

use crate::processor::StageKind;

/// Per-document pipeline states.
///
/// `Succeeded` and `FailedHard` are absorbing. Optional stages always move
/// forward; required stages move to `FailedHard` on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineState {
    Pending,
    Normalizing,
    Extracting,
    Exporting,
    Linting,
    Done,
    Succeeded,
    FailedHard,
}

impl PipelineState {
    /// Forward edge taken when the current state's stage finished (or was skipped).
    pub fn next(self) -> Self {
        match self {
            PipelineState::Pending => PipelineState::Normalizing,
            PipelineState::Normalizing => PipelineState::Extracting,
            PipelineState::Extracting => PipelineState::Exporting,
            PipelineState::Exporting => PipelineState::Linting,
            PipelineState::Linting => PipelineState::Done,
            PipelineState::Done => PipelineState::Succeeded,
            PipelineState::Succeeded => PipelineState::Succeeded,
            PipelineState::FailedHard => PipelineState::FailedHard,
        }
    }

    /// Edge taken when the current state's stage failed.
    pub fn on_failure(self) -> Self {
        match self.stage() {
            Some(stage) if stage.is_required() => PipelineState::FailedHard,
            _ => self.next(),
        }
    }

    /// The stage adapter that runs in this state, if any.
    pub fn stage(self) -> Option<StageKind> {
        match self {
            PipelineState::Normalizing => Some(StageKind::Normalizer),
            PipelineState::Extracting => Some(StageKind::Extractor),
            PipelineState::Exporting => Some(StageKind::Exporter),
            PipelineState::Linting => Some(StageKind::Classifier),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Succeeded | PipelineState::FailedHard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_path() {
        let mut state = PipelineState::Pending;
        let mut visited = vec![state];
        while !state.is_terminal() {
            state = state.next();
            visited.push(state);
        }
        assert_eq!(
            visited,
            vec![
                PipelineState::Pending,
                PipelineState::Normalizing,
                PipelineState::Extracting,
                PipelineState::Exporting,
                PipelineState::Linting,
                PipelineState::Done,
                PipelineState::Succeeded,
            ]
        );
    }

    #[test]
    fn test_required_failures_are_hard() {
        assert_eq!(PipelineState::Normalizing.on_failure(), PipelineState::FailedHard);
        assert_eq!(PipelineState::Extracting.on_failure(), PipelineState::FailedHard);
    }

    #[test]
    fn test_optional_failures_move_forward() {
        assert_eq!(PipelineState::Exporting.on_failure(), PipelineState::Linting);
        assert_eq!(PipelineState::Linting.on_failure(), PipelineState::Done);
    }

    #[test]
    fn test_terminal_states_absorb() {
        assert_eq!(PipelineState::FailedHard.next(), PipelineState::FailedHard);
        assert_eq!(PipelineState::Succeeded.on_failure(), PipelineState::Succeeded);
    }
}
