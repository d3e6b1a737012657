use std::sync::Arc;

use tracing::{debug, info_span, warn};

use crate::lint::TokenClassifier;
use crate::processor::{
    DocumentExporter, LintStage, OcrNormalizer, Stage, StageKind, TextExtractor,
};
use crate::sanitize;
use crate::storage::ArtifactPaths;
use crate::worker::job::Job;

use super::config::{Collaborators, PipelineConfig};
use super::outcome::{PipelineOutcome, StageWarning};
use super::progress::{ProgressEvent, ProgressReporter};
use super::state::PipelineState;

/// Per-document state machine over the four stage adapters.
///
/// Holds no concurrency primitives; one instance is shared by every worker.
pub struct Pipeline {
    normalizer: Box<dyn Stage>,
    extractor: Box<dyn Stage>,
    exporter: Option<Box<dyn Stage>>,
    lint: Option<Box<dyn Stage>>,
}

impl Pipeline {
    /// Injects specific stages. A `None` optional stage is skipped.
    pub fn new(
        normalizer: Box<dyn Stage>,
        extractor: Box<dyn Stage>,
        exporter: Option<Box<dyn Stage>>,
        lint: Option<Box<dyn Stage>>,
    ) -> Self {
        Self {
            normalizer,
            extractor,
            exporter,
            lint,
        }
    }

    /// Production constructor. Builds every stage from config and collaborators.
    pub fn from_config(config: &PipelineConfig, collaborators: &Collaborators) -> Self {
        let normalizer = OcrNormalizer::new(
            Arc::clone(&collaborators.ocr),
            config.ocr_options.clone(),
        );
        let extractor = TextExtractor::new(Arc::clone(&collaborators.reader));

        let exporter = config.export_enabled.then(|| {
            Box::new(DocumentExporter::new(Arc::clone(&collaborators.writer))) as Box<dyn Stage>
        });
        let lint = config.lint_enabled.then(|| {
            let classifier = TokenClassifier::new(
                Arc::clone(&collaborators.spell),
                Arc::clone(&collaborators.custom),
                config.max_suggestions,
            );
            Box::new(LintStage::new(classifier)) as Box<dyn Stage>
        });

        Self::new(Box::new(normalizer), Box::new(extractor), exporter, lint)
    }

    fn stage(&self, kind: StageKind) -> Option<&dyn Stage> {
        match kind {
            StageKind::Normalizer => Some(self.normalizer.as_ref()),
            StageKind::Extractor => Some(self.extractor.as_ref()),
            StageKind::Exporter => self.exporter.as_deref(),
            StageKind::Classifier => self.lint.as_deref(),
            StageKind::OutputPath | StageKind::Worker => None,
        }
    }

    /// Drives one document from `Pending` to a terminal state.
    pub fn run(
        &self,
        job: &Job,
        artifacts: &ArtifactPaths,
        progress: &dyn ProgressReporter,
    ) -> PipelineOutcome {
        let filename = sanitize::redact_path(&job.document.path);
        let _pipeline_span = info_span!("pipeline",
            job_id = %job.id,
            filename = %filename,
        )
        .entered();

        progress.report(ProgressEvent::Started {
            document: job.document.relative.display().to_string(),
        });

        let mut state = PipelineState::Pending;
        let mut warnings = Vec::new();
        let mut failure = None;

        while !state.is_terminal() {
            let next = match state.stage() {
                None => state.next(),
                Some(kind) => {
                    if let Err(e) = artifacts.clear_from(kind) {
                        warn!("Could not remove stale artifacts before {}: {}", kind, e);
                    }
                    match self.stage(kind) {
                        None => {
                            progress.report(ProgressEvent::StageSkipped { stage: kind });
                            state.next()
                        }
                        Some(stage) => {
                            let _step = info_span!("stage", name = kind.as_str()).entered();
                            let result = stage.run(artifacts);
                            if result.ok {
                                if !result.diagnostic.is_empty() {
                                    debug!("{}: {}", kind, result.diagnostic);
                                }
                                state.next()
                            } else if kind.is_required() {
                                warn!("Required stage {} failed", kind);
                                progress.report(ProgressEvent::Failed {
                                    stage: kind,
                                    diagnostic: result.diagnostic.clone(),
                                });
                                failure = Some((kind, result.diagnostic));
                                state.on_failure()
                            } else {
                                progress.report(ProgressEvent::Warning {
                                    stage: kind,
                                    diagnostic: result.diagnostic.clone(),
                                });
                                warnings.push(StageWarning {
                                    stage: kind,
                                    diagnostic: result.diagnostic,
                                });
                                state.on_failure()
                            }
                        }
                    }
                }
            };

            progress.report(ProgressEvent::Transition {
                from: state,
                to: next,
            });
            state = next;
        }

        progress.report(ProgressEvent::Finished { state });

        match failure {
            Some((stage, diagnostic)) => PipelineOutcome::failed(stage, diagnostic),
            None => PipelineOutcome::from_warnings(warnings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::NoopProgress;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::processor::StageResult;
    use crate::worker::job::Document;

    struct FixedStage {
        kind: StageKind,
        result: StageResult,
        calls: Arc<AtomicUsize>,
    }

    impl FixedStage {
        fn boxed(kind: StageKind, result: StageResult, calls: &Arc<AtomicUsize>) -> Box<dyn Stage> {
            Box::new(Self {
                kind,
                result,
                calls: Arc::clone(calls),
            })
        }
    }

    impl Stage for FixedStage {
        fn kind(&self) -> StageKind {
            self.kind
        }

        fn run(&self, _artifacts: &ArtifactPaths) -> StageResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<ProgressEvent>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn report(&self, event: ProgressEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl RecordingProgress {
        fn states(&self) -> Vec<PipelineState> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter_map(|e| match e {
                    ProgressEvent::Transition { to, .. } => Some(*to),
                    _ => None,
                })
                .collect()
        }
    }

    fn job() -> (Job, ArtifactPaths) {
        let document = Document::new(
            PathBuf::from("/in/lectures/week1.pdf"),
            PathBuf::from("lectures/week1.pdf"),
        );
        let artifacts = ArtifactPaths::for_document(&document, Path::new("/out/lectures"));
        (Job::new(0, document), artifacts)
    }

    struct Counters {
        normalizer: Arc<AtomicUsize>,
        extractor: Arc<AtomicUsize>,
        exporter: Arc<AtomicUsize>,
        lint: Arc<AtomicUsize>,
    }

    fn pipeline(results: [StageResult; 4]) -> (Pipeline, Counters) {
        let counters = Counters {
            normalizer: Arc::new(AtomicUsize::new(0)),
            extractor: Arc::new(AtomicUsize::new(0)),
            exporter: Arc::new(AtomicUsize::new(0)),
            lint: Arc::new(AtomicUsize::new(0)),
        };
        let [normalize, extract, export, lint] = results;
        let pipeline = Pipeline::new(
            FixedStage::boxed(StageKind::Normalizer, normalize, &counters.normalizer),
            FixedStage::boxed(StageKind::Extractor, extract, &counters.extractor),
            Some(FixedStage::boxed(StageKind::Exporter, export, &counters.exporter)),
            Some(FixedStage::boxed(StageKind::Classifier, lint, &counters.lint)),
        );
        (pipeline, counters)
    }

    #[test]
    fn test_all_stages_succeed() {
        let (pipeline, counters) = pipeline([
            StageResult::success(),
            StageResult::success(),
            StageResult::success(),
            StageResult::success_with("0 unknown token(s)"),
        ]);
        let (job, artifacts) = job();
        let progress = RecordingProgress::default();

        let outcome = pipeline.run(&job, &artifacts, &progress);

        assert_eq!(outcome, PipelineOutcome::Success);
        assert_eq!(counters.lint.load(Ordering::SeqCst), 1);
        assert_eq!(
            progress.states(),
            vec![
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
    fn test_normalizer_failure_short_circuits() {
        let (pipeline, counters) = pipeline([
            StageResult::failure("ocrmypdf exited with 2: corrupt"),
            StageResult::success(),
            StageResult::success(),
            StageResult::success(),
        ]);
        let (job, artifacts) = job();
        let progress = RecordingProgress::default();

        let outcome = pipeline.run(&job, &artifacts, &progress);

        assert_eq!(
            outcome,
            PipelineOutcome::failed(StageKind::Normalizer, "ocrmypdf exited with 2: corrupt")
        );
        assert_eq!(counters.extractor.load(Ordering::SeqCst), 0);
        assert_eq!(counters.exporter.load(Ordering::SeqCst), 0);
        assert_eq!(counters.lint.load(Ordering::SeqCst), 0);
        assert_eq!(
            progress.states(),
            vec![PipelineState::Normalizing, PipelineState::FailedHard]
        );
    }

    #[test]
    fn test_extractor_failure_skips_optional_stages() {
        let (pipeline, counters) = pipeline([
            StageResult::success(),
            StageResult::failure("no text layer"),
            StageResult::success(),
            StageResult::success(),
        ]);
        let (job, artifacts) = job();

        let outcome = pipeline.run(&job, &artifacts, &NoopProgress);

        assert_eq!(outcome.failed_stage(), Some(StageKind::Extractor));
        assert_eq!(counters.exporter.load(Ordering::SeqCst), 0);
        assert_eq!(counters.lint.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_exporter_failure_is_soft() {
        let (pipeline, counters) = pipeline([
            StageResult::success(),
            StageResult::success(),
            StageResult::failure("disk full"),
            StageResult::success(),
        ]);
        let (job, artifacts) = job();

        let outcome = pipeline.run(&job, &artifacts, &NoopProgress);

        assert!(outcome.is_success());
        assert_eq!(
            outcome.warnings(),
            &[StageWarning {
                stage: StageKind::Exporter,
                diagnostic: "disk full".to_string(),
            }]
        );
        assert_eq!(counters.lint.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_both_optional_failures_are_recorded_in_order() {
        let (pipeline, _counters) = pipeline([
            StageResult::success(),
            StageResult::success(),
            StageResult::failure("disk full"),
            StageResult::failure("unreadable text"),
        ]);
        let (job, artifacts) = job();

        let outcome = pipeline.run(&job, &artifacts, &NoopProgress);

        let stages: Vec<StageKind> = outcome.warnings().iter().map(|w| w.stage).collect();
        assert_eq!(stages, vec![StageKind::Exporter, StageKind::Classifier]);
    }

    #[test]
    fn test_disabled_stages_are_skipped() {
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new(
            FixedStage::boxed(StageKind::Normalizer, StageResult::success(), &calls),
            FixedStage::boxed(StageKind::Extractor, StageResult::success(), &calls),
            None,
            None,
        );
        let (job, artifacts) = job();
        let progress = RecordingProgress::default();

        let outcome = pipeline.run(&job, &artifacts, &progress);

        assert_eq!(outcome, PipelineOutcome::Success);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let skipped = progress
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::StageSkipped { .. }))
            .count();
        assert_eq!(skipped, 2);
    }
}
