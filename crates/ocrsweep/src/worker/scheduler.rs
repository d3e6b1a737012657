use std::sync::Arc;

use chrono::Utc;
use log::{error, info, warn};

use crate::error::WorkerError;
use crate::pipeline::{Collaborators, Pipeline, PipelineConfig, PipelineOutcome};
use crate::processor::StageKind;
use crate::sanitize::{excerpt, EXCERPT_CHARS};
use crate::storage::OutputMapper;
use crate::worker::job::{Document, Job};
use crate::worker::pool::WorkerPool;
use crate::worker::report::{BatchReport, DocumentReport};
use crate::worker::scanner;

/// Fans documents out to a worker pool and merges their outcomes.
///
/// The calling thread is the only writer of the [`BatchReport`].
pub struct Scheduler {
    config: Arc<PipelineConfig>,
    pipeline: Arc<Pipeline>,
}

impl Scheduler {
    pub fn new(config: PipelineConfig, collaborators: &Collaborators) -> Self {
        let pipeline = Pipeline::from_config(&config, collaborators);
        Self::with_pipeline(config, pipeline)
    }

    pub fn with_pipeline(config: PipelineConfig, pipeline: Pipeline) -> Self {
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Discovers documents under the configured input root and processes them
    /// with the configured worker count.
    pub fn run_batch(&self) -> Result<BatchReport, WorkerError> {
        let documents = scanner::discover(&self.config.input_directory, &self.config.extensions)?;
        self.run(documents, self.config.workers)
    }

    /// Processes `documents` with at most `parallelism` workers.
    ///
    /// Returns exactly one report entry per document, in input order, whatever
    /// the individual pipelines did.
    pub fn run(
        &self,
        documents: Vec<Document>,
        parallelism: usize,
    ) -> Result<BatchReport, WorkerError> {
        let started_at = Utc::now();
        let output_root = self.config.output_directory.clone();
        let total = documents.len();

        if total == 0 {
            info!("No documents to process");
            return Ok(BatchReport::new(Vec::new(), output_root, started_at, Utc::now()));
        }

        let workers = worker_count(parallelism, total);
        let cpus = num_cpus::get();
        if oversubscribed(workers, cpus) {
            warn!(
                "Running {} workers on {} CPUs; OCR runs may contend",
                workers, cpus
            );
        }
        info!("Processing {} document(s) with {} worker(s)", total, workers);

        let mapper = Arc::new(OutputMapper::new(&output_root));
        let pool = WorkerPool::new(Arc::clone(&self.pipeline), mapper, workers)?;

        for (index, document) in documents.iter().enumerate() {
            pool.submit(Job::new(index, document.clone()))?;
        }

        let mut slots: Vec<Option<DocumentReport>> = vec![None; total];
        for completed in 1..=total {
            match pool.recv_result() {
                Some((index, report)) => {
                    info!("{}", progress_line(completed, total, &report));
                    if let Some(slot) = slots.get_mut(index) {
                        *slot = Some(report);
                    }
                }
                None => {
                    error!(
                        "Result channel closed with {} outcome(s) outstanding",
                        total - completed + 1
                    );
                    pool.shutdown();
                    break;
                }
            }
        }

        pool.wait();

        let reports = slots
            .into_iter()
            .zip(documents)
            .map(|(slot, document)| {
                slot.unwrap_or_else(|| {
                    DocumentReport::new(
                        document,
                        None,
                        PipelineOutcome::failed(
                            StageKind::Worker,
                            "worker exited without reporting an outcome",
                        ),
                    )
                })
            })
            .collect();

        Ok(BatchReport::new(reports, output_root, started_at, Utc::now()))
    }
}

/// Never more workers than documents, and never fewer than one.
fn worker_count(parallelism: usize, total: usize) -> usize {
    parallelism.clamp(1, total.max(1))
}

fn oversubscribed(workers: usize, cpus: usize) -> bool {
    workers > cpus
}

/// One line per completed document, in completion order.
pub fn progress_line(completed: usize, total: usize, report: &DocumentReport) -> String {
    let name = report.display_name();
    match &report.outcome {
        PipelineOutcome::Success => format!("[{}/{}] [OK] {}", completed, total, name),
        PipelineOutcome::SuccessWithWarnings { warnings } => {
            let details = warnings
                .iter()
                .map(|w| format!("{}: {}", w.stage, excerpt(&w.diagnostic, EXCERPT_CHARS)))
                .collect::<Vec<_>>()
                .join("; ");
            format!("[{}/{}] [WARN] {}: {}", completed, total, name, details)
        }
        PipelineOutcome::FailedHard { stage, diagnostic } => format!(
            "[{}/{}] [FAILED] {} at {}: {}",
            completed,
            total,
            name,
            stage,
            excerpt(diagnostic, EXCERPT_CHARS)
        ),
    }
}
