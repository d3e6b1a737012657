use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use log::{debug, error, info};

use crate::error::WorkerError;
use crate::pipeline::{LogProgress, Pipeline, PipelineOutcome};
use crate::processor::StageKind;
use crate::storage::{ArtifactPaths, OutputMapper};
use crate::worker::job::Job;
use crate::worker::report::DocumentReport;

/// Result message: the job's discovery index and its terminal report.
pub type JobResult = (usize, DocumentReport);

pub struct WorkerPool {
    job_sender: Sender<Job>,
    result_receiver: Receiver<JobResult>,
    workers: Vec<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl WorkerPool {
    /// Starts `worker_count` named threads sharing one pipeline.
    pub fn new(
        pipeline: Arc<Pipeline>,
        mapper: Arc<OutputMapper>,
        worker_count: usize,
    ) -> Result<Self, WorkerError> {
        let worker_count = worker_count.max(1);
        // Jobs are all known up front, so the queue never needs to push back.
        let (job_sender, job_receiver) = unbounded::<Job>();
        let (result_sender, result_receiver) = bounded::<JobResult>(worker_count * 2);
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(worker_count);

        for worker_id in 0..worker_count {
            let job_rx = job_receiver.clone();
            let result_tx = result_sender.clone();
            let shutdown_flag = Arc::clone(&shutdown);
            let worker_pipeline = Arc::clone(&pipeline);
            let worker_mapper = Arc::clone(&mapper);

            let handle = thread::Builder::new()
                .name(format!("ocrsweep-worker-{}", worker_id))
                .spawn(move || {
                    run_worker(
                        worker_id,
                        job_rx,
                        result_tx,
                        shutdown_flag,
                        worker_pipeline,
                        worker_mapper,
                    );
                })
                .map_err(|e| WorkerError::SpawnFailed(e.to_string()))?;

            workers.push(handle);
        }

        info!("Started {} workers", worker_count);

        Ok(Self {
            job_sender,
            result_receiver,
            workers,
            shutdown,
        })
    }

    pub fn submit(&self, job: Job) -> Result<(), WorkerError> {
        if self.shutdown.load(Ordering::Relaxed) {
            return Err(WorkerError::ChannelClosed);
        }

        self.job_sender
            .send(job)
            .map_err(|_| WorkerError::ChannelClosed)
    }

    /// Blocks until a worker reports. `None` once every worker has exited.
    pub fn recv_result(&self) -> Option<JobResult> {
        self.result_receiver.recv().ok()
    }

    pub fn shutdown(&self) {
        info!("Shutting down worker pool...");
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    pub fn wait(self) {
        // Drop sender to signal workers to exit
        drop(self.job_sender);

        for (i, worker) in self.workers.into_iter().enumerate() {
            if let Err(e) = worker.join() {
                error!("Worker {} panicked: {:?}", i, e);
            } else {
                debug!("Worker {} finished", i);
            }
        }

        info!("All workers have stopped");
    }
}

fn run_worker(
    worker_id: usize,
    job_receiver: Receiver<Job>,
    result_sender: Sender<JobResult>,
    shutdown: Arc<AtomicBool>,
    pipeline: Arc<Pipeline>,
    mapper: Arc<OutputMapper>,
) {
    debug!("Worker {} started", worker_id);

    loop {
        if shutdown.load(Ordering::Relaxed) {
            debug!("Worker {} received shutdown signal", worker_id);
            break;
        }

        match job_receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(job) => {
                debug!("Worker {} processing job: {:?}", worker_id, job.document.relative);

                let index = job.index;
                let document = job.document.clone();
                let report = panic::catch_unwind(AssertUnwindSafe(|| {
                    process_job(&job, &pipeline, &mapper)
                }))
                .unwrap_or_else(|payload| {
                    let message = panic_message(payload.as_ref());
                    error!("Worker {} panicked on {:?}: {}", worker_id, document.relative, message);
                    DocumentReport::new(
                        document,
                        None,
                        PipelineOutcome::failed(StageKind::Worker, format!("worker panicked: {}", message)),
                    )
                });

                if let Err(e) = result_sender.send((index, report)) {
                    error!("Worker {} failed to send result: {}", worker_id, e);
                    break;
                }
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                continue;
            }
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                debug!("Worker {} job channel disconnected", worker_id);
                break;
            }
        }
    }

    debug!("Worker {} stopped", worker_id);
}

fn process_job(job: &Job, pipeline: &Pipeline, mapper: &OutputMapper) -> DocumentReport {
    let document = job.document.clone();
    match mapper.resolve(&document) {
        Ok(output_dir) => {
            let artifacts = ArtifactPaths::for_document(&document, &output_dir);
            let progress = LogProgress::new(document.relative.display().to_string());
            let outcome = pipeline.run(job, &artifacts, &progress);
            DocumentReport::new(document, Some(output_dir), outcome)
        }
        Err(e) => DocumentReport::new(
            document,
            None,
            PipelineOutcome::failed(StageKind::OutputPath, e.to_string()),
        ),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
