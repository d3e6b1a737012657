pub mod job;
pub mod pool;
pub mod report;
pub mod scanner;
pub mod scheduler;

pub use job::{Document, Job};
pub use pool::{JobResult, WorkerPool};
pub use report::{BatchReport, DocumentReport};
pub use scanner::{discover, find_collisions, DocumentScanner};
pub use scheduler::{progress_line, Scheduler};
