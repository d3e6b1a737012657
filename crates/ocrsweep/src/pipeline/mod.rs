pub mod config;
pub mod outcome;
pub mod progress;
pub mod runner;
pub mod state;

pub use config::{Collaborators, PipelineConfig};
pub use outcome::{PipelineOutcome, StageWarning};
pub use progress::{LogProgress, NoopProgress, ProgressEvent, ProgressReporter};
pub use runner::Pipeline;
pub use state::PipelineState;
