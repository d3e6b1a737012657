pub mod filesystem;

pub use filesystem::{write_replacing, ArtifactPaths, OutputMapper};
