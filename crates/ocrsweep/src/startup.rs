//! Checks run once before any document is scheduled.

use std::path::PathBuf;

use log::info;

use crate::config::ExtractionBackend;
use crate::error::StartupError;
use crate::pipeline::PipelineConfig;

/// External programs the configured pipeline will invoke.
pub fn required_tools(config: &PipelineConfig) -> Vec<String> {
    let mut tools = vec![config.ocr_program.clone(), "tesseract".to_string()];
    if config.extraction_backend == ExtractionBackend::Pdftotext {
        tools.push("pdfinfo".to_string());
        tools.push("pdftotext".to_string());
    }
    tools
}

/// Resolves `tool` to an executable file, searching `PATH` for bare names.
pub fn locate_tool(tool: &str) -> Option<PathBuf> {
    which::which(tool).ok()
}

/// Reports the first tool that is missing from `PATH` or not executable.
pub fn check_tools(tools: &[String]) -> Result<(), StartupError> {
    for tool in tools {
        match locate_tool(tool) {
            Some(path) => info!("Found {} at {}", tool, path.display()),
            None => return Err(StartupError::MissingTool { tool: tool.clone() }),
        }
    }
    Ok(())
}

/// Fails fast when the input root is missing or a required tool is absent.
pub fn check_preconditions(config: &PipelineConfig) -> Result<(), StartupError> {
    if !config.input_directory.is_dir() {
        return Err(StartupError::InputNotFound(config.input_directory.clone()));
    }
    check_tools(&required_tools(config))
}
