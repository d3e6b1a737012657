//! Shared test utilities for ocrsweep integration tests.
//!
//! This module provides:
//! - `TestHarness` for isolated batch runs in temp directories
//! - Fake collaborators standing in for the external OCR and export tools

pub mod fakes;
pub mod harness;

pub use fakes::*;
pub use harness::TestHarness;
