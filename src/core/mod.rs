//! Core module - Shared building blocks for the analysis engine
//!
//! This module provides:
//! - Engine configuration (extensions, manifests, exclusions, caps)
//! - The engine error taxonomy
//! - Size-capped file reading with an encoding fallback
//! - Path classification and normalization
//! - Rendering of reports as text or JSON

pub mod config;
pub mod error;
pub mod file_reader;
pub mod paths;
pub mod render;
