//! Configuration module for Stride
//!
//! This module provides configuration management including:
//! - Platform path resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::StridePaths;
pub use settings::Settings;
