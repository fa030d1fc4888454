//! Configuration module for the archiver
//!
//! This module handles loading, parsing, and validating the optional TOML configuration file.
//! Every key has a default, so an absent file is equivalent to an empty one.
//!
//! # Example
//!
//! ```no_run
//! use mdex_archiver::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("archiver.toml")).unwrap();
//! println!("Cache lives at: {}", config.output.cache_path.display());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, DownloadConfig, FeatureConfig, GatewayConfig, OutputConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
