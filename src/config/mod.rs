//! Configuration module for SpellSpider
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; an empty file yields the built-in defaults.
//!
//! # Example
//!
//! ```no_run
//! use spellspider::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("spellspider.toml")).unwrap();
//! println!("First proxy: {}", config.proxies[0].name);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_proxies, Config, HttpConfig, ProxyConfig, RetryConfig, SitemapConfig,
};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
