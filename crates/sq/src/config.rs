//! Command-line configuration for the stored query runner.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SQ_LOG_LEVEL` | warn | Log level |
//! | `SQ_METADATA` | (empty registry) | Registry fixture JSON file |
//! | `SQ_QUERY` | GetFolderAndContents | Stored query name or query id |
//! | `SQ_PARAMS` | (stdin) | Parameter bag JSON file |
//! | `SQ_PRETTY` | false | Pretty-print the JSON output |

use std::path::PathBuf;

use clap::Parser;

/// Stored query runner configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "sq")]
#[command(about = "Run an XDS stored query against a registry fixture")]
pub struct Config {
    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "SQ_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Registry fixture file (folders, documents, associations).
    #[arg(short, long, env = "SQ_METADATA")]
    pub metadata: Option<PathBuf>,

    /// Stored query name or query id.
    #[arg(short, long, env = "SQ_QUERY", default_value = "GetFolderAndContents")]
    pub query: String,

    /// Parameter bag file; read from stdin when omitted.
    #[arg(short, long, env = "SQ_PARAMS")]
    pub params: Option<PathBuf>,

    /// Pretty-print the JSON output.
    #[arg(long, env = "SQ_PRETTY", default_value = "false")]
    pub pretty: bool,

    /// List the registered stored queries and exit.
    #[arg(long)]
    pub list: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            metadata: None,
            query: "GetFolderAndContents".to_string(),
            params: None,
            pretty: false,
            list: false,
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

impl Config {
    /// Validates the configuration, returning every problem found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            errors.push(format!(
                "Unknown log level '{}' (expected one of {})",
                self.log_level,
                LOG_LEVELS.join(", ")
            ));
        }

        if self.query.trim().is_empty() {
            errors.push("Stored query cannot be empty".to_string());
        }

        for (label, path) in [("Metadata", &self.metadata), ("Params", &self.params)] {
            if let Some(path) = path {
                if !path.is_file() {
                    errors.push(format!("{} file not found: {}", label, path.display()));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
