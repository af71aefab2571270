//! Helios Stored Query runner (sq)
//!
//! Runs one XDS stored query against a registry fixture and prints the
//! result, or the violation list when the request is rejected.

mod config;

use std::io::Read;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};

use helios_storedquery::backends::InMemoryMetadataStore;
use helios_storedquery::error::ParameterViolation;
use helios_storedquery::{ParameterBag, StoredQueryError, StoredQueryRegistry};

use crate::config::Config;

/// Initializes the tracing subscriber, writing to stderr.
fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("helios_storedquery={},sq={}", level, level))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Structured report printed when a stored query fails.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FailureReport<'a> {
    error_code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    violations: Vec<&'a ParameterViolation>,
}

impl<'a> FailureReport<'a> {
    fn new(err: &'a StoredQueryError) -> Self {
        Self {
            error_code: err.error_code(),
            message: err.to_string(),
            violations: err
                .violations()
                .map(|v| v.iter().collect())
                .unwrap_or_default(),
        }
    }
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

fn load_store(config: &Config) -> anyhow::Result<InMemoryMetadataStore> {
    match &config.metadata {
        Some(path) => InMemoryMetadataStore::from_fixture_file(path)
            .with_context(|| format!("Failed to load registry fixture {}", path.display())),
        None => {
            warn!("No registry fixture given, querying an empty registry");
            Ok(InMemoryMetadataStore::new())
        }
    }
}

fn load_params(config: &Config) -> anyhow::Result<ParameterBag> {
    let content = match &config.params {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read parameters {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read parameters from stdin")?;
            buf
        }
    };
    serde_json::from_str(&content).context("Parameters must be a JSON object of named values")
}

async fn run(config: &Config) -> anyhow::Result<ExitCode> {
    let store = Arc::new(load_store(config)?);
    let registry = StoredQueryRegistry::with_store(store)
        .context("Failed to build the stored query registry")?;

    if config.list {
        for name in registry.names() {
            println!("{}", name);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut bag = load_params(config)?;
    info!(query = %config.query, parameters = bag.len(), "Running stored query");

    match registry.run(&config.query, &mut bag).await {
        Ok(result) => {
            println!("{}", to_json(&result, config.pretty)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            let report = FailureReport::new(&err);
            eprintln!("{}", to_json(&report, config.pretty)?);
            Ok(if err.is_caller_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let config = Config::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        return Ok(ExitCode::FAILURE);
    }

    run(&config).await
}
