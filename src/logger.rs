//! tracing setup for the CLI and the shell.
//!
//! Rendered panels own stdout, so events go to stderr. `RUST_LOG` takes full
//! directives; `CAMPUSHUB_LOG` is a bare level applied to this crate only.

use std::env;

use tracing_subscriber::EnvFilter;

const LEVEL_VAR: &str = "CAMPUSHUB_LOG";
const DEFAULT_LEVEL: &str = "warn";

fn directive(rust_log: Option<String>, level: Option<String>) -> String {
    if let Some(rust_log) = rust_log.filter(|value| !value.trim().is_empty()) {
        return rust_log;
    }
    let level = level
        .map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string());
    format!("warn,campus_hub={level}")
}

pub fn init_logging() {
    let directive = directive(env::var("RUST_LOG").ok(), env::var(LEVEL_VAR).ok());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
