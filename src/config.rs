use std::str::FromStr;

use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};

use crate::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(anyhow!("unknown output format: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub role: Role,
    pub format: OutputFormat,
    /// Pins the session clock when set.
    pub now: Option<DateTime<Utc>>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(role) = lookup("CAMPUSHUB_ROLE") {
            config.role = role.parse().context("CAMPUSHUB_ROLE must be student or faculty")?;
        }
        if let Some(format) = lookup("CAMPUSHUB_FORMAT") {
            config.format = format.parse().context("CAMPUSHUB_FORMAT must be text or json")?;
        }
        if let Some(now) = lookup("CAMPUSHUB_NOW") {
            let pinned = DateTime::parse_from_rfc3339(now.trim())
                .context("CAMPUSHUB_NOW must be an RFC 3339 timestamp")?;
            config.now = Some(pinned.with_timezone(&Utc));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.role, Role::Student);
        assert_eq!(config.format, OutputFormat::Text);
    }

    #[test]
    fn reads_every_variable() {
        let config = Config::from_lookup(lookup(&[
            ("CAMPUSHUB_ROLE", "Faculty"),
            ("CAMPUSHUB_FORMAT", "json"),
            ("CAMPUSHUB_NOW", "2026-03-10T09:30:00+02:00"),
        ]))
        .unwrap();
        assert_eq!(config.role, Role::Faculty);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(
            config.now,
            Some(Utc.with_ymd_and_hms(2026, 3, 10, 7, 30, 0).unwrap())
        );
    }

    #[test]
    fn invalid_values_carry_context() {
        let err = Config::from_lookup(lookup(&[("CAMPUSHUB_NOW", "tomorrow")])).unwrap_err();
        assert!(err.to_string().contains("CAMPUSHUB_NOW"));

        let err = Config::from_lookup(lookup(&[("CAMPUSHUB_ROLE", "dean")])).unwrap_err();
        assert!(err.to_string().contains("CAMPUSHUB_ROLE"));
    }
}
