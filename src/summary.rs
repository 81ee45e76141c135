use std::fmt::Write;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::HubError;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

const MAX_KEY_POINTS: usize = 8;

pub const EMPTY_INPUT: &str = "Paste content to summarize.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SummaryStyle {
    #[default]
    Bullet,
    TlDr,
    Outline,
}

impl FromStr for SummaryStyle {
    type Err = HubError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "bullet" | "bullets" => Ok(SummaryStyle::Bullet),
            "tl;dr" | "tldr" => Ok(SummaryStyle::TlDr),
            "outline" | "study" => Ok(SummaryStyle::Outline),
            other => Err(HubError::InvalidValue {
                field: "summary style",
                value: other.to_string(),
            }),
        }
    }
}

/// Sentences split on periods and newlines, whitespace collapsed, first eight kept.
pub fn extract_key_points(text: &str) -> Vec<String> {
    text.split(['.', '\n'])
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .map(|sentence| WHITESPACE.replace_all(sentence, " ").into_owned())
        .take(MAX_KEY_POINTS)
        .collect()
}

pub fn summarize(text: &str, style: SummaryStyle) -> String {
    if text.trim().is_empty() {
        return EMPTY_INPUT.to_string();
    }
    let points = extract_key_points(text);
    let mut output = String::new();

    match style {
        SummaryStyle::Bullet => {
            for point in &points {
                let _ = writeln!(output, "- {point}");
            }
        }
        SummaryStyle::TlDr => {
            let head: Vec<&str> = points.iter().take(3).map(String::as_str).collect();
            let _ = writeln!(output, "TL;DR: {}.", head.join("; "));
        }
        SummaryStyle::Outline => {
            for (index, point) in points.iter().enumerate() {
                let _ = writeln!(output, "{}. Topic: {point}", index + 1);
            }
        }
    }

    output
}
