use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Verdict returned by the remote classification service for one URL.
///
/// The backend sends more fields than these (feature vectors, timings);
/// anything unknown is ignored on deserialization.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ScanVerdict {
    pub url: String,
    /// Free-form classification label, e.g. "PHISHING" or
    /// "LEGITIMATE (WHITELISTED)". Matched case-insensitively.
    pub result: String,
    /// Probability in [0, 1] as reported by the service.
    pub phishing_probability: f64,
    #[serde(default)]
    pub advanced_risk_factors: Vec<String>,
}

/// Three-way severity bucket derived from the free-text label.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Safe,
    Suspicious,
    Phishing,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Safe => "safe",
            Severity::Suspicious => "suspicious",
            Severity::Phishing => "phishing",
        }
    }
}

/// Qualitative bucket for a confidence percentage.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ConfidenceLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceLevel::VeryLow => "Very Low",
            ConfidenceLevel::Low => "Low",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::High => "High",
            ConfidenceLevel::VeryHigh => "Very High",
        }
    }
}

/// Renderer-agnostic description of what to display for one scan.
///
/// Immutable; a fresh one is produced per verdict or error. All text that
/// originated from the network or the user arrives here already HTML-escaped.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Presentation {
    pub severity: Severity,
    pub title: String,
    /// Styling token for the view layer: "success" | "warning" | "danger".
    pub color_token: &'static str,
    /// Always `phishing_probability * 100`, regardless of severity.
    pub confidence_percent: f64,
    pub confidence_level: ConfidenceLevel,
    /// "Legitimate" for legitimate/whitelisted labels, "Risk" otherwise,
    /// empty on error cards.
    pub confidence_tag: &'static str,
    /// Escaped label from the service, or the escaped error message.
    pub detail: String,
    /// Escaped URL that was scanned; empty on error cards.
    pub url: String,
    /// Escaped risk factor strings, order preserved.
    pub risk_factors: Vec<String>,
    /// RFC3339 UTC timestamp of when this presentation was built.
    pub scanned_at: String,
}

impl Presentation {
    /// Plain-text one-liner suitable for share/clipboard surfaces.
    pub fn share_text(&self) -> String {
        let verdict = match self.severity {
            Severity::Phishing => "PHISHING",
            Severity::Suspicious => "SUSPICIOUS",
            Severity::Safe => "SAFE",
        };
        format!("PhishGuard security scan result: {verdict}")
    }
}

/// Outputs the scan core hands to the surrounding view layer.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    ShowLoading,
    ShowResult(Presentation),
    ShowError(Presentation),
    CounterUpdated(u64),
}

/// Everything that can go wrong between submission and settlement.
///
/// Only `Validation` and `Transport` are ever surfaced; `Cancelled` and
/// `Persistence` are absorbed by the controller.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("request cancelled")]
    Cancelled,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("counter persistence failure: {0}")]
    Persistence(String),
}
