use crate::types::{ConfidenceLevel, Presentation, ScanVerdict, Severity};
use time::{format_description::well_known, OffsetDateTime};

/// Map a service verdict to a presentation model.
///
/// Pure apart from the `scanned_at` wall-clock stamp: severity comes from a
/// case-insensitive substring match on the label ("phishing" wins over
/// "suspicious"; anything else is treated as safe), the confidence percentage
/// is `phishing_probability * 100` for every branch, and risk factors pass
/// through in order. Every string that came off the wire is HTML-escaped on
/// the way in.
pub fn classify(verdict: &ScanVerdict) -> Presentation {
    let label = verdict.result.to_lowercase();

    let severity = if label.contains("phishing") {
        Severity::Phishing
    } else if label.contains("suspicious") {
        Severity::Suspicious
    } else {
        // "legitimate", "whitelisted", and unrecognized labels all land here.
        Severity::Safe
    };

    let (title, color_token) = match severity {
        Severity::Phishing => ("Phishing detected", "danger"),
        Severity::Suspicious => ("Suspicious URL", "warning"),
        Severity::Safe => ("Safe URL", "success"),
    };

    // The percentage itself is never inverted; only the tag changes.
    let confidence_percent = verdict.phishing_probability * 100.0;
    let confidence_tag = if label.contains("legitimate") || label.contains("whitelisted") {
        "Legitimate"
    } else {
        "Risk"
    };

    Presentation {
        severity,
        title: title.to_string(),
        color_token,
        confidence_percent,
        confidence_level: confidence_level(confidence_percent),
        confidence_tag,
        detail: escape_html(&verdict.result),
        url: escape_html(&verdict.url),
        risk_factors: verdict
            .advanced_risk_factors
            .iter()
            .map(|f| escape_html(f))
            .collect(),
        scanned_at: now_rfc3339(),
    }
}

/// Map a user-facing error message to a phishing-styled error card.
pub fn classify_error(message: &str) -> Presentation {
    Presentation {
        severity: Severity::Phishing,
        title: "Error".to_string(),
        color_token: "danger",
        confidence_percent: 0.0,
        confidence_level: ConfidenceLevel::VeryLow,
        confidence_tag: "",
        detail: escape_html(message),
        url: String::new(),
        risk_factors: Vec::new(),
        scanned_at: now_rfc3339(),
    }
}

fn now_rfc3339() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}

/// Bucket a percentage into a qualitative level. Inclusive lower bounds,
/// checked top-down.
pub fn confidence_level(percent: f64) -> ConfidenceLevel {
    if percent >= 90.0 {
        ConfidenceLevel::VeryHigh
    } else if percent >= 75.0 {
        ConfidenceLevel::High
    } else if percent >= 60.0 {
        ConfidenceLevel::Medium
    } else if percent >= 40.0 {
        ConfidenceLevel::Low
    } else {
        ConfidenceLevel::VeryLow
    }
}

/// Escape text for safe embedding in HTML markup.
///
/// Applied to every remote- or user-supplied string before it enters a
/// `Presentation`; a compromised classification service must not be able to
/// inject markup through a label or risk factor.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(result: &str, probability: f64, factors: &[&str]) -> ScanVerdict {
        ScanVerdict {
            url: "https://example.test/login".to_string(),
            result: result.to_string(),
            phishing_probability: probability,
            advanced_risk_factors: factors.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn phishing_label_classifies_as_phishing() {
        let p = classify(&verdict("Phishing - Malicious", 0.97, &["a", "b"]));
        assert_eq!(p.severity, Severity::Phishing);
        assert_eq!(p.confidence_percent, 97.0);
        assert_eq!(p.confidence_level, ConfidenceLevel::VeryHigh);
        assert_eq!(p.risk_factors, vec!["a", "b"]);
        assert_eq!(p.confidence_tag, "Risk");
        assert_eq!(p.color_token, "danger");
    }

    #[test]
    fn legitimate_label_classifies_as_safe() {
        let p = classify(&verdict("Legitimate", 0.02, &[]));
        assert_eq!(p.severity, Severity::Safe);
        assert_eq!(p.confidence_percent, 2.0);
        assert!(p.risk_factors.is_empty());
        assert_eq!(p.confidence_tag, "Legitimate");
    }

    #[test]
    fn suspicious_label_with_no_factors() {
        let p = classify(&verdict("Suspicious", 0.65, &[]));
        assert_eq!(p.severity, Severity::Suspicious);
        assert_eq!(p.confidence_level, ConfidenceLevel::Medium);
        assert!(p.risk_factors.is_empty());
    }

    #[test]
    fn phishing_wins_over_suspicious_in_combined_labels() {
        let p = classify(&verdict("suspicious phishing redirect", 0.5, &[]));
        assert_eq!(p.severity, Severity::Phishing);
    }

    #[test]
    fn unrecognized_label_defaults_to_safe() {
        let p = classify(&verdict("Error: model unavailable", 0.0, &[]));
        assert_eq!(p.severity, Severity::Safe);
        assert_eq!(p.confidence_tag, "Risk");
    }

    #[test]
    fn whitelisted_label_is_safe_and_tagged_legitimate() {
        let p = classify(&verdict("LEGITIMATE (WHITELISTED)", 1.0, &[]));
        assert_eq!(p.severity, Severity::Safe);
        assert_eq!(p.confidence_tag, "Legitimate");
        // Same formula as every other branch.
        assert_eq!(p.confidence_percent, 100.0);
    }

    #[test]
    fn confidence_buckets_are_inclusive_lower_bounds() {
        assert_eq!(confidence_level(90.0), ConfidenceLevel::VeryHigh);
        assert_eq!(confidence_level(89.9), ConfidenceLevel::High);
        assert_eq!(confidence_level(75.0), ConfidenceLevel::High);
        assert_eq!(confidence_level(60.0), ConfidenceLevel::Medium);
        assert_eq!(confidence_level(59.9), ConfidenceLevel::Low);
        assert_eq!(confidence_level(40.0), ConfidenceLevel::Low);
        assert_eq!(confidence_level(39.9), ConfidenceLevel::VeryLow);
        assert_eq!(confidence_level(0.0), ConfidenceLevel::VeryLow);
    }

    #[test]
    fn remote_text_is_escaped() {
        let p = classify(&verdict(
            "<script>alert(1)</script>",
            0.5,
            &["<img src=x onerror=alert(1)>", "a&b"],
        ));
        assert!(!p.detail.contains('<') && !p.detail.contains('>'));
        assert_eq!(p.risk_factors[1], "a&amp;b");
        for f in &p.risk_factors {
            assert!(!f.contains('<') && !f.contains('>'));
        }
    }

    #[test]
    fn error_card_is_phishing_styled_with_escaped_message() {
        let p = classify_error("Failed to scan <URL>. Please try again.");
        assert_eq!(p.severity, Severity::Phishing);
        assert_eq!(p.title, "Error");
        assert_eq!(p.detail, "Failed to scan &lt;URL&gt;. Please try again.");
        assert!(p.risk_factors.is_empty());
        assert_eq!(p.confidence_tag, "");
    }

    #[test]
    fn presentations_carry_a_scan_timestamp() {
        let p = classify(&verdict("Legitimate", 0.1, &[]));
        assert!(p.scanned_at.contains('T'), "not RFC3339: {}", p.scanned_at);
        assert!(p.scanned_at.ends_with('Z'));

        let e = classify_error("Failed to scan URL. Please try again.");
        assert!(!e.scanned_at.is_empty());
    }

    #[test]
    fn share_text_names_the_severity() {
        let p = classify(&verdict("PHISHING", 0.9, &[]));
        assert!(p.share_text().contains("PHISHING"));
        let p = classify(&verdict("Legitimate", 0.1, &[]));
        assert!(p.share_text().contains("SAFE"));
    }
}
