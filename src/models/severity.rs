use serde::{Deserialize, Serialize};

/// Severity bucket for a vulnerability finding, ordered from most to least
/// severe. Every scanner-reported severity normalizes into exactly one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Informational,
}

impl Severity {
    /// Normalize a raw severity value from scanner output.
    ///
    /// Numeric codes map 5..1 onto Critical..Informational. String values
    /// match case-insensitively on CRIT/HIGH/MED/LOW/INFO substrings.
    /// Anything unrecognized lands on Medium.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim() {
            "5" => return Self::Critical,
            "4" => return Self::High,
            "3" => return Self::Medium,
            "2" => return Self::Low,
            "1" => return Self::Informational,
            _ => {}
        }

        let upper = raw.to_uppercase();
        if upper.contains("CRIT") {
            Self::Critical
        } else if upper.contains("HIGH") {
            Self::High
        } else if upper.contains("MED") {
            Self::Medium
        } else if upper.contains("LOW") {
            Self::Low
        } else if upper.contains("INFO") {
            Self::Informational
        } else {
            Self::Medium
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
            Self::Informational => "INFORMATIONAL",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_numeric_codes() {
        assert_eq!(Severity::normalize("5"), Severity::Critical);
        assert_eq!(Severity::normalize("4"), Severity::High);
        assert_eq!(Severity::normalize("3"), Severity::Medium);
        assert_eq!(Severity::normalize("2"), Severity::Low);
        assert_eq!(Severity::normalize("1"), Severity::Informational);
    }

    #[test]
    fn test_normalize_keyword_substrings() {
        assert_eq!(Severity::normalize("Critical"), Severity::Critical);
        assert_eq!(Severity::normalize("CRITICAL"), Severity::Critical);
        assert_eq!(Severity::normalize("high severity"), Severity::High);
        assert_eq!(Severity::normalize("medium"), Severity::Medium);
        assert_eq!(Severity::normalize("Low"), Severity::Low);
        assert_eq!(Severity::normalize("informational"), Severity::Informational);
        assert_eq!(Severity::normalize("info"), Severity::Informational);
    }

    #[test]
    fn test_normalize_unrecognized_defaults_medium() {
        assert_eq!(Severity::normalize("UNKNOWN"), Severity::Medium);
        assert_eq!(Severity::normalize(""), Severity::Medium);
        assert_eq!(Severity::normalize("7"), Severity::Medium);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["5", "HIGH", "meDiUm", "low", "INFO", "garbage"] {
            let first = Severity::normalize(raw);
            assert_eq!(Severity::normalize(first.as_str()), first);
        }
    }

    #[test]
    fn test_serialize_screaming_case() {
        assert_eq!(serde_json::to_string(&Severity::Informational).unwrap(), "\"INFORMATIONAL\"");
    }
}
