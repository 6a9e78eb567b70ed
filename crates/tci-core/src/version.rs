//! Version string validation.
//!
//! Accepts anything that contains `X.Y.Z` (three dot-separated digit runs).
//! The match is unanchored on both ends, so `9.0.65-M1` and `v9.0.65` pass.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

/// Returned when a version string has no `X.Y.Z` core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("the version must be in X.Y.Z format, got {0:?}")]
pub struct InvalidVersion(pub String);

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d+)\.(\d+)\.(\d+)").expect("static regex"))
}

/// Checks `version` before any network or filesystem work happens.
pub fn validate(version: &str) -> Result<(), InvalidVersion> {
    if pattern().is_match(version) {
        Ok(())
    } else {
        Err(InvalidVersion(version.to_string()))
    }
}

/// A validated version string.
///
/// `raw` is kept verbatim: it is what goes into URIs and directory names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Version {
    raw: String,
    major: String,
    minor: String,
    patch: String,
}

impl Version {
    pub fn parse(raw: &str) -> Result<Self, InvalidVersion> {
        let caps = pattern()
            .captures(raw)
            .ok_or_else(|| InvalidVersion(raw.to_string()))?;
        Ok(Self {
            raw: raw.to_string(),
            major: caps[1].to_string(),
            minor: caps[2].to_string(),
            patch: caps[3].to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn major(&self) -> &str {
        &self.major
    }

    pub fn minor(&self) -> &str {
        &self.minor
    }

    pub fn patch(&self) -> &str {
        &self.patch
    }

    /// First dot-delimited segment of the raw string (`"9"` for `"9.0.65"`).
    /// Used for the `tomcat-{major}` mirror directory.
    pub fn major_segment(&self) -> &str {
        self.raw.split('.').next().unwrap_or(&self.raw)
    }

    /// Raw string with dots replaced by underscores, for directory names.
    pub fn underscored(&self) -> String {
        self.raw.replace('.', "_")
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_versions() {
        for v in ["9.0.65", "10.1.7", "8.5.100", "0.0.0", "123.456.789"] {
            assert!(validate(v).is_ok(), "{v} should be valid");
        }
    }

    #[test]
    fn tolerates_surrounding_characters() {
        for v in ["9.0.65-M1", "9.0.65.1", "v9.0.65", "9.0.65 "] {
            assert!(validate(v).is_ok(), "{v} should be valid");
        }
    }

    #[test]
    fn rejects_missing_groups() {
        for v in ["", "9", "9.0", "9.0.", "a.b.c", "9..65", ".0.65", "9-0-65", "latest"] {
            let err = validate(v).unwrap_err();
            assert_eq!(err.0, v);
        }
    }

    #[test]
    fn error_message_names_the_value() {
        let err = validate("9.x").unwrap_err();
        assert_eq!(
            err.to_string(),
            "the version must be in X.Y.Z format, got \"9.x\""
        );
    }

    #[test]
    fn parse_extracts_components() {
        let v = Version::parse("9.0.65").unwrap();
        assert_eq!(v.major(), "9");
        assert_eq!(v.minor(), "0");
        assert_eq!(v.patch(), "65");
        assert_eq!(v.major_segment(), "9");
        assert_eq!(v.underscored(), "9_0_65");
        assert_eq!(v.to_string(), "9.0.65");
    }

    #[test]
    fn parse_keeps_raw_with_suffix() {
        let v = Version::parse("10.1.0-M17").unwrap();
        assert_eq!(v.as_str(), "10.1.0-M17");
        assert_eq!(v.major(), "10");
        assert_eq!(v.patch(), "0");
        assert_eq!(v.underscored(), "10_1_0-M17");
    }

    #[test]
    fn parse_rejects_invalid() {
        assert_eq!(
            Version::parse("nine").unwrap_err(),
            InvalidVersion("nine".to_string())
        );
    }
}
