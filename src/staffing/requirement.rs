use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};

/// Minimum-staffing rules for an event window, keyed by callsign pattern:
/// each entry requires at least that many booked callsigns matching it.
pub type RequirementMap = BTreeMap<String, u32>;

#[derive(Debug, thiserror::Error)]
pub enum StaffingError {
    #[error("invalid staffing pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
}

/// Callsigns are matched case-insensitively; event configs are typed by
/// hand and casing varies.
pub(crate) fn compile_pattern(pattern: &str) -> Result<Regex, StaffingError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| StaffingError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiled_patterns_ignore_case() {
        let regex = compile_pattern("EDDF_._TWR").expect("valid pattern");
        assert!(regex.is_match("eddf_n_twr"));
        assert!(!regex.is_match("EDDF_TWR"));
    }

    #[test]
    fn broken_patterns_surface_the_offending_source() {
        match compile_pattern("EDDF_[") {
            Err(StaffingError::InvalidPattern { pattern, .. }) => {
                assert_eq!(pattern, "EDDF_[");
            }
            other => panic!("expected invalid-pattern error, got {other:?}"),
        }
    }
}
