use serde::{Deserialize, Serialize};

use super::requirement::{compile_pattern, RequirementMap, StaffingError};
use crate::qualification::position::{extract_group, StationGroup};

/// Coverage of a single pattern requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternCoverage {
    pub pattern: String,
    pub required: u32,
    pub booked: u32,
    pub sufficient: bool,
}

/// Feasibility verdict over all requirements of an event window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffingReport {
    pub per_pattern: Vec<PatternCoverage>,
    pub is_feasible: bool,
}

/// Count booked callsigns against each pattern requirement.
///
/// This is a feasibility check, not a strict staffing model: overlapping
/// patterns may count one callsign toward several requirements. That is
/// intended, since a controller on a combined sector satisfies every
/// pattern that sector covers.
pub fn check_staffing(
    requirements: &RequirementMap,
    booked_callsigns: &[String],
) -> Result<StaffingReport, StaffingError> {
    let mut per_pattern = Vec::with_capacity(requirements.len());
    let mut is_feasible = true;

    for (pattern, &required) in requirements {
        let regex = compile_pattern(pattern)?;
        let booked = booked_callsigns
            .iter()
            .filter(|callsign| regex.is_match(callsign))
            .count() as u32;
        let sufficient = booked >= required;
        is_feasible &= sufficient;

        per_pattern.push(PatternCoverage {
            pattern: pattern.clone(),
            required,
            booked,
            sufficient,
        });
    }

    Ok(StaffingReport {
        per_pattern,
        is_feasible,
    })
}

/// A station slot on a published roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationSlot {
    pub callsign: String,
    /// Towers opened to S1 trainees; a GND-qualified controller may staff
    /// them despite the rank gap.
    #[serde(default)]
    pub trainee_tower: bool,
}

/// Outcome of checking a controller's computed group against a station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum AssignmentVerdict {
    Eligible,
    NotQualified {
        required: StationGroup,
        held: Option<StationGroup>,
    },
}

impl AssignmentVerdict {
    pub fn is_eligible(&self) -> bool {
        matches!(self, AssignmentVerdict::Eligible)
    }
}

/// Rank check for a specific assignment: the assignee's computed group must
/// reach the station's extracted group, except on trainee towers.
pub fn validate_assignment(
    held: Option<StationGroup>,
    station: &StationSlot,
) -> AssignmentVerdict {
    let required = extract_group(&station.callsign);

    match held {
        Some(group) if group >= required => AssignmentVerdict::Eligible,
        Some(StationGroup::Ground)
            if required == StationGroup::Tower && station.trainee_tower =>
        {
            AssignmentVerdict::Eligible
        }
        held => AssignmentVerdict::NotQualified { required, held },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn booked(callsigns: &[&str]) -> Vec<String> {
        callsigns.iter().map(|callsign| callsign.to_string()).collect()
    }

    #[test]
    fn reports_sufficiency_per_pattern() {
        let mut requirements = BTreeMap::new();
        requirements.insert("EDDF_._TWR".to_string(), 2);

        let report = check_staffing(
            &requirements,
            &booked(&["EDDF_N_TWR", "EDDF_S_TWR"]),
        )
        .expect("valid patterns");

        assert!(report.is_feasible);
        assert_eq!(report.per_pattern.len(), 1);
        assert_eq!(report.per_pattern[0].booked, 2);
        assert!(report.per_pattern[0].sufficient);
    }

    #[test]
    fn zero_required_is_always_sufficient() {
        let mut requirements = BTreeMap::new();
        requirements.insert("EDDF_APP".to_string(), 0);

        let report = check_staffing(&requirements, &[]).expect("valid patterns");
        assert!(report.is_feasible);
        assert!(report.per_pattern[0].sufficient);
    }

    #[test]
    fn a_shortfall_in_any_pattern_fails_feasibility() {
        let mut requirements = BTreeMap::new();
        requirements.insert("EDDF_._TWR".to_string(), 1);
        requirements.insert("EDDF_APP".to_string(), 1);

        let report =
            check_staffing(&requirements, &booked(&["EDDF_N_TWR"])).expect("valid patterns");

        assert!(!report.is_feasible);
        let approach = report
            .per_pattern
            .iter()
            .find(|coverage| coverage.pattern == "EDDF_APP")
            .expect("approach coverage present");
        assert_eq!(approach.booked, 0);
        assert!(!approach.sufficient);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let mut requirements = BTreeMap::new();
        requirements.insert("eddf_._twr".to_string(), 1);

        let report =
            check_staffing(&requirements, &booked(&["EDDF_N_TWR"])).expect("valid patterns");
        assert!(report.is_feasible);
    }

    #[test]
    fn overlapping_patterns_may_double_count_a_callsign() {
        let mut requirements = BTreeMap::new();
        requirements.insert("EDDF_.*".to_string(), 1);
        requirements.insert(".*_TWR".to_string(), 1);

        let report =
            check_staffing(&requirements, &booked(&["EDDF_N_TWR"])).expect("valid patterns");
        assert!(report.is_feasible);
        assert!(report.per_pattern.iter().all(|coverage| coverage.booked == 1));
    }

    #[test]
    fn assignment_requires_rank_sufficiency() {
        let station = StationSlot {
            callsign: "EDDF_APP".to_string(),
            trainee_tower: false,
        };

        assert!(validate_assignment(Some(StationGroup::Center), &station).is_eligible());
        assert!(validate_assignment(Some(StationGroup::Approach), &station).is_eligible());

        match validate_assignment(Some(StationGroup::Tower), &station) {
            AssignmentVerdict::NotQualified { required, held } => {
                assert_eq!(required, StationGroup::Approach);
                assert_eq!(held, Some(StationGroup::Tower));
            }
            other => panic!("expected not-qualified verdict, got {other:?}"),
        }

        assert!(!validate_assignment(None, &station).is_eligible());
    }

    #[test]
    fn trainee_towers_accept_ground_qualified_controllers() {
        let station = StationSlot {
            callsign: "EDDW_TWR".to_string(),
            trainee_tower: true,
        };
        assert!(validate_assignment(Some(StationGroup::Ground), &station).is_eligible());

        let strict = StationSlot {
            callsign: "EDDW_TWR".to_string(),
            trainee_tower: false,
        };
        assert!(!validate_assignment(Some(StationGroup::Ground), &strict).is_eligible());
    }
}
