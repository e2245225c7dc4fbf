use super::common::*;
use crate::qualification::aggregate::aggregate;
use crate::qualification::domain::Rating;
use crate::qualification::position::StationGroup;
use crate::qualification::tier::AirportDirectory;

#[test]
fn empty_airport_lists_are_a_valid_event_shape() {
    let result = aggregate(
        Rating::Student2,
        &records(vec![], vec![], vec![]),
        &[],
        None,
        now(),
        &AirportDirectory::default(),
    );

    assert!(result.airports.is_empty());
    assert_eq!(result.highest_group, None);
}

#[test]
fn tier_regimes_apply_per_airport() {
    let result = aggregate(
        Rating::Student2,
        &records(vec![], vec![], vec![]),
        &["EDDW".to_string(), "EDDF".to_string()],
        None,
        now(),
        &AirportDirectory::default(),
    );

    assert_eq!(result.airports.len(), 2);

    let standard = &result.airports[0];
    assert_eq!(standard.airport, "EDDW");
    assert!(standard.can_control);
    assert_eq!(standard.group, Some(StationGroup::Tower));

    let tier1 = &result.airports[1];
    assert_eq!(tier1.airport, "EDDF");
    assert!(!tier1.can_control);
    assert_eq!(tier1.group, None);

    assert_eq!(result.highest_group, Some(StationGroup::Tower));
}

#[test]
fn highest_group_ranks_only_controllable_airports() {
    let training = records(
        vec![endorsement("EDDM_APP")],
        vec![],
        vec![],
    );
    let result = aggregate(
        Rating::Student2,
        &training,
        &["EDDM".to_string(), "EDDW".to_string()],
        None,
        now(),
        &AirportDirectory::default(),
    );

    // Tier-1 EDDM via endorsement outranks the rating-derived TWR at EDDW.
    assert_eq!(result.highest_group, Some(StationGroup::Approach));
}

#[test]
fn evidence_is_merged_without_duplicates() {
    let training = records(
        vec![endorsement("EDMM_ALB_CTR")],
        vec![],
        vec![familiarization("EDMM", "ALB")],
    );
    let result = aggregate(
        Rating::SeniorStudent,
        &training,
        &["EDDW".to_string(), "EDDN".to_string()],
        Some("EDMM"),
        now(),
        &AirportDirectory::default(),
    );

    // The FIR-scoped center endorsement is relevant at both airports but
    // listed once.
    assert_eq!(result.evidence.endorsements, vec!["EDMM_ALB_CTR".to_string()]);
    assert_eq!(result.evidence.familiarizations, vec!["ALB".to_string()]);
}
