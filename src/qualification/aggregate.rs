use chrono::{DateTime, Utc};

use super::domain::{
    AirportQualification, MultiAirportQualification, QualificationEvidence, Rating,
    TrainingRecords,
};
use super::engine::{evaluate, EvaluationContext};
use super::position::StationGroup;
use super::tier::AirportDirectory;

/// Run the rule engine once per event airport and fold the results.
///
/// Airport evaluations are mutually independent; an empty airport list is a
/// valid event shape and yields an empty result with no highest group.
pub fn aggregate(
    rating: Rating,
    records: &TrainingRecords,
    airports: &[String],
    fir: Option<&str>,
    now: DateTime<Utc>,
    directory: &AirportDirectory,
) -> MultiAirportQualification {
    let mut per_airport = Vec::with_capacity(airports.len());
    let mut highest_group: Option<StationGroup> = None;
    let mut evidence = QualificationEvidence::default();

    for airport in airports {
        let ctx = EvaluationContext {
            airport,
            fir,
            now,
        };
        let qualification = evaluate(rating, records, ctx, directory.tier_of(airport));

        if let Some(group) = qualification.group {
            if highest_group.map_or(true, |current| group > current) {
                highest_group = Some(group);
            }
        }

        merge_unique(&mut evidence.endorsements, &qualification.evidence.endorsements);
        merge_unique(&mut evidence.solos, &qualification.evidence.solos);
        merge_unique(
            &mut evidence.familiarizations,
            &qualification.evidence.familiarizations,
        );

        per_airport.push(AirportQualification {
            airport: airport.clone(),
            can_control: qualification.can_control(),
            group: qualification.group,
            restrictions: qualification.restrictions,
        });
    }

    MultiAirportQualification {
        airports: per_airport,
        highest_group,
        evidence,
    }
}

fn merge_unique(into: &mut Vec<String>, items: &[String]) {
    for item in items {
        if !into.contains(item) {
            into.push(item.clone());
        }
    }
}
