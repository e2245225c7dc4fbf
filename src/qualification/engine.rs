//! The tier-1 and non-tier-1 decision algorithms.
//!
//! Both paths are pure functions over a controller's rating and training
//! records. Missing records are a valid not-authorized input, never an
//! error; upstream fetch failures are handled before these functions run.

use chrono::{DateTime, Utc};

use super::domain::{
    Qualification, QualificationEvidence, Rating, Restriction, Solo, TrainingRecords,
};
use super::position::{highest_of, in_scope, Position, StationGroup};
use super::tier::AirportTier;

/// Inputs fixed for a single evaluation.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub airport: &'a str,
    pub fir: Option<&'a str>,
    /// Evaluation instant. Solos expiring at or before it are discarded
    /// here regardless of any pre-filtering the store may have done.
    pub now: DateTime<Utc>,
}

/// Dispatch on the airport tier.
pub fn evaluate(
    rating: Rating,
    records: &TrainingRecords,
    ctx: EvaluationContext<'_>,
    tier: AirportTier,
) -> Qualification {
    match tier {
        AirportTier::Tier1 => evaluate_tier1(rating, records, ctx),
        AirportTier::Standard => evaluate_non_tier1(rating, records, ctx),
    }
}

/// Non-Tier-1 path: the rating maps directly to a base group, a
/// higher-ranked valid solo overrides it, and for C1+ the familiarization
/// gate runs last and wins.
pub fn evaluate_non_tier1(
    rating: Rating,
    records: &TrainingRecords,
    ctx: EvaluationContext<'_>,
) -> Qualification {
    let solos = relevant_solos(records, ctx);
    let sectors = familiarized_sectors(records, ctx.fir);
    let evidence = collect_evidence(records, &solos, &sectors, ctx);

    let mut group = rating.base_group();
    let mut restrictions = Vec::new();

    if let Some(solo) = highest_solo(&solos) {
        if group.map_or(true, |held| solo.position.group() > held) {
            group = Some(solo.position.group());
            restrictions.push(solo_restriction(solo));
        }
    }

    if rating.is_controller_rating() {
        apply_familiarization_gate(&mut group, &mut restrictions, &sectors);
    }

    Qualification {
        group,
        restrictions,
        evidence,
    }
}

/// Tier-1 path: no rating-based default. The higher of the best
/// airport-relevant endorsement and solo wins; for C1+ the familiarization
/// gate then applies, with a `no APP` caveat when center coverage is not
/// backed by an approach endorsement at the field.
pub fn evaluate_tier1(
    rating: Rating,
    records: &TrainingRecords,
    ctx: EvaluationContext<'_>,
) -> Qualification {
    let endorsements: Vec<&Position> = records
        .endorsements
        .iter()
        .map(|endorsement| &endorsement.position)
        .filter(|position| in_scope(position, ctx.airport, ctx.fir))
        .collect();
    let best_endorsement = highest_of(endorsements.iter().copied());

    let solos = relevant_solos(records, ctx);
    let best_solo = highest_solo(&solos);

    let sectors = familiarized_sectors(records, ctx.fir);
    let evidence = collect_evidence(records, &solos, &sectors, ctx);

    let (mut group, mut restrictions) = match (best_endorsement, best_solo) {
        (None, None) => return Qualification::not_authorized(evidence),
        (Some(endorsement), None) => (Some(endorsement.group()), Vec::new()),
        (None, Some(solo)) => (Some(solo.position.group()), vec![solo_restriction(solo)]),
        (Some(endorsement), Some(solo)) => {
            if solo.position.group() > endorsement.group() {
                (Some(solo.position.group()), vec![solo_restriction(solo)])
            } else {
                (Some(endorsement.group()), Vec::new())
            }
        }
    };

    if rating.is_controller_rating() {
        apply_familiarization_gate(&mut group, &mut restrictions, &sectors);

        if matches!(group, Some(StationGroup::Center)) {
            let has_approach_endorsement = records.endorsements.iter().any(|endorsement| {
                endorsement.position.group() == StationGroup::Approach
                    && in_scope(&endorsement.position, ctx.airport, None)
            });
            if !has_approach_endorsement {
                restrictions.push(Restriction::NoApproach);
            }
        }
    }

    Qualification {
        group,
        restrictions,
        evidence,
    }
}

/// Familiarization gate for C1+ ratings. Overrides whatever the earlier
/// steps computed; restrictions accumulate and are never cleared.
///
/// Zero familiarized sectors denies center entirely, one or two limit
/// center to those sectors, three or more count as fully familiarized.
fn apply_familiarization_gate(
    group: &mut Option<StationGroup>,
    restrictions: &mut Vec<Restriction>,
    sectors: &[String],
) {
    match sectors.len() {
        0 => *group = Some(StationGroup::Approach),
        1 | 2 => {
            *group = Some(StationGroup::Center);
            restrictions.push(Restriction::SectorsOnly {
                sectors: sectors.to_vec(),
            });
        }
        _ => *group = Some(StationGroup::Center),
    }
}

/// Airport-relevant solos still valid at the evaluation instant.
fn relevant_solos<'a>(records: &'a TrainingRecords, ctx: EvaluationContext<'_>) -> Vec<&'a Solo> {
    records
        .solos
        .iter()
        .filter(|solo| solo.expires_at > ctx.now)
        .filter(|solo| in_scope(&solo.position, ctx.airport, ctx.fir))
        .collect()
}

fn highest_solo<'a>(solos: &[&'a Solo]) -> Option<&'a Solo> {
    solos.iter().copied().fold(None, |best, candidate| match best {
        Some(current) if candidate.position.group() > current.position.group() => Some(candidate),
        Some(current) => Some(current),
        None => Some(candidate),
    })
}

fn solo_restriction(solo: &Solo) -> Restriction {
    let sector = if solo.position.group() == StationGroup::Center {
        solo.position.sector().map(str::to_string)
    } else {
        None
    };

    Restriction::SoloUntil {
        sector,
        expires_on: solo.expires_at.date_naive(),
    }
}

/// Distinct familiarized sector names, scoped to the event FIR when one is
/// supplied. Without a FIR all familiarizations count, so a controller with
/// none anywhere is still gated.
fn familiarized_sectors(records: &TrainingRecords, fir: Option<&str>) -> Vec<String> {
    let mut sectors = Vec::new();
    for familiarization in &records.familiarizations {
        if fir.is_some_and(|fir| !familiarization.fir.eq_ignore_ascii_case(fir)) {
            continue;
        }
        if !sectors.contains(&familiarization.sector) {
            sectors.push(familiarization.sector.clone());
        }
    }
    sectors
}

fn collect_evidence(
    records: &TrainingRecords,
    solos: &[&Solo],
    sectors: &[String],
    ctx: EvaluationContext<'_>,
) -> QualificationEvidence {
    QualificationEvidence {
        endorsements: records
            .endorsements
            .iter()
            .filter(|endorsement| in_scope(&endorsement.position, ctx.airport, ctx.fir))
            .map(|endorsement| endorsement.position.raw().to_string())
            .collect(),
        solos: solos
            .iter()
            .map(|solo| solo.position.raw().to_string())
            .collect(),
        familiarizations: sectors.to_vec(),
    }
}
