use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use crate::cache::{Clock, DerivedCache};
use crate::staffing::{validate_assignment, AssignmentVerdict, StationSlot};

use super::aggregate::aggregate;
use super::domain::{ControllerId, ControllerRef, MultiAirportQualification, Qualification, Rating};
use super::engine::{evaluate, EvaluationContext};
use super::provider::{ProviderError, TrainingRecordProvider};
use super::tier::AirportDirectory;

/// Errors surfaced by the qualification facade. Upstream data failures stay
/// hard failures: no evaluation ever degrades to a default authorization.
#[derive(Debug, thiserror::Error)]
pub enum QualificationError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// One roster line in a cached signup snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupEntry {
    pub controller: ControllerId,
    pub rating: Rating,
    pub qualification: MultiAirportQualification,
}

/// Per-occurrence signup list with every controller's qualification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupSnapshot {
    pub occurrence: String,
    pub computed_at: DateTime<Utc>,
    pub entries: Vec<SignupEntry>,
}

/// Facade composing the training-record provider, the airport tier
/// directory, the clock, and the derived-value cache.
pub struct QualificationService<P> {
    provider: Arc<P>,
    directory: AirportDirectory,
    clock: Arc<dyn Clock>,
    signup_cache: DerivedCache<SignupSnapshot>,
}

impl<P> QualificationService<P>
where
    P: TrainingRecordProvider + 'static,
{
    pub fn new(provider: Arc<P>, clock: Arc<dyn Clock>, cache_ttl: Duration) -> Self {
        Self::with_directory(provider, AirportDirectory::default(), clock, cache_ttl)
    }

    pub fn with_directory(
        provider: Arc<P>,
        directory: AirportDirectory,
        clock: Arc<dyn Clock>,
        cache_ttl: Duration,
    ) -> Self {
        let signup_cache = DerivedCache::new(cache_ttl, clock.clone());
        Self {
            provider,
            directory,
            clock,
            signup_cache,
        }
    }

    /// Highest authorized group for one controller at one airport.
    pub async fn evaluate(
        &self,
        controller: &ControllerRef,
        airport: &str,
        fir: Option<&str>,
    ) -> Result<Qualification, QualificationError> {
        let records = self.provider.records_for(&controller.id).await?;
        let ctx = EvaluationContext {
            airport,
            fir,
            now: self.clock.now(),
        };
        Ok(evaluate(
            controller.rating,
            &records,
            ctx,
            self.directory.tier_of(airport),
        ))
    }

    /// Per-airport results plus the highest controllable group across the
    /// event's airports.
    pub async fn evaluate_multi(
        &self,
        controller: &ControllerRef,
        airports: &[String],
        fir: Option<&str>,
    ) -> Result<MultiAirportQualification, QualificationError> {
        let records = self.provider.records_for(&controller.id).await?;
        Ok(aggregate(
            controller.rating,
            &records,
            airports,
            fir,
            self.clock.now(),
            &self.directory,
        ))
    }

    /// Signup list for an occurrence, cached under its scope key.
    ///
    /// Record fetches for the roster run concurrently; a single provider
    /// failure fails the whole snapshot.
    pub async fn signup_snapshot(
        &self,
        occurrence: &str,
        roster: &[ControllerRef],
        airports: &[String],
        fir: Option<&str>,
    ) -> Result<SignupSnapshot, QualificationError> {
        self.signup_cache
            .get_or_compute(occurrence, || {
                self.compute_snapshot(occurrence, roster, airports, fir)
            })
            .await
    }

    async fn compute_snapshot(
        &self,
        occurrence: &str,
        roster: &[ControllerRef],
        airports: &[String],
        fir: Option<&str>,
    ) -> Result<SignupSnapshot, QualificationError> {
        let fetches = roster
            .iter()
            .map(|controller| self.provider.records_for(&controller.id));
        let record_sets = try_join_all(fetches).await?;

        let now = self.clock.now();
        let entries = roster
            .iter()
            .zip(record_sets)
            .map(|(controller, records)| SignupEntry {
                controller: controller.id.clone(),
                rating: controller.rating,
                qualification: aggregate(
                    controller.rating,
                    &records,
                    airports,
                    fir,
                    now,
                    &self.directory,
                ),
            })
            .collect();

        Ok(SignupSnapshot {
            occurrence: occurrence.to_string(),
            computed_at: now,
            entries,
        })
    }

    /// Invalidation hook for signup writes and roster publishes. Returns
    /// the advanced last-update watermark.
    pub fn invalidate_signups(&self, occurrence: &str) -> DateTime<Utc> {
        self.signup_cache.invalidate(occurrence)
    }

    /// Watermark for "has this occurrence changed since T" polling.
    pub fn last_update(&self, occurrence: &str) -> Option<DateTime<Utc>> {
        self.signup_cache.last_update(occurrence)
    }

    /// Check a proposed station assignment against the controller's
    /// computed group at the station's airport.
    pub async fn validate_assignment(
        &self,
        controller: &ControllerRef,
        station: &StationSlot,
        airport: &str,
        fir: Option<&str>,
    ) -> Result<AssignmentVerdict, QualificationError> {
        let qualification = self.evaluate(controller, airport, fir).await?;
        Ok(validate_assignment(qualification.group, station))
    }
}
