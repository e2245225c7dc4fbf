use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

use crate::cache::Clock;
use crate::qualification::domain::{
    ControllerId, ControllerRef, Endorsement, Familiarization, Rating, Solo, TrainingRecords,
};
use crate::qualification::position::Position;
use crate::qualification::provider::{ProviderError, TrainingRecordProvider};
use crate::qualification::service::QualificationService;

pub(super) fn timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

pub(super) fn now() -> DateTime<Utc> {
    timestamp("2025-06-01T12:00:00Z")
}

pub(super) fn endorsement(raw: &str) -> Endorsement {
    Endorsement {
        position: Position::parse(raw),
    }
}

pub(super) fn solo(raw: &str, expires_at: &str) -> Solo {
    Solo {
        position: Position::parse(raw),
        expires_at: timestamp(expires_at),
    }
}

pub(super) fn familiarization(fir: &str, sector: &str) -> Familiarization {
    Familiarization {
        fir: fir.to_string(),
        sector: sector.to_string(),
    }
}

pub(super) fn records(
    endorsements: Vec<Endorsement>,
    solos: Vec<Solo>,
    familiarizations: Vec<Familiarization>,
) -> TrainingRecords {
    TrainingRecords {
        endorsements,
        solos,
        familiarizations,
    }
}

pub(super) fn controller(cid: &str, rating: Rating) -> ControllerRef {
    ControllerRef {
        id: ControllerId(cid.to_string()),
        rating,
    }
}

pub(super) struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub(super) fn starting_at(start: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(start),
        })
    }

    pub(super) fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("clock mutex poisoned");
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock mutex poisoned")
    }
}

/// Provider fake returning canned record sets and counting fetches, so
/// cache behavior is observable.
pub(super) struct StaticProvider {
    records: HashMap<ControllerId, TrainingRecords>,
    fetches: AtomicUsize,
}

impl StaticProvider {
    pub(super) fn with_records(
        entries: Vec<(ControllerId, TrainingRecords)>,
    ) -> Arc<Self> {
        Arc::new(Self {
            records: entries.into_iter().collect(),
            fetches: AtomicUsize::new(0),
        })
    }

    pub(super) fn empty() -> Arc<Self> {
        Self::with_records(Vec::new())
    }

    pub(super) fn fetches(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

impl TrainingRecordProvider for StaticProvider {
    async fn records_for(
        &self,
        controller: &ControllerId,
    ) -> Result<TrainingRecords, ProviderError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        Ok(self.records.get(controller).cloned().unwrap_or_default())
    }
}

/// Provider fake simulating a training store outage.
pub(super) struct FailingProvider;

impl TrainingRecordProvider for FailingProvider {
    async fn records_for(
        &self,
        _controller: &ControllerId,
    ) -> Result<TrainingRecords, ProviderError> {
        Err(ProviderError::Unavailable("training api offline".to_string()))
    }
}

pub(super) fn build_service(
    provider: Arc<StaticProvider>,
    clock: Arc<ManualClock>,
) -> QualificationService<StaticProvider> {
    QualificationService::new(provider, clock, Duration::hours(6))
}
