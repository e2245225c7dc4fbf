use std::future::Future;

use super::domain::{ControllerId, TrainingRecords};

/// Upstream failure fetching training records. Always a hard failure for
/// the evaluation: the engine never substitutes a default authorization.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("training record store unavailable: {0}")]
    Unavailable(String),
    #[error("training record store returned malformed data: {0}")]
    Malformed(String),
}

/// Source of endorsement, solo, and familiarization records, refreshed
/// from the external training provider on a cadence decided elsewhere.
///
/// Absence of records is a valid response (an empty set); only transport
/// or data faults surface as errors.
pub trait TrainingRecordProvider: Send + Sync {
    fn records_for(
        &self,
        controller: &ControllerId,
    ) -> impl Future<Output = Result<TrainingRecords, ProviderError>> + Send;
}
