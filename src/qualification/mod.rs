//! Controller qualification engine.
//!
//! Decides, for a controller and an airport (or a whole multi-airport
//! event), the highest station group they are authorized to work and the
//! caveats attached to it, from their rating, endorsements, still-valid
//! solos, and FIR familiarizations. Tier-1 airports run a stricter rule
//! regime than standard fields.

pub mod aggregate;
pub mod domain;
pub mod engine;
pub mod import;
pub mod position;
pub mod provider;
pub mod router;
pub mod service;
pub mod tier;

#[cfg(test)]
mod tests;

pub use aggregate::aggregate;
pub use domain::{
    AirportQualification, ControllerId, ControllerRef, Endorsement, Familiarization,
    MultiAirportQualification, Qualification, QualificationEvidence, Rating, Restriction, Solo,
    TrainingRecords, UnknownRating,
};
pub use engine::{evaluate, evaluate_non_tier1, evaluate_tier1, EvaluationContext};
pub use import::{CsvTrainingStore, TrainingImportError};
pub use position::{extract_group, filter_for_airport, highest_of, in_scope, Position, StationGroup};
pub use provider::{ProviderError, TrainingRecordProvider};
pub use router::qualification_router;
pub use service::{QualificationError, QualificationService, SignupEntry, SignupSnapshot};
pub use tier::{AirportDirectory, AirportTier};
