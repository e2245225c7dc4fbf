use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::position::{Position, StationGroup};

/// Identifier wrapper for controller accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControllerId(pub String);

/// Network certification levels, carried as the network's integer ids on
/// the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Rating {
    Observer,
    Student1,
    Student2,
    SeniorStudent,
    Controller1,
    Controller2,
    Controller3,
    Instructor1,
    Instructor2,
    Instructor3,
    Supervisor,
    Administrator,
}

impl Rating {
    pub const fn value(self) -> u8 {
        match self {
            Rating::Observer => 1,
            Rating::Student1 => 2,
            Rating::Student2 => 3,
            Rating::SeniorStudent => 4,
            Rating::Controller1 => 5,
            Rating::Controller2 => 6,
            Rating::Controller3 => 7,
            Rating::Instructor1 => 8,
            Rating::Instructor2 => 9,
            Rating::Instructor3 => 10,
            Rating::Supervisor => 11,
            Rating::Administrator => 12,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Rating::Observer => "OBS",
            Rating::Student1 => "S1",
            Rating::Student2 => "S2",
            Rating::SeniorStudent => "S3",
            Rating::Controller1 => "C1",
            Rating::Controller2 => "C2",
            Rating::Controller3 => "C3",
            Rating::Instructor1 => "I1",
            Rating::Instructor2 => "I2",
            Rating::Instructor3 => "I3",
            Rating::Supervisor => "SUP",
            Rating::Administrator => "ADM",
        }
    }

    /// Direct rating-to-group mapping used on non-Tier-1 airports.
    /// Observers map to nothing at all.
    pub const fn base_group(self) -> Option<StationGroup> {
        match self {
            Rating::Observer => None,
            Rating::Student1 => Some(StationGroup::Ground),
            Rating::Student2 => Some(StationGroup::Tower),
            Rating::SeniorStudent => Some(StationGroup::Approach),
            _ => Some(StationGroup::Center),
        }
    }

    /// C1 and above: the familiarization gate applies to these ratings.
    pub const fn is_controller_rating(self) -> bool {
        self.value() >= Rating::Controller1.value()
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.value()
    }
}

/// Raised when the caller supplies a rating id outside the known table.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown rating id {0}")]
pub struct UnknownRating(pub u8);

impl TryFrom<u8> for Rating {
    type Error = UnknownRating;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Rating::Observer),
            2 => Ok(Rating::Student1),
            3 => Ok(Rating::Student2),
            4 => Ok(Rating::SeniorStudent),
            5 => Ok(Rating::Controller1),
            6 => Ok(Rating::Controller2),
            7 => Ok(Rating::Controller3),
            8 => Ok(Rating::Instructor1),
            9 => Ok(Rating::Instructor2),
            10 => Ok(Rating::Instructor3),
            11 => Ok(Rating::Supervisor),
            12 => Ok(Rating::Administrator),
            other => Err(UnknownRating(other)),
        }
    }
}

/// Minimal controller identity and rating pair supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerRef {
    pub id: ControllerId,
    pub rating: Rating,
}

/// Permanent certification for a specific station. No expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endorsement {
    pub position: Position,
}

/// Temporary, time-boxed authorization, potentially above the controller's
/// permanent ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solo {
    pub position: Position,
    pub expires_at: DateTime<Utc>,
}

/// Completed area-familiarization training for a sector within a FIR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Familiarization {
    pub fir: String,
    pub sector: String,
}

/// A controller's full training record set as supplied by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingRecords {
    pub endorsements: Vec<Endorsement>,
    pub solos: Vec<Solo>,
    pub familiarizations: Vec<Familiarization>,
}

/// Machine-readable caveat attached to a qualification.
///
/// Restrictions are additive documentation: they never widen the computed
/// group, which stays the single source of truth for authorization
/// decisions downstream. Display strings are rendered only at the boundary
/// via [`Restriction::summary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Restriction {
    /// A solo authorization granted the group; it expires.
    SoloUntil {
        sector: Option<String>,
        expires_on: NaiveDate,
    },
    /// Center coverage limited to the familiarized sectors.
    SectorsOnly { sectors: Vec<String> },
    /// Center-qualified without an approach endorsement at this airport.
    NoApproach,
}

impl Restriction {
    pub fn summary(&self) -> String {
        match self {
            Restriction::SoloUntil {
                sector: Some(sector),
                expires_on,
            } => format!("solo: {sector} bis {}", expires_on.format("%d.%m.%Y")),
            Restriction::SoloUntil {
                sector: None,
                expires_on,
            } => format!("solo: bis {}", expires_on.format("%d.%m.%Y")),
            Restriction::SectorsOnly { sectors } => format!("{} only", sectors.join(", ")),
            Restriction::NoApproach => "no APP".to_string(),
        }
    }
}

/// Records considered while computing a qualification, retained for audit
/// and debugging. Never used for authorization decisions downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualificationEvidence {
    pub endorsements: Vec<String>,
    pub solos: Vec<String>,
    pub familiarizations: Vec<String>,
}

/// Authorization ceiling for one controller at one airport. A `None` group
/// is the expected not-authorized outcome, never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qualification {
    pub group: Option<StationGroup>,
    pub restrictions: Vec<Restriction>,
    pub evidence: QualificationEvidence,
}

impl Qualification {
    pub fn not_authorized(evidence: QualificationEvidence) -> Self {
        Self {
            group: None,
            restrictions: Vec::new(),
            evidence,
        }
    }

    pub fn can_control(&self) -> bool {
        self.group.is_some()
    }

    pub fn restriction_summaries(&self) -> Vec<String> {
        self.restrictions
            .iter()
            .map(Restriction::summary)
            .collect()
    }
}

/// Per-airport entry in a multi-airport evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirportQualification {
    pub airport: String,
    pub can_control: bool,
    pub group: Option<StationGroup>,
    pub restrictions: Vec<Restriction>,
}

/// Reduction of per-airport results for a multi-airport event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiAirportQualification {
    pub airports: Vec<AirportQualification>,
    pub highest_group: Option<StationGroup>,
    pub evidence: QualificationEvidence,
}
