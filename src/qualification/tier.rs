use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Airport classification deciding which rule path applies. Tier-1 fields
/// are busy or complex enough that a rating alone never grants a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirportTier {
    Tier1,
    Standard,
}

/// Fields currently requiring an explicit endorsement.
const TIER1_AIRPORTS: &[&str] = &[
    "EDDB", "EDDF", "EDDH", "EDDK", "EDDL", "EDDM", "EDDS",
];

/// Static tier lookup. The production table seeds [`Default`]; tests and
/// deployments with a different endorsement policy construct their own set.
#[derive(Debug, Clone)]
pub struct AirportDirectory {
    tier1: BTreeSet<String>,
}

impl Default for AirportDirectory {
    fn default() -> Self {
        Self::with_tier1(TIER1_AIRPORTS.iter().map(|airport| airport.to_string()))
    }
}

impl AirportDirectory {
    pub fn with_tier1<I>(airports: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            tier1: airports
                .into_iter()
                .map(|airport| airport.to_ascii_uppercase())
                .collect(),
        }
    }

    pub fn is_tier1(&self, airport: &str) -> bool {
        self.tier1.contains(&airport.to_ascii_uppercase())
    }

    pub fn tier_of(&self, airport: &str) -> AirportTier {
        if self.is_tier1(airport) {
            AirportTier::Tier1
        } else {
            AirportTier::Standard
        }
    }
}
