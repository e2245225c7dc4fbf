use serde::{Deserialize, Serialize};

/// Station authorization level. Declaration order is rank order, so the
/// derived `Ord` gives GND < TWR < APP < CTR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StationGroup {
    #[serde(rename = "GND")]
    Ground,
    #[serde(rename = "TWR")]
    Tower,
    #[serde(rename = "APP")]
    Approach,
    #[serde(rename = "CTR")]
    Center,
}

impl StationGroup {
    pub const fn ordered() -> [Self; 4] {
        [Self::Ground, Self::Tower, Self::Approach, Self::Center]
    }

    pub const fn label(self) -> &'static str {
        match self {
            StationGroup::Ground => "GND",
            StationGroup::Tower => "TWR",
            StationGroup::Approach => "APP",
            StationGroup::Center => "CTR",
        }
    }

    const fn token(self) -> &'static str {
        match self {
            StationGroup::Ground => "_GND",
            StationGroup::Tower => "_TWR",
            StationGroup::Approach => "_APP",
            StationGroup::Center => "_CTR",
        }
    }
}

/// Classify a raw position identifier by its station token.
///
/// Checks `_GND`, `_TWR`, `_APP`, `_CTR` in that fixed order and returns the
/// first match. Identifiers without any station token fall back to `Ground`;
/// the fallback keeps malformed input lenient and is not a valid business
/// state, so callers must not rely on it for well-formed identifiers.
pub fn extract_group(position: &str) -> StationGroup {
    for group in StationGroup::ordered() {
        if position.contains(group.token()) {
            return group;
        }
    }
    StationGroup::Ground
}

/// A position identifier parsed once at the boundary.
///
/// Raw identifiers look like `EDDM_TWR`, `EDDF_N_APP`, or `EDMM_ALB_CTR`:
/// a scope prefix (airport or FIR), an optional sector segment, and the
/// station token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    raw: String,
    scope: String,
    sector: Option<String>,
    group: StationGroup,
}

impl Position {
    pub fn parse(raw: &str) -> Self {
        let group = extract_group(raw);
        let segments: Vec<&str> = raw.split('_').collect();
        let scope = segments.first().copied().unwrap_or_default().to_string();
        let sector = if segments.len() == 3 {
            Some(segments[1].to_string())
        } else {
            None
        };

        Self {
            raw: raw.to_string(),
            scope,
            sector,
            group,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn sector(&self) -> Option<&str> {
        self.sector.as_deref()
    }

    pub fn group(&self) -> StationGroup {
        self.group
    }
}

/// Whether `position` is relevant for an airport evaluation: prefixed with
/// the airport code, or (area control being FIR-scoped rather than
/// airport-scoped) prefixed with the FIR and ending in `_CTR`.
pub fn in_scope(position: &Position, airport: &str, fir: Option<&str>) -> bool {
    if has_scope_prefix(position.raw(), airport) {
        return true;
    }

    fir.is_some_and(|fir| has_scope_prefix(position.raw(), fir) && position.raw().ends_with("_CTR"))
}

fn has_scope_prefix(raw: &str, scope: &str) -> bool {
    raw.strip_prefix(scope)
        .is_some_and(|rest| rest.starts_with('_'))
}

/// Keep the airport-relevant subset of `positions`, preserving order.
pub fn filter_for_airport<'a>(
    positions: &'a [Position],
    airport: &str,
    fir: Option<&str>,
) -> Vec<&'a Position> {
    positions
        .iter()
        .filter(|position| in_scope(position, airport, fir))
        .collect()
}

/// The position whose group has the highest rank, first-seen on ties.
/// Empty input yields `None`.
pub fn highest_of<'a, I>(positions: I) -> Option<&'a Position>
where
    I: IntoIterator<Item = &'a Position>,
{
    positions.into_iter().fold(None, |best, candidate| match best {
        Some(current) if candidate.group() > current.group() => Some(candidate),
        Some(current) => Some(current),
        None => Some(candidate),
    })
}
