use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use std::io::Read;

use super::TrainingImportError;
use crate::qualification::domain::{Endorsement, Familiarization, Solo};
use crate::qualification::position::Position;

/// One record from the training provider's export, tagged with the
/// controller it belongs to.
#[derive(Debug)]
pub(crate) struct ParsedRecord {
    pub(crate) cid: String,
    pub(crate) record: ImportedRecord,
}

#[derive(Debug)]
pub(crate) enum ImportedRecord {
    Endorsement(Endorsement),
    Solo(Solo),
    Familiarization(Familiarization),
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<ParsedRecord>, TrainingImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for (index, record) in csv_reader.deserialize::<TrainingRow>().enumerate() {
        let row = record?;
        // Header row is line 1.
        let line = index + 2;
        records.push(ParsedRecord {
            cid: row.cid.clone(),
            record: row.into_record(line)?,
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct TrainingRow {
    cid: String,
    kind: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    position: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    fir: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    sector: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    expires_at: Option<String>,
}

impl TrainingRow {
    fn into_record(self, line: usize) -> Result<ImportedRecord, TrainingImportError> {
        match self.kind.to_ascii_lowercase().as_str() {
            "endorsement" => {
                let position = required(line, "endorsement", "position", self.position)?;
                Ok(ImportedRecord::Endorsement(Endorsement {
                    position: Position::parse(&position),
                }))
            }
            "solo" => {
                let position = required(line, "solo", "position", self.position)?;
                let raw_expiry = required(line, "solo", "expires_at", self.expires_at)?;
                let expires_at = parse_timestamp(&raw_expiry).ok_or_else(|| {
                    TrainingImportError::InvalidTimestamp {
                        line,
                        value: raw_expiry,
                    }
                })?;
                Ok(ImportedRecord::Solo(Solo {
                    position: Position::parse(&position),
                    expires_at,
                }))
            }
            "familiarization" => {
                let fir = required(line, "familiarization", "fir", self.fir)?;
                let sector = required(line, "familiarization", "sector", self.sector)?;
                Ok(ImportedRecord::Familiarization(Familiarization {
                    fir,
                    sector,
                }))
            }
            other => Err(TrainingImportError::UnknownKind {
                line,
                kind: other.to_string(),
            }),
        }
    }
}

fn required(
    line: usize,
    kind: &'static str,
    field: &'static str,
    value: Option<String>,
) -> Result<String, TrainingImportError> {
    value.ok_or(TrainingImportError::MissingField { line, kind, field })
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// The export carries RFC 3339 timestamps; older dumps use bare dates,
/// which count as expiring at midnight UTC.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(stamp.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    None
}
