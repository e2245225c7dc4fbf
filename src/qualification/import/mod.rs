//! Import of the external training provider's CSV export.
//!
//! The export carries one row per record: `cid,kind,position,fir,sector,
//! expires_at`, with `kind` one of `endorsement`, `solo`, or
//! `familiarization`. Rows that cannot be classified fail the import; a
//! silently dropped record would show up as a wrongly denied authorization.

mod parser;

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use parser::{parse_records, ImportedRecord};

use super::domain::{ControllerId, TrainingRecords};
use super::provider::{ProviderError, TrainingRecordProvider};

#[derive(Debug, thiserror::Error)]
pub enum TrainingImportError {
    #[error("failed to read training export: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse training export: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: unknown record kind '{kind}'")]
    UnknownKind { line: usize, kind: String },
    #[error("line {line}: missing required field '{field}' for {kind} record")]
    MissingField {
        line: usize,
        kind: &'static str,
        field: &'static str,
    },
    #[error("line {line}: unparseable timestamp '{value}'")]
    InvalidTimestamp { line: usize, value: String },
}

/// In-memory training record store hydrated from a provider export.
///
/// The CLI and tests use this directly; the production portal substitutes
/// its own provider behind the same trait.
#[derive(Debug, Clone, Default)]
pub struct CsvTrainingStore {
    records: HashMap<ControllerId, TrainingRecords>,
}

impl CsvTrainingStore {
    /// A store with no records: every lookup yields the empty record set.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TrainingImportError> {
        let mut records: HashMap<ControllerId, TrainingRecords> = HashMap::new();

        for parsed in parse_records(reader)? {
            let entry = records.entry(ControllerId(parsed.cid)).or_default();
            match parsed.record {
                ImportedRecord::Endorsement(endorsement) => entry.endorsements.push(endorsement),
                ImportedRecord::Solo(solo) => entry.solos.push(solo),
                ImportedRecord::Familiarization(familiarization) => {
                    entry.familiarizations.push(familiarization)
                }
            }
        }

        Ok(Self { records })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, TrainingImportError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn controller_count(&self) -> usize {
        self.records.len()
    }
}

impl TrainingRecordProvider for CsvTrainingStore {
    async fn records_for(
        &self,
        controller: &ControllerId,
    ) -> Result<TrainingRecords, ProviderError> {
        Ok(self.records.get(controller).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = "\
cid,kind,position,fir,sector,expires_at
1000001,endorsement,EDDM_TWR,,,
1000001,solo,EDDM_APP,,,2025-03-12T18:00:00Z
1000001,familiarization,,EDMM,ALB,
1000002,endorsement,EDDF_GND,,,
";

    #[tokio::test]
    async fn groups_rows_by_controller() {
        let store = CsvTrainingStore::from_reader(EXPORT.as_bytes()).expect("import succeeds");
        assert_eq!(store.controller_count(), 2);

        let records = store
            .records_for(&ControllerId("1000001".to_string()))
            .await
            .expect("store lookup");
        assert_eq!(records.endorsements.len(), 1);
        assert_eq!(records.solos.len(), 1);
        assert_eq!(records.familiarizations.len(), 1);
    }

    #[tokio::test]
    async fn unknown_controllers_get_empty_record_sets() {
        let store = CsvTrainingStore::from_reader(EXPORT.as_bytes()).expect("import succeeds");
        let records = store
            .records_for(&ControllerId("9999999".to_string()))
            .await
            .expect("store lookup");
        assert_eq!(records, TrainingRecords::default());
    }
}
