//! Declaration ledger: the status of every period the user has worked on.
//!
//! The external store hands the ledger over as loosely typed JSON
//! (`{"2025-06": {"stage": "closed", "closedAt": "..."}}`). Ingestion turns it
//! into a closed set of variants once, so the resolver never has to guess what
//! an unknown stage means.

use crate::error::Result;
use crate::period::Period;
use crate::schema::LedgerEntryRecord;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationStage {
    Draft,
    Declared,
    Closed,
}

/// Status of one period. Stages only move forward: draft, declared, closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum DeclarationRecord {
    Draft,
    Declared,
    Closed {
        #[serde(rename = "closedAt", default, skip_serializing_if = "Option::is_none")]
        closed_at: Option<NaiveDateTime>,
    },
}

impl DeclarationRecord {
    pub fn closed_at(closed_at: NaiveDateTime) -> Self {
        Self::Closed {
            closed_at: Some(closed_at),
        }
    }

    pub fn stage(&self) -> DeclarationStage {
        match self {
            Self::Draft => DeclarationStage::Draft,
            Self::Declared => DeclarationStage::Declared,
            Self::Closed { .. } => DeclarationStage::Closed,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed { .. })
    }

    /// Interpret an external record. Unknown stages never count as closed.
    pub fn from_record(period: &Period, record: &LedgerEntryRecord) -> Self {
        match record.stage.trim().to_ascii_lowercase().as_str() {
            "draft" => Self::Draft,
            "declared" => Self::Declared,
            "closed" => Self::Closed {
                closed_at: record
                    .closed_at
                    .as_deref()
                    .and_then(|raw| parse_timestamp(period, raw)),
            },
            other => {
                warn!(
                    "Unknown declaration stage '{}' for {}, treating it as draft",
                    other, period
                );
                Self::Draft
            }
        }
    }
}

fn parse_timestamp(period: &Period, raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt);
    }
    if let Some(dt) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Some(dt);
    }

    warn!("Ignoring unparseable closedAt '{}' for {}", raw, period);
    None
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DeclarationLedger {
    entries: BTreeMap<Period, DeclarationRecord>,
}

impl DeclarationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lenient ingestion of the external key/record map. Entries with a
    /// malformed period key are skipped.
    pub fn from_records(records: &BTreeMap<String, LedgerEntryRecord>) -> Self {
        let mut ledger = Self::new();
        for (key, record) in records {
            match Period::parse_key(key) {
                Ok(period) => {
                    ledger.insert(period, DeclarationRecord::from_record(&period, record));
                }
                Err(e) => warn!("Skipping ledger entry: {}", e),
            }
        }
        ledger
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: BTreeMap<String, LedgerEntryRecord> = serde_json::from_str(json)?;
        Ok(Self::from_records(&records))
    }

    pub fn insert(&mut self, period: Period, record: DeclarationRecord) -> Option<DeclarationRecord> {
        self.entries.insert(period, record)
    }

    pub fn get(&self, period: &Period) -> Option<&DeclarationRecord> {
        self.entries.get(period)
    }

    pub fn remove(&mut self, period: &Period) -> Option<DeclarationRecord> {
        self.entries.remove(period)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in chronological order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&Period, &DeclarationRecord)> {
        self.entries.iter()
    }
}

impl FromIterator<(Period, DeclarationRecord)> for DeclarationLedger {
    fn from_iter<I: IntoIterator<Item = (Period, DeclarationRecord)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
