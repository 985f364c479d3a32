//! Storage seam for raid records.
//!
//! Records are stored opaquely (serialized JSON) by code and expire after a
//! time-to-live; they are never deleted explicitly.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeDelta};
use std::collections::HashMap;

use super::Raid;

/// Key-value storage of raids with per-record expiry.
pub trait RaidStore {
    fn save(&mut self, raid: &Raid) -> Result<()>;

    /// The raid saved under `code`, unless it is unknown or expired.
    fn load(&mut self, code: &str) -> Result<Option<Raid>>;
}

struct Record {
    expires_at: DateTime<Local>,
    payload: String,
}

/// In-process store, for tests and single-instance deployments.
pub struct MemoryStore {
    ttl: TimeDelta,
    records: HashMap<String, Record>,
}

impl MemoryStore {
    pub fn new(ttl: TimeDelta) -> Self {
        Self {
            ttl,
            records: HashMap::new(),
        }
    }

    pub fn save_at(&mut self, raid: &Raid, now: DateTime<Local>) -> Result<()> {
        self.records.retain(|_, r| r.expires_at > now);

        let payload = serde_json::to_string(raid).context("Failed to serialize raid")?;
        self.records.insert(
            raid.code.clone(),
            Record {
                expires_at: now + self.ttl,
                payload,
            },
        );
        Ok(())
    }

    pub fn load_at(&mut self, code: &str, now: DateTime<Local>) -> Result<Option<Raid>> {
        self.records.retain(|_, r| r.expires_at > now);

        match self.records.get(code) {
            Some(record) => {
                let raid = serde_json::from_str(&record.payload)
                    .with_context(|| format!("Failed to deserialize raid {}", code))?;
                Ok(Some(raid))
            }
            None => Ok(None),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RaidStore for MemoryStore {
    fn save(&mut self, raid: &Raid) -> Result<()> {
        self.save_at(raid, Local::now())
    }

    fn load(&mut self, code: &str) -> Result<Option<Raid>> {
        self.load_at(code, Local::now())
    }
}
