// Types for the persistence store - presets and practice sessions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::state::Settings;

/// A saved snapshot of the full settings block, created by an explicit user
/// save and never mutated afterwards except via replace-by-id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub settings: Settings,
}

/// Insert form of [`Preset`]: the store assigns the id
#[derive(Debug, Clone)]
pub struct NewPreset {
    pub name: String,
    pub description: Option<String>,
    pub settings: Settings,
}

/// One continuous practice interval.
///
/// `end_time == None` marks the session as in progress; at most one such
/// record exists at a time. Closed sessions are immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_seconds: u32,
    pub total_beats: u64,
    pub average_bpm: u16,
}

impl Session {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

/// Insert form of [`Session`]: opens a fresh in-progress record
#[derive(Debug, Clone)]
pub struct NewSession {
    pub start_time: DateTime<Utc>,
    pub average_bpm: u16,
}

/// Partial update applied to the single open session record.
/// Absent fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct SessionUpdate {
    pub end_time: Option<DateTime<Utc>>,
    pub duration_seconds: Option<u32>,
    pub total_beats: Option<u64>,
    pub average_bpm: Option<u16>,
}
