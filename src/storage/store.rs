// Persistence store - settings, presets, and session history as JSON files
//
// Storage failures never reach the beat engine: reads degrade to defaults,
// writes are logged and dropped. The only operation that refuses input is
// saving a preset with an empty name, which is a user-facing validation error.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::types::{NewPreset, NewSession, Preset, Session, SessionUpdate};
use crate::engine::state::Settings;

const SETTINGS_FILE: &str = "settings.json";
const PRESETS_FILE: &str = "presets.json";
const SESSIONS_FILE: &str = "sessions.json";

/// Closed sessions kept in history; the oldest are evicted beyond this
pub const SESSION_RETENTION: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("preset name must not be empty")]
    EmptyPresetName,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// File-backed store for settings, presets, and sessions.
pub struct MetronomeStore {
    dir: PathBuf,
}

impl MetronomeStore {
    /// Store under the per-user data directory
    pub fn open_default() -> Self {
        let dir = dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("beatkeeper");
        Self::with_dir(dir)
    }

    /// Store under an explicit directory (tests use a temp dir)
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // --- Settings ---

    /// Load the persisted settings, falling back to defaults when the file
    /// is missing or unreadable. Loaded values are sanitized so an edited
    /// file cannot inject an out-of-range tempo.
    pub fn load_settings(&self) -> Settings {
        match self.read_json::<Settings>(SETTINGS_FILE) {
            Ok(Some(settings)) => settings.sanitized(),
            Ok(None) => Settings::default(),
            Err(e) => {
                log::warn!("could not read settings, using defaults: {e}");
                Settings::default()
            }
        }
    }

    pub fn save_settings(&self, settings: &Settings) {
        if let Err(e) = self.write_json(SETTINGS_FILE, settings) {
            log::error!("could not save settings: {e}");
        }
    }

    // --- Presets ---

    pub fn list_presets(&self) -> Vec<Preset> {
        match self.read_json::<Vec<Preset>>(PRESETS_FILE) {
            Ok(Some(presets)) => presets,
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("could not read presets: {e}");
                Vec::new()
            }
        }
    }

    /// Persist a new preset; the store assigns its id.
    /// An empty (or whitespace-only) name is rejected.
    pub fn save_preset(&self, new: NewPreset) -> Result<Preset, StoreError> {
        if new.name.trim().is_empty() {
            return Err(StoreError::EmptyPresetName);
        }

        let preset = Preset {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
            settings: new.settings.sanitized(),
        };

        let mut presets = self.list_presets();
        presets.push(preset.clone());
        self.write_json(PRESETS_FILE, &presets)?;
        Ok(preset)
    }

    /// Replace the preset with the given id. Returns the stored result,
    /// or `None` when no preset has that id.
    pub fn update_preset(&self, id: Uuid, new: NewPreset) -> Result<Option<Preset>, StoreError> {
        if new.name.trim().is_empty() {
            return Err(StoreError::EmptyPresetName);
        }

        let mut presets = self.list_presets();
        let Some(slot) = presets.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        *slot = Preset {
            id,
            name: new.name,
            description: new.description,
            settings: new.settings.sanitized(),
        };
        let updated = slot.clone();
        self.write_json(PRESETS_FILE, &presets)?;
        Ok(Some(updated))
    }

    /// Remove a preset. Deleting an id that does not exist is a no-op.
    pub fn delete_preset(&self, id: Uuid) {
        let presets = self.list_presets();
        let remaining: Vec<Preset> = presets.into_iter().filter(|p| p.id != id).collect();
        if let Err(e) = self.write_json(PRESETS_FILE, &remaining) {
            log::error!("could not delete preset {id}: {e}");
        }
    }

    // --- Sessions ---

    /// Session history, oldest first, bounded to the retention count
    pub fn list_sessions(&self) -> Vec<Session> {
        match self.read_json::<Vec<Session>>(SESSIONS_FILE) {
            Ok(Some(sessions)) => sessions,
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("could not read sessions: {e}");
                Vec::new()
            }
        }
    }

    /// Open a fresh in-progress session record.
    ///
    /// Called from the tick path, so failures degrade: the returned session
    /// is always valid even when the write did not stick.
    pub fn save_session(&self, new: NewSession) -> Session {
        let session = Session {
            id: Uuid::new_v4(),
            start_time: new.start_time,
            end_time: None,
            duration_seconds: 0,
            total_beats: 0,
            average_bpm: new.average_bpm,
        };

        let mut sessions = self.list_sessions();
        sessions.push(session.clone());
        if sessions.len() > SESSION_RETENTION {
            let excess = sessions.len() - SESSION_RETENTION;
            sessions.drain(..excess);
        }

        if let Err(e) = self.write_json(SESSIONS_FILE, &sessions) {
            log::error!("could not save session: {e}");
        }
        session
    }

    /// The single in-progress session, if one exists
    pub fn open_session(&self) -> Option<Session> {
        self.list_sessions().into_iter().find(Session::is_open)
    }

    /// Replace fields of the open session record. Idempotent full-record
    /// replacement, not an append; a no-op when no session is open.
    pub fn update_open_session(&self, update: SessionUpdate) {
        let mut sessions = self.list_sessions();
        let Some(slot) = sessions.iter_mut().find(|s| s.is_open()) else {
            return;
        };

        if let Some(end_time) = update.end_time {
            slot.end_time = Some(end_time);
        }
        if let Some(duration) = update.duration_seconds {
            slot.duration_seconds = duration;
        }
        if let Some(beats) = update.total_beats {
            slot.total_beats = beats;
        }
        if let Some(bpm) = update.average_bpm {
            slot.average_bpm = bpm;
        }

        if let Err(e) = self.write_json(SESSIONS_FILE, &sessions) {
            log::error!("could not update session: {e}");
        }
    }

    // --- File plumbing ---

    fn read_json<T: DeserializeOwned>(&self, file: &str) -> Result<Option<T>, StoreError> {
        let path = self.dir.join(file);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn write_json<T: Serialize>(&self, file: &str, value: &T) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(value)?;
        std::fs::write(self.dir.join(file), json)?;
        Ok(())
    }
}
