// Persistence - settings, presets, and session history

pub mod store;
pub mod types;

pub use store::{MetronomeStore, SESSION_RETENTION, StoreError};
pub use types::{NewPreset, NewSession, Preset, Session, SessionUpdate};
