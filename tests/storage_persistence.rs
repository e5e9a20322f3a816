//! Persistence across store instances: what lands on disk, what survives a
//! reopen, and how a damaged data directory degrades.

use beatkeeper::engine::{Settings, SoundType, VisualType};
use beatkeeper::storage::{
    MetronomeStore, NewPreset, NewSession, SESSION_RETENTION, SessionUpdate, StoreError,
};
use chrono::Utc;
use tempfile::tempdir;

#[test]
fn test_settings_survive_reopening_the_store() {
    let dir = tempdir().unwrap();

    let settings = Settings {
        bpm: 72,
        sound_type: SoundType::Beep,
        visual_type: VisualType::Pulse,
        tactile_enabled: true,
        ..Settings::default()
    };
    MetronomeStore::with_dir(dir.path()).save_settings(&settings);

    let reopened = MetronomeStore::with_dir(dir.path());
    assert_eq!(reopened.load_settings(), settings);
}

#[test]
fn test_preset_lifecycle_across_store_instances() {
    let dir = tempdir().unwrap();

    let saved = {
        let store = MetronomeStore::with_dir(dir.path());
        store
            .save_preset(NewPreset {
                name: "Ballad".to_string(),
                description: Some("slow practice".to_string()),
                settings: Settings {
                    bpm: 60,
                    ..Settings::default()
                },
            })
            .unwrap()
    };

    let store = MetronomeStore::with_dir(dir.path());
    let listed = store.list_presets();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, saved.id);
    assert_eq!(listed[0].name, "Ballad");
    assert_eq!(listed[0].settings.bpm, 60);

    // Empty names never reach disk
    let err = store.save_preset(NewPreset {
        name: "".to_string(),
        description: None,
        settings: Settings::default(),
    });
    assert!(matches!(err, Err(StoreError::EmptyPresetName)));
    assert_eq!(store.list_presets().len(), 1);

    store.delete_preset(saved.id);
    assert!(MetronomeStore::with_dir(dir.path()).list_presets().is_empty());
}

#[test]
fn test_presets_store_settings_flattened_on_disk() {
    let dir = tempdir().unwrap();
    let store = MetronomeStore::with_dir(dir.path());
    store
        .save_preset(NewPreset {
            name: "Flat".to_string(),
            description: None,
            settings: Settings::default(),
        })
        .unwrap();

    let raw = std::fs::read_to_string(dir.path().join("presets.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let preset = &json[0];
    // Settings fields sit beside name/id, not under a nested object
    assert_eq!(preset["bpm"], 120);
    assert_eq!(preset["soundType"], "click");
    assert!(preset.get("settings").is_none());
}

#[test]
fn test_session_history_survives_reopening() {
    let dir = tempdir().unwrap();

    {
        let store = MetronomeStore::with_dir(dir.path());
        store.save_session(NewSession {
            start_time: Utc::now(),
            average_bpm: 140,
        });
        store.update_open_session(SessionUpdate {
            end_time: Some(Utc::now()),
            duration_seconds: Some(90),
            total_beats: Some(210),
            ..SessionUpdate::default()
        });
    }

    let store = MetronomeStore::with_dir(dir.path());
    let sessions = store.list_sessions();
    assert_eq!(sessions.len(), 1);
    let session = &sessions[0];
    assert!(session.end_time.is_some());
    assert_eq!(session.duration_seconds, 90);
    assert_eq!(session.total_beats, 210);
    assert_eq!(session.average_bpm, 140);
    assert!(store.open_session().is_none());
}

#[test]
fn test_history_stays_bounded_at_retention() {
    let dir = tempdir().unwrap();
    let store = MetronomeStore::with_dir(dir.path());

    for _ in 0..(SESSION_RETENTION + 10) {
        store.save_session(NewSession {
            start_time: Utc::now(),
            average_bpm: 120,
        });
        store.update_open_session(SessionUpdate {
            end_time: Some(Utc::now()),
            ..SessionUpdate::default()
        });
    }

    assert_eq!(
        MetronomeStore::with_dir(dir.path()).list_sessions().len(),
        SESSION_RETENTION
    );
}

#[test]
fn test_damaged_files_degrade_without_erroring() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("settings.json"), "}{").unwrap();
    std::fs::write(dir.path().join("presets.json"), "[1, 2,").unwrap();
    std::fs::write(dir.path().join("sessions.json"), "null").unwrap();

    let store = MetronomeStore::with_dir(dir.path());
    assert_eq!(store.load_settings(), Settings::default());
    assert!(store.list_presets().is_empty());
    assert!(store.list_sessions().is_empty());

    // A fresh save replaces the damaged file and reads back cleanly
    store.save_settings(&Settings {
        bpm: 100,
        ..Settings::default()
    });
    assert_eq!(store.load_settings().bpm, 100);
}

#[test]
fn test_missing_data_directory_is_created_on_first_write() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("deep").join("beatkeeper");
    let store = MetronomeStore::with_dir(&nested);

    assert_eq!(store.load_settings(), Settings::default());
    store.save_settings(&Settings::default());
    assert!(nested.join("settings.json").exists());
}
