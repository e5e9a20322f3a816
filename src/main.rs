use beatkeeper::engine::{BeatScheduler, SoundType};
use beatkeeper::render::{CpalToneRenderer, NoopHaptics, NullToneRenderer, ToneRenderer};
use beatkeeper::storage::{MetronomeStore, NewPreset};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

fn main() {
    env_logger::init();

    println!("=== Beatkeeper ===\n");

    let store = Arc::new(MetronomeStore::open_default());
    println!("Store: {}", store.dir().display());

    // No output device is not fatal: the beat cycle and session tracking
    // run the same, just silently
    let tone: Arc<dyn ToneRenderer> = match CpalToneRenderer::new() {
        Ok(renderer) => Arc::new(renderer),
        Err(e) => {
            eprintln!("Audio unavailable ({e}), running silent");
            Arc::new(NullToneRenderer)
        }
    };

    let scheduler = BeatScheduler::new(Arc::clone(&store), tone, Arc::new(NoopHaptics));

    let settings = scheduler.settings();
    println!(
        "Tempo: {} BPM, sound: {}\n",
        settings.bpm,
        settings.sound_type.name()
    );
    print_help();

    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("stdin error: {e}");
                break;
            }
        }

        let Some((command, arg)) = split_command(&line) else {
            continue;
        };

        match command {
            "start" => scheduler.start(),
            "stop" => scheduler.stop(),
            "pause" => scheduler.pause(),
            "bpm" => match arg.parse::<i64>() {
                Ok(v) => println!("tempo set to {} BPM", scheduler.set_bpm(v)),
                Err(_) => println!("usage: bpm <number>"),
            },
            "tap" => match scheduler.tap() {
                Some(bpm) => println!("tap -> {} BPM", bpm),
                None => println!("tap recorded, keep tapping"),
            },
            "sound" => set_sound(&scheduler, arg),
            "test" => scheduler.preview_sound(),
            "save" => save_preset(&scheduler, &store, arg),
            "presets" => list_presets(&store),
            "load" => load_preset(&scheduler, &store, arg),
            "delete" => delete_preset(&store, arg),
            "stats" => print_stats(&scheduler, &store),
            "reset" => scheduler.reset_display(),
            "beat" => println!("beat {}", scheduler.state().current_beat),
            "help" => print_help(),
            "quit" | "exit" => break,
            other => println!("unknown command '{other}' (try 'help')"),
        }
    }

    scheduler.stop();
    println!("bye");
}

/// Split an input line into the command word and its argument. The argument
/// is everything after the first word, so preset names may contain spaces.
fn split_command(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim();
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let command = parts.next().filter(|c| !c.is_empty())?;
    Some((command, parts.next().map(str::trim).unwrap_or("")))
}

fn print_help() {
    println!("commands:");
    println!("  start | stop | pause      control playback");
    println!("  bpm <40-200>              set tempo");
    println!("  tap                       tap tempo");
    println!("  sound <name>              pick click sound");
    println!("  test                      play the click once");
    println!("  save <name>               save current settings as preset");
    println!("  presets | load <n> | delete <n>");
    println!("  stats | reset | beat | help | quit");
}

fn set_sound(scheduler: &BeatScheduler, arg: &str) {
    let names: Vec<&str> = SoundType::ALL.iter().map(|s| s.name()).collect();
    let Some(found) = SoundType::ALL.into_iter().find(|s| s.name() == arg) else {
        println!("usage: sound <{}>", names.join("|"));
        return;
    };
    let mut settings = scheduler.settings();
    settings.sound_type = found;
    scheduler.apply_settings(settings);
    println!("sound set to {}", found.name());
}

fn save_preset(scheduler: &BeatScheduler, store: &MetronomeStore, name: &str) {
    if name.is_empty() {
        println!("usage: save <name>");
        return;
    }
    match store.save_preset(NewPreset {
        name: name.to_string(),
        description: None,
        settings: scheduler.settings(),
    }) {
        Ok(preset) => println!("saved preset '{}'", preset.name),
        Err(e) => println!("could not save preset: {e}"),
    }
}

fn list_presets(store: &MetronomeStore) {
    let presets = store.list_presets();
    if presets.is_empty() {
        println!("no presets saved");
        return;
    }
    for (i, preset) in presets.iter().enumerate() {
        println!(
            "  {}: {} ({} BPM, {})",
            i + 1,
            preset.name,
            preset.settings.bpm,
            preset.settings.sound_type.name()
        );
    }
}

fn load_preset(scheduler: &BeatScheduler, store: &MetronomeStore, arg: &str) {
    let presets = store.list_presets();
    let Some(preset) = arg
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| presets.get(i))
    else {
        println!("usage: load <number from 'presets'>");
        return;
    };
    scheduler.apply_settings(preset.settings.clone());
    println!("loaded '{}' ({} BPM)", preset.name, preset.settings.bpm);
}

fn delete_preset(store: &MetronomeStore, arg: &str) {
    let presets = store.list_presets();
    let Some(preset) = arg
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| presets.get(i))
    else {
        println!("usage: delete <number from 'presets'>");
        return;
    };
    store.delete_preset(preset.id);
    println!("deleted '{}'", preset.name);
}

fn print_stats(scheduler: &BeatScheduler, store: &MetronomeStore) {
    {
        let tracker = scheduler.tracker();
        let tracker = tracker.lock().unwrap();
        if tracker.is_open() {
            println!(
                "current session: {} beats, {}s",
                tracker.display_beats(),
                tracker.display_seconds()
            );
        }
    }
    let sessions = store.list_sessions();
    let closed: Vec<_> = sessions.iter().filter(|s| !s.is_open()).collect();
    println!("{} past sessions", closed.len());
    for session in closed.iter().rev().take(5) {
        println!(
            "  {}: {}s, {} beats, avg {} BPM",
            session.start_time.format("%Y-%m-%d %H:%M"),
            session.duration_seconds,
            session.total_beats,
            session.average_bpm
        );
    }
}
