use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::*;
use crate::audio::fake::{EngineCall, FakeEngine};
use crate::catalog::Catalog;
use crate::config::Settings;
use crate::error::ValidationError;
use crate::mixer::{Lifecycle, Mixer};
use crate::store::{MemoryStore, Preferences};
use crate::timer::TickOutcome;

struct Fixture {
    app: App,
    engine: FakeEngine,
    prefs: Preferences,
}

fn fixture() -> Fixture {
    let engine = FakeEngine::new();
    let prefs = Preferences::new(Box::new(MemoryStore::default()));
    let settings = Settings::default();
    let mixer = Mixer::new(
        Catalog::builtin(PathBuf::from("/sounds")),
        Box::new(engine.clone()),
        prefs.clone(),
        settings.audio.default_gain,
    );
    Fixture {
        app: App::new(mixer, prefs.clone(), &settings),
        engine,
        prefs,
    }
}

fn load_and_play(app: &mut App, ids: &[&str]) {
    for id in ids {
        app.mixer_mut().load_track(id);
    }
    app.settle();
    for id in ids {
        assert!(app.mixer_mut().toggle_track(id));
    }
}

fn pauses(engine: &FakeEngine) -> usize {
    engine.count(|c| matches!(c, EngineCall::Pause(..)))
}

#[test]
fn timer_expiry_stops_every_playing_track_once() {
    let Fixture {
        mut app, engine, ..
    } = fixture();
    load_and_play(&mut app, &["rain", "ocean"]);
    let t0 = Instant::now();
    app.start_timer(1, t0).unwrap();

    let mut expiries = 0;
    for k in 1..=60 {
        if app.tick(t0 + Duration::from_secs(k)) == TickOutcome::Expired {
            expiries += 1;
        }
    }

    assert_eq!(expiries, 1);
    assert!(!app.timer().is_active());
    assert_eq!(app.mixer().playing_count(), 0);
    assert_eq!(pauses(&engine), 2);

    // Further ticks do nothing.
    app.tick(t0 + Duration::from_secs(61));
    assert_eq!(pauses(&engine), 2);
}

#[test]
fn long_timer_stops_all_exactly_once() {
    let Fixture {
        mut app, engine, ..
    } = fixture();
    load_and_play(&mut app, &["fire"]);
    let t0 = Instant::now();
    app.start_timer(25, t0).unwrap();
    assert_eq!(app.timer().remaining_secs(), 1500);

    for k in 1..=1500 {
        app.tick(t0 + Duration::from_secs(k));
    }
    assert_eq!(app.timer().remaining_secs(), 0);
    assert!(!app.timer().is_active());
    assert_eq!(pauses(&engine), 1);
}

#[test]
fn start_timer_closes_sheet_and_remembers_duration() {
    let Fixture { mut app, prefs, .. } = fixture();
    app.open_timer_sheet();
    assert!(app.sheet.open);

    app.start_timer(45, Instant::now()).unwrap();
    assert!(!app.sheet.open);
    assert_eq!(prefs.last_timer_duration(), Some(45));

    app.open_timer_sheet();
    assert_eq!(app.sheet.selected, 2);
}

#[test]
fn rejected_custom_duration_keeps_sheet_open() {
    let Fixture { mut app, prefs, .. } = fixture();
    app.open_timer_sheet();
    for _ in 0..app.presets().len() {
        app.sheet_next();
    }
    assert!(app.sheet_on_custom());

    for c in "1000".chars() {
        app.sheet_push_char(c);
    }
    app.confirm_timer_sheet(Instant::now());
    assert!(app.sheet.open);
    assert_eq!(app.sheet.error, Some(ValidationError::TooLong { max: 999 }));
    assert!(!app.timer().is_active());
    assert_eq!(prefs.last_timer_duration(), None);

    app.sheet_backspace();
    assert_eq!(app.sheet.error, None);
    app.confirm_timer_sheet(Instant::now());
    assert!(!app.sheet.open);
    assert_eq!(app.timer().duration_secs(), 100 * 60);
}

#[test]
fn confirm_starts_the_selected_preset() {
    let Fixture { mut app, .. } = fixture();
    app.open_timer_sheet();
    app.sheet_prev();
    app.sheet_prev();
    assert_eq!(app.sheet.selected, app.presets().len() - 1);

    app.confirm_timer_sheet(Instant::now());
    assert_eq!(app.timer().duration_secs(), 90 * 60);
}

#[test]
fn typing_only_applies_to_the_custom_entry() {
    let Fixture { mut app, .. } = fixture();
    app.open_timer_sheet();
    app.sheet_push_char('5');
    assert!(app.sheet.input.is_empty());
}

#[test]
fn stop_timer_leaves_sounds_playing() {
    let Fixture { mut app, .. } = fixture();
    load_and_play(&mut app, &["wind"]);
    app.start_timer(10, Instant::now()).unwrap();

    app.stop_timer();
    assert!(!app.timer().is_visible());
    assert_eq!(app.mixer().playing_count(), 1);

    app.start_timer(10, Instant::now()).unwrap();
    app.stop_timer_and_silence();
    assert!(!app.timer().is_active());
    assert_eq!(app.mixer().playing_count(), 0);
}

#[test]
fn activate_loads_then_toggles() {
    let Fixture {
        mut app, engine, ..
    } = fixture();
    engine.defer_loads_of("rain");

    app.activate_selected();
    assert_eq!(app.selected_track().unwrap().lifecycle, Lifecycle::Loading);
    app.activate_selected();
    assert_eq!(engine.count(|c| matches!(c, EngineCall::Load(_))), 1);

    engine.finish("rain", Ok(()));
    app.settle();
    app.activate_selected();
    assert!(app.selected_track().unwrap().is_playing);
    app.activate_selected();
    assert!(!app.selected_track().unwrap().is_playing);
}

#[test]
fn selection_wraps_both_ways() {
    let Fixture { mut app, .. } = fixture();
    app.select_prev();
    assert_eq!(app.selected, 5);
    app.select_next();
    assert_eq!(app.selected, 0);
}

#[test]
fn gain_steps_and_mute() {
    let Fixture { mut app, .. } = fixture();
    app.adjust_gain(2.0);
    assert!((app.selected_track().unwrap().gain - 0.8).abs() < 1e-6);
    app.adjust_gain(10.0);
    assert_eq!(app.selected_track().unwrap().gain, 1.0);

    app.toggle_mute();
    assert_eq!(app.selected_track().unwrap().gain, 0.0);
    app.toggle_mute();
    assert_eq!(app.selected_track().unwrap().gain, 0.7);
}

#[test]
fn preset_loads_then_plays_once_ready() {
    let Fixture {
        mut app, engine, ..
    } = fixture();
    engine.defer_loads_of("forest");

    app.apply_preset("forest");
    app.settle();
    assert!(!app.mixer().track("forest").unwrap().is_playing);

    engine.finish("forest", Ok(()));
    app.settle();
    assert!(app.mixer().track("forest").unwrap().is_playing);

    // Already playing: a second preset does not toggle it off.
    app.apply_preset("forest");
    app.settle();
    assert!(app.mixer().track("forest").unwrap().is_playing);
}

#[test]
fn failed_preset_is_dropped() {
    let Fixture {
        mut app, engine, ..
    } = fixture();
    engine.fail_loads_of("thunder");
    app.apply_preset("thunder");
    app.settle();
    assert_eq!(
        app.mixer().track("thunder").unwrap().lifecycle,
        Lifecycle::LoadError
    );

    engine.succeed_loads_of("thunder");
    app.mixer_mut().load_track("thunder");
    app.settle();
    assert!(!app.mixer().track("thunder").unwrap().is_playing);
}

#[test]
fn play_pause_resumes_the_last_stopped_set() {
    let Fixture { mut app, .. } = fixture();
    load_and_play(&mut app, &["rain", "fire"]);

    app.play_pause();
    assert_eq!(app.mixer().playing_count(), 0);
    app.play_pause();
    assert_eq!(app.mixer().playing_count(), 2);

    // An idle stop-all keeps the remembered set.
    app.stop_all();
    app.stop_all();
    app.resume_last();
    assert_eq!(app.mixer().playing_count(), 2);
}

#[test]
fn status_line_counts_playing_sounds() {
    let Fixture { mut app, .. } = fixture();
    assert_eq!(app.status_line(), "Select a sound to begin");
    load_and_play(&mut app, &["rain"]);
    assert_eq!(app.status_line(), "1 sound playing");
    load_and_play(&mut app, &["ocean"]);
    assert_eq!(app.status_line(), "2 sounds playing");
}
