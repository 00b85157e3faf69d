use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::trace;

use crate::app::App;
use crate::config;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::runtime::mpris_sync::{handle_control_cmd, update_mpris};
use crate::timer::TickOutcome;
use crate::ui;

/// Timer tick interval.
const TICK: Duration = Duration::from_secs(1);
/// How long to wait for a key before redrawing.
const INPUT_POLL: Duration = Duration::from_millis(50);

/// Main terminal event loop: settles loads, ticks the timer, handles input
/// and media keys, and keeps MPRIS in sync. Returns `Ok(())` when shutdown
/// is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    mpris: &MprisHandle,
    control_rx: &mpsc::Receiver<ControlCmd>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut next_tick = Instant::now() + TICK;
    loop {
        app.settle();

        let now = Instant::now();
        if now >= next_tick {
            if let TickOutcome::Running { remaining } = app.tick(now) {
                trace!(remaining, "timer tick");
            }
            next_tick = now + TICK;
        }

        // Covers changes from keys, media keys, loads and timer expiry alike.
        update_mpris(mpris, app);

        terminal.draw(|f| ui::draw(f, app, &settings.ui, &settings.controls))?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, app) {
                return Ok(());
            }
        }

        if event::poll(INPUT_POLL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, app) {
                    break;
                }
            }
        }
    }
    Ok(())
}

/// Apply one key press. Returns `true` when the app should quit.
fn handle_key_event(key: KeyEvent, app: &mut App) -> bool {
    if app.sheet.open {
        match key.code {
            KeyCode::Esc => app.close_timer_sheet(),
            KeyCode::Char('j') | KeyCode::Down => app.sheet_next(),
            KeyCode::Char('k') | KeyCode::Up => app.sheet_prev(),
            KeyCode::Enter => app.confirm_timer_sheet(Instant::now()),
            KeyCode::Backspace => app.sheet_backspace(),
            KeyCode::Char('x') => app.stop_timer_and_silence(),
            KeyCode::Char(c) if !c.is_control() => app.sheet_push_char(c),
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
        KeyCode::Enter | KeyCode::Char(' ') => app.activate_selected(),
        KeyCode::Char('h') | KeyCode::Left => app.adjust_gain(-1.0),
        KeyCode::Char('l') | KeyCode::Right => app.adjust_gain(1.0),
        KeyCode::Char('m') => app.toggle_mute(),
        KeyCode::Char('s') => app.stop_all(),
        KeyCode::Char('t') => app.open_timer_sheet(),
        KeyCode::Char('x') => app.stop_timer(),
        _ => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::runtime::testing::test_app;

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_key_event(KeyEvent::new(code, KeyModifiers::NONE), app)
    }

    #[test]
    fn quit_keys() {
        let (mut app, _engine, _prefs) = test_app(&Settings::default());
        assert!(press(&mut app, KeyCode::Char('q')));
        assert!(handle_key_event(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            &mut app
        ));
        assert!(!press(&mut app, KeyCode::Char('c')));
    }

    #[test]
    fn enter_loads_then_plays_the_selected_track() {
        let (mut app, _engine, _prefs) = test_app(&Settings::default());
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        app.settle();
        press(&mut app, KeyCode::Char(' '));

        let forest = app.mixer().track("forest").unwrap();
        assert!(forest.is_playing);

        press(&mut app, KeyCode::Char('h'));
        assert!((app.mixer().track("forest").unwrap().gain - 0.65).abs() < 1e-6);
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.mixer().playing_count(), 0);
    }

    #[test]
    fn timer_sheet_captures_keys_until_closed() {
        let (mut app, _engine, _prefs) = test_app(&Settings::default());
        press(&mut app, KeyCode::Char('t'));
        assert!(app.sheet.open);

        // 'q' is typed into the sheet, not a quit.
        assert!(!press(&mut app, KeyCode::Char('q')));
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.sheet.selected, 1);
        press(&mut app, KeyCode::Enter);
        assert!(!app.sheet.open);
        assert_eq!(app.timer().duration_secs(), 30 * 60);

        press(&mut app, KeyCode::Char('x'));
        assert!(!app.timer().is_visible());
    }

    #[test]
    fn custom_timer_input_from_keys() {
        let (mut app, _engine, _prefs) = test_app(&Settings::default());
        press(&mut app, KeyCode::Char('t'));
        press(&mut app, KeyCode::Char('k'));
        assert!(app.sheet_on_custom());
        press(&mut app, KeyCode::Char('z'));
        press(&mut app, KeyCode::Enter);
        assert!(app.sheet.open);
        assert!(app.sheet.error.is_some());

        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Char('7'));
        press(&mut app, KeyCode::Enter);
        assert!(!app.sheet.open);
        assert_eq!(app.timer().duration_secs(), 7 * 60);

        press(&mut app, KeyCode::Char('t'));
        press(&mut app, KeyCode::Esc);
        assert!(!app.sheet.open);
    }
}
