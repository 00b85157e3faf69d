use std::env;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::audio::RodioEngine;
use crate::catalog::Catalog;
use crate::config::Settings;
use crate::logging;
use crate::mixer::Mixer;
use crate::mpris::ControlCmd;
use crate::shortcuts::Shortcuts;

mod event_loop;
mod mpris_sync;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.iter().any(|a| a == "--print-config") {
        print!("{}", Settings::default().to_toml()?);
        return Ok(());
    }

    let (settings, settings_problem) = settings::load_settings();
    let log_path = logging::init(&settings.logging);
    if let Some(problem) = settings_problem {
        warn!("{problem}");
    }
    info!(log = ?log_path, "escape starting");

    let shortcuts = Shortcuts::parse(&args);
    let prefs = startup::open_preferences(&settings);
    if args.iter().any(|a| a == "--reset") {
        prefs.clear();
        info!("stored preferences cleared");
    }

    let catalog = Catalog::load(&settings.catalog, shortcuts.sounds_dir.as_deref());
    info!(
        sounds = %catalog.sounds_dir().display(),
        tracks = catalog.tracks().len(),
        "catalog ready"
    );
    let engine = RodioEngine::new(settings.audio.clone());
    let mixer = Mixer::new(
        catalog,
        Box::new(engine),
        prefs.clone(),
        settings.audio.default_gain,
    );
    let mut app = App::new(mixer, prefs, &settings);
    startup::restore_session(&mut app, &settings, &shortcuts);

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);
    mpris_sync::update_mpris(&mpris, &app);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &settings, &mut app, &mpris, &control_rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.shutdown(Duration::from_millis(settings.audio.quit_fade_out_ms));
    mpris.dispose();
    info!("escape stopped");

    run_result
}
