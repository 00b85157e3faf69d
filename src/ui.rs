//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::config::{ControlsSettings, UiSettings};
use crate::mixer::{Lifecycle, TrackState};
use crate::timer::format_remaining;

const GAIN_BAR_CELLS: usize = 10;

/// Keys shown in the footer, in display order.
const CONTROLS: &[(&str, &str)] = &[
    ("j/k", "select"),
    ("enter/space", "load / play / pause"),
    ("m", "mute"),
    ("s", "stop all"),
    ("t", "timer"),
    ("x", "stop timer"),
    ("q", "quit"),
];

/// Render the controls help text, incorporating the gain step.
fn controls_text(gain_step: f32) -> String {
    let step = (gain_step * 100.0).round() as u32;
    let mut parts = vec![format!("[h/l] volume -/+{step}%")];
    parts.extend(CONTROLS.iter().map(|(k, v)| format!("[{k}] {v}")));
    parts.join(" | ")
}

fn padding_left() -> Padding {
    Padding {
        left: 1,
        right: 0,
        top: 0,
        bottom: 0,
    }
}

fn glyph(track: &TrackState, audible: bool) -> &'static str {
    match track.lifecycle {
        Lifecycle::Unloaded => "·",
        Lifecycle::Loading => "…",
        Lifecycle::Loaded if track.is_playing => "▶",
        // Paused but still fading out.
        Lifecycle::Loaded if audible => "↘",
        Lifecycle::Loaded => "‖",
        Lifecycle::LoadError => "✗",
    }
}

/// A fixed-width bar of filled cells proportional to `gain`.
fn gain_bar(gain: f32) -> String {
    let filled = (gain.clamp(0.0, 1.0) * GAIN_BAR_CELLS as f32).round() as usize;
    format!(
        "{}{}",
        "█".repeat(filled),
        "░".repeat(GAIN_BAR_CELLS - filled)
    )
}

fn track_line(track: &TrackState, audible: bool) -> String {
    let pct = (track.gain * 100.0).round() as u32;
    let mut line = format!(
        "{} {:<14} {} {:>3}%",
        glyph(track, audible),
        track.name,
        gain_bar(track.gain),
        pct
    );
    match track.lifecycle {
        Lifecycle::Unloaded => line.push_str("  (enter to load)"),
        Lifecycle::Loading => line.push_str("  loading"),
        Lifecycle::LoadError => line.push_str("  failed, enter to retry"),
        Lifecycle::Loaded => {}
    }
    line
}

fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    // Keep the popup smaller and avoid covering the entire UI.
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let timer_height = if app.timer().is_visible() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(timer_height),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" escape ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box
    let status = Paragraph::new(app.status_line())
        .block(Block::bordered().padding(padding_left()).title(" status "))
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[1]);

    if app.timer().is_visible() {
        draw_timer_panel(frame, app, chunks[2]);
    }

    // Track list
    let items: Vec<ListItem> = app
        .mixer()
        .tracks()
        .iter()
        .map(|t| {
            let style = match t.lifecycle {
                Lifecycle::LoadError => Style::default().fg(Color::Red),
                Lifecycle::Loaded if t.is_playing => Style::default().add_modifier(Modifier::BOLD),
                Lifecycle::Unloaded | Lifecycle::Loading => {
                    Style::default().add_modifier(Modifier::DIM)
                }
                Lifecycle::Loaded => Style::default(),
            };
            ListItem::new(track_line(t, app.mixer().is_audible(&t.id))).style(style)
        })
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" sounds "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !app.mixer().tracks().is_empty() {
        state.select(Some(app.selected));
    }
    frame.render_stateful_widget(list, chunks[3], &mut state);

    if app.sheet.open {
        draw_timer_sheet(frame, app, chunks[3]);
    }

    let footer = Paragraph::new(controls_text(controls_settings.gain_step))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(padding_left()),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);
}

fn draw_timer_panel(frame: &mut Frame, app: &App, area: Rect) {
    let timer = app.timer();
    let remaining = format_remaining(timer.remaining_secs());
    let label = if timer.is_active() {
        format!("{remaining} of {} min", timer.duration_secs() / 60)
    } else {
        format!("{remaining} complete")
    };
    let gauge = Gauge::default()
        .block(Block::bordered().title(" sleep timer "))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio((timer.progress_percent() / 100.0).clamp(0.0, 1.0))
        .label(label);
    frame.render_widget(gauge, area);
}

fn draw_timer_sheet(frame: &mut Frame, app: &App, area: Rect) {
    let height = u16::try_from(app.presets().len())
        .unwrap_or(u16::MAX)
        .saturating_add(6);
    let popup = centered_rect_sized(44, height, area);
    frame.render_widget(Clear, popup);

    let mut items: Vec<ListItem> = app
        .presets()
        .iter()
        .map(|m| ListItem::new(format!("{m} minutes")))
        .collect();
    items.push(ListItem::new(format!("Custom: {}_", app.sheet.input)));

    let title = match &app.sheet.error {
        Some(e) => format!(" timer: {e} "),
        None => " timer (enter start, x stop, esc close) ".to_string(),
    };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .padding(padding_left())
                .title(title),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(app.sheet.selected));
    frame.render_stateful_widget(list, popup, &mut state);
}
