//! vibe-pianoview - Piano keyboard you play with the mouse
//!
//! Drives a [`PianoKeyboardView`] from terminal mouse events: click to
//! press, drag to slide across keys, release to let go.

use anyhow::Result;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use std::io::{self, stdout};
use std::path::Path;
use std::time::Duration;

use vibelang_pianoview::{
    config::Config, dispatch, listener::LogListener, note_name, PianoKeyboardView, TouchSample,
    ViewConfig,
};

#[derive(Parser)]
#[command(name = "vibe-pianoview")]
#[command(author, version, about = "Mouse-driven piano keyboard for VibeLang", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path (default: ~/.config/vibe-pianoview/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Number of white keys
    #[arg(short, long, value_parser = clap::value_parser!(i32).range(0..=128))]
    keys: Option<i32>,

    /// MIDI note of the leftmost key (60 = C4)
    #[arg(short, long, value_parser = clap::value_parser!(i32).range(0..=127))]
    midi_start: Option<i32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a default configuration file
    Init,
    /// Show the configuration file path
    ConfigPath,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init) => {
            let path = Config::create_default_config_file()?;
            println!("Created default config at: {}", path.display());
            return Ok(());
        }
        Some(Commands::ConfigPath) => {
            let path = Config::config_path()?;
            println!("{}", path.display());
            return Ok(());
        }
        None => {}
    }

    // Load config
    let config = if let Some(path) = cli.config {
        Config::load_from(Path::new(&path))?
    } else {
        Config::load_or_default()
    };

    // Apply CLI overrides
    let mut view_config = config.to_view_config();
    if let Some(keys) = cli.keys {
        view_config = view_config.with_number_keys(keys);
    }
    if let Some(midi_start) = cli.midi_start {
        view_config = view_config.with_midi_start(midi_start);
    }

    run_tui(view_config)
}

fn run_tui(config: ViewConfig) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut view = PianoKeyboardView::new(config);

    let result = run_event_loop(&mut terminal, &mut view);

    // Cleanup
    dispatch(&view.release_all(), &mut LogListener);
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange
    )?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    view: &mut PianoKeyboardView,
) -> Result<()> {
    let mut listener = LogListener;
    let mut keys_area = Rect::default();

    loop {
        terminal.draw(|frame| {
            keys_area = draw(frame, view, &mut listener);
        })?;

        if !event::poll(Duration::from_millis(16))? {
            continue;
        }

        match event::read()? {
            Event::FocusLost => {
                dispatch(&view.release_all(), &mut listener);
            }
            Event::Mouse(mouse) => {
                if let Some(sample) = touch_sample(&mouse, keys_area) {
                    view.on_touch_with(&sample, &mut listener);
                }
            }
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => return Ok(()),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(());
                }
                // Octave shift: + / > up, - / < down
                KeyCode::Char('+') | KeyCode::Char('>') | KeyCode::Right => {
                    shift_octave(view, 1, &mut listener);
                }
                KeyCode::Char('-') | KeyCode::Char('<') | KeyCode::Left => {
                    shift_octave(view, -1, &mut listener);
                }
                _ => {}
            },
            _ => {}
        }
    }
}

/// Draw the frame and return the area the keys occupy
fn draw(frame: &mut Frame, view: &mut PianoKeyboardView, listener: &mut LogListener) -> Rect {
    let area = frame.area();
    let start = view.config().midi_start;
    let title = format!(" Piano [{}] ", note_name(start));

    let block = Block::default()
        .title(title)
        .title_bottom(" click/drag play | +/- octave | Esc quit ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let keys_area = Rect {
        height: inner.height.saturating_sub(1),
        ..inner
    };
    let status_area = Rect {
        y: keys_area.y + keys_area.height,
        height: inner.height.min(1),
        ..inner
    };

    let size = (keys_area.width as u32, keys_area.height as u32);
    if view.size() != Some(size) {
        dispatch(&view.on_size_changed(size.0, size.1), listener);
    }

    frame.render_widget(view.widget(), keys_area);

    let held = view.held_notes();
    let playing = if held.is_empty() {
        "-".to_string()
    } else {
        held.iter().map(|&n| note_name(n)).collect::<Vec<_>>().join(" ")
    };
    let status = Line::from(vec![
        Span::styled("Playing: ", Style::default().fg(Color::DarkGray)),
        Span::styled(playing, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    ]);
    frame.render_widget(Paragraph::new(status), status_area);

    keys_area
}

/// Map a left-button mouse event to a touch sample at the cell's center
fn touch_sample(mouse: &MouseEvent, keys_area: Rect) -> Option<TouchSample> {
    let x = mouse.column as f32 - keys_area.x as f32 + 0.5;
    let y = mouse.row as f32 - keys_area.y as f32 + 0.5;

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(TouchSample::down(x, y)),
        MouseEventKind::Up(MouseButton::Left) => Some(TouchSample::up(x, y)),
        MouseEventKind::Drag(MouseButton::Left) => Some(TouchSample::Move(vec![(x, y)])),
        _ => None,
    }
}

fn shift_octave(view: &mut PianoKeyboardView, octaves: i32, listener: &mut LogListener) {
    let midi_start = (view.config().midi_start + octaves * 12).clamp(0, 127);
    let released = view.set_config(view.config().with_midi_start(midi_start));
    dispatch(&released, listener);
}
