//! vibelang-pianoview - Touch-driven piano keyboard view for VibeLang
//!
//! Lays out a row of white and black piano keys for any pixel size, tracks
//! which keys are held by one or more pointers and reports press/release
//! transitions per MIDI note.
//!
//! - Key geometry following the 7-white-key piano pattern
//! - Multi-touch resolution with slide (glissando) support
//! - Rendering onto any [`Canvas`], including a ratatui widget
//! - Configurable via TOML file
//!
//! # Usage as a Library
//!
//! ```no_run
//! use vibelang_pianoview::{PianoKeyboardView, TouchSample, ViewConfig};
//!
//! let mut view = PianoKeyboardView::new(ViewConfig::default());
//! view.on_size_changed(1500, 300);
//!
//! for event in view.on_touch(&TouchSample::down(50.0, 250.0)) {
//!     println!("{:?}", event);
//! }
//! ```

pub mod config;
pub mod error;
pub mod layout;
pub mod listener;
pub mod render;
pub mod touch;
pub mod view;

// Re-export main types
pub use config::{Config, KeyColors, Theme, ViewConfig};
pub use error::{Error, Result};
pub use layout::{note_name, Key, KeyId, KeyLayout, KeyRect};
pub use listener::{dispatch, FnListener, KeyListener, LogListener};
pub use render::{draw_keyboard, BufferCanvas, Canvas, DrawCommand, KeyboardWidget};
pub use touch::{KeyEvent, KeyStates, PointerAction, TouchResolver, TouchSample};
pub use view::PianoKeyboardView;
