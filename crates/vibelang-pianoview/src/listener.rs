//! Key event listeners
//!
//! The resolver returns transitions as values; [`dispatch`] hands them to
//! anything implementing [`KeyListener`]. Listeners only see note numbers and
//! cannot reach back into the view while events are delivered.

use crate::layout::note_name;
use crate::touch::KeyEvent;

/// Receives key transitions
pub trait KeyListener {
    fn on_key_pressed(&mut self, note: i32);

    fn on_key_released(&mut self, note: i32);
}

/// Deliver events to a listener, once each, in order
pub fn dispatch(events: &[KeyEvent], listener: &mut dyn KeyListener) {
    for event in events {
        match *event {
            KeyEvent::Pressed(note) => listener.on_key_pressed(note),
            KeyEvent::Released(note) => listener.on_key_released(note),
        }
    }
}

/// Records every event
impl KeyListener for Vec<KeyEvent> {
    fn on_key_pressed(&mut self, note: i32) {
        self.push(KeyEvent::Pressed(note));
    }

    fn on_key_released(&mut self, note: i32) {
        self.push(KeyEvent::Released(note));
    }
}

/// Wraps a closure taking [`KeyEvent`]s
pub struct FnListener<F>(pub F);

impl<F: FnMut(KeyEvent)> KeyListener for FnListener<F> {
    fn on_key_pressed(&mut self, note: i32) {
        (self.0)(KeyEvent::Pressed(note));
    }

    fn on_key_released(&mut self, note: i32) {
        (self.0)(KeyEvent::Released(note));
    }
}

/// Logs every transition at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogListener;

impl KeyListener for LogListener {
    fn on_key_pressed(&mut self, note: i32) {
        log::info!("Key pressed: {} ({})", note_name(note), note);
    }

    fn on_key_released(&mut self, note: i32) {
        log::info!("Key released: {} ({})", note_name(note), note);
    }
}
