//! Piano keyboard view
//!
//! Glue between a host toolkit and the layout/touch core: the host reports
//! size changes, configuration changes and touch samples, and asks the view
//! to draw itself.

use crate::config::ViewConfig;
use crate::layout::KeyLayout;
use crate::listener::{dispatch, KeyListener};
use crate::render::{draw_keyboard, Canvas, KeyboardWidget};
use crate::touch::{KeyEvent, KeyStates, TouchResolver, TouchSample};

/// An interactive piano keyboard
#[derive(Debug, Clone, Default)]
pub struct PianoKeyboardView {
    config: ViewConfig,
    size: Option<(u32, u32)>,
    resolver: TouchResolver,
}

impl PianoKeyboardView {
    /// Create a view; it has no keys until the first size change
    pub fn new(config: ViewConfig) -> Self {
        Self {
            config,
            size: None,
            resolver: TouchResolver::default(),
        }
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn size(&self) -> Option<(u32, u32)> {
        self.size
    }

    pub fn layout(&self) -> &KeyLayout {
        self.resolver.layout()
    }

    pub fn states(&self) -> &KeyStates {
        self.resolver.states()
    }

    /// Rebuild the keys for a new size
    ///
    /// Keys held under the old layout are released first; the returned
    /// events carry their note-offs.
    pub fn on_size_changed(&mut self, width: u32, height: u32) -> Vec<KeyEvent> {
        self.size = Some((width, height));
        self.relayout()
    }

    /// Replace the configuration
    ///
    /// A new key count or start note rebuilds the layout. A color-only change
    /// keeps the keys and their down state. Returns the releases of keys that
    /// were held when the layout was rebuilt.
    pub fn set_config(&mut self, config: ViewConfig) -> Vec<KeyEvent> {
        let relayout = self.config.needs_relayout(&config);
        log::debug!("Config changed (relayout: {}): {:?}", relayout, config);
        self.config = config;
        if relayout {
            self.relayout()
        } else {
            Vec::new()
        }
    }

    /// Resolve a touch sample against the current layout
    pub fn on_touch(&mut self, sample: &TouchSample) -> Vec<KeyEvent> {
        self.resolver.resolve(sample)
    }

    /// Resolve a touch sample and deliver the transitions to `listener`
    pub fn on_touch_with(&mut self, sample: &TouchSample, listener: &mut dyn KeyListener) {
        let events = self.resolver.resolve(sample);
        dispatch(&events, listener);
    }

    /// Release every held key
    pub fn release_all(&mut self) -> Vec<KeyEvent> {
        self.resolver.release_all()
    }

    /// Notes of the keys currently down, ascending
    pub fn held_notes(&self) -> Vec<i32> {
        let states = self.resolver.states();
        self.layout()
            .keys()
            .filter(|(id, _)| states.is_down(*id))
            .map(|(_, key)| key.note)
            .collect()
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) {
        draw_keyboard(canvas, self.layout(), self.states(), &self.config.colors);
    }

    /// A ratatui widget drawing the current state
    pub fn widget(&self) -> KeyboardWidget<'_> {
        KeyboardWidget::new(self.layout(), self.states()).colors(self.config.colors)
    }

    fn relayout(&mut self) -> Vec<KeyEvent> {
        let released = self.resolver.release_all();
        if let Some((width, height)) = self.size {
            self.resolver = TouchResolver::new(KeyLayout::from_config(width, height, &self.config));
        }
        released
    }
}
