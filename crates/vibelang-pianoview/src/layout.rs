//! Piano key layout
//!
//! Partitions a `width x height` pixel area into white and black key
//! hit-regions following the repeating 7-white-key piano pattern
//! (C D E F G A B). Every region is tagged with a MIDI note; notes count up
//! by one per emitted key in left-to-right scan order, so black and white
//! keys together form a run of consecutive semitones.

use crate::config::ViewConfig;

/// Height of a black key relative to the full keyboard height
pub const BLACK_KEY_HEIGHT_RATIO: f32 = 0.67;

/// Number of white keys per octave
pub const WHITES_PER_OCTAVE: usize = 7;

/// An axis-aligned rectangle in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KeyRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl KeyRect {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self { left, top, right, bottom }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// A rect with no area never contains anything
    pub fn is_empty(&self) -> bool {
        !(self.left < self.right && self.top < self.bottom)
    }

    /// Half-open containment: left/top edges are inside, right/bottom are not
    pub fn contains(&self, x: f32, y: f32) -> bool {
        !self.is_empty() && x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }
}

/// A key hit-region and the MIDI note it plays
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Key {
    pub rect: KeyRect,
    /// MIDI note number (0-127 by convention, not enforced)
    pub note: i32,
}

/// Index of a key within one of the two collections of a [`KeyLayout`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyId {
    White(usize),
    Black(usize),
}

impl KeyId {
    pub fn is_black(self) -> bool {
        matches!(self, KeyId::Black(_))
    }
}

/// White and black key regions for one keyboard size
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyLayout {
    whites: Vec<Key>,
    blacks: Vec<Key>,
    /// Every key in the order it was emitted (ascending notes)
    scan: Vec<KeyId>,
    width: u32,
    height: u32,
    white_width: u32,
}

impl KeyLayout {
    /// Build the layout for a keyboard of `number_keys` white keys starting
    /// at MIDI note `midi_start`
    ///
    /// `number_keys < 1` produces an empty layout. Each white key gets
    /// `width / number_keys` pixels (integer division) and the last one is
    /// stretched to end exactly at `width`.
    pub fn build(width: u32, height: u32, number_keys: i32, midi_start: i32) -> Self {
        if number_keys < 1 {
            log::debug!("Empty key layout for number_keys={}", number_keys);
            return Self {
                width,
                height,
                ..Self::default()
            };
        }

        let count = number_keys as usize;
        let white_width = width / number_keys as u32;
        let full_height = height as f32;
        let black_bottom = BLACK_KEY_HEIGHT_RATIO * full_height;

        let mut layout = Self {
            whites: Vec::new(),
            blacks: Vec::new(),
            scan: Vec::new(),
            width,
            height,
            white_width,
        };
        let mut note = midi_start;

        for i in 0..count {
            let left_white = i as u32 * white_width;
            let right_white = if i == count - 1 { width } else { left_white + white_width };

            if let Some((left, right)) = black_key_span(i % WHITES_PER_OCTAVE, i, white_width) {
                layout.scan.push(KeyId::Black(layout.blacks.len()));
                layout.blacks.push(Key {
                    rect: KeyRect::new(left as f32, 0.0, right as f32, black_bottom),
                    note,
                });
                note = note.wrapping_add(1);
            }

            layout.scan.push(KeyId::White(layout.whites.len()));
            layout.whites.push(Key {
                rect: KeyRect::new(left_white as f32, 0.0, right_white as f32, full_height),
                note,
            });
            note = note.wrapping_add(1);
        }

        log::debug!(
            "Built key layout {}x{}: {} white, {} black, notes {}..{}",
            width,
            height,
            layout.whites.len(),
            layout.blacks.len(),
            midi_start,
            note.wrapping_sub(1)
        );

        layout
    }

    /// Build the layout described by a view configuration
    pub fn from_config(width: u32, height: u32, config: &ViewConfig) -> Self {
        Self::build(width, height, config.number_keys, config.midi_start)
    }

    /// White keys, left to right
    pub fn whites(&self) -> &[Key] {
        &self.whites
    }

    /// Black keys, left to right
    pub fn blacks(&self) -> &[Key] {
        &self.blacks
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width of a white key slice before the last key is stretched
    pub fn white_width(&self) -> u32 {
        self.white_width
    }

    /// Total number of keys, white and black
    pub fn len(&self) -> usize {
        self.whites.len() + self.blacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.whites.is_empty() && self.blacks.is_empty()
    }

    pub fn key(&self, id: KeyId) -> Option<&Key> {
        match id {
            KeyId::White(i) => self.whites.get(i),
            KeyId::Black(i) => self.blacks.get(i),
        }
    }

    /// Every key in scan order, which is also ascending note order
    pub fn keys(&self) -> impl Iterator<Item = (KeyId, &Key)> + '_ {
        self.scan
            .iter()
            .filter_map(move |&id| self.key(id).map(|key| (id, key)))
    }

    /// Find the key under a point
    ///
    /// Black keys overlay the white strip, so they are tested first.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<KeyId> {
        if let Some(i) = self.blacks.iter().position(|k| k.rect.contains(x, y)) {
            return Some(KeyId::Black(i));
        }
        self.whites
            .iter()
            .position(|k| k.rect.contains(x, y))
            .map(KeyId::White)
    }

    /// X positions of the lines separating adjacent white keys
    pub fn dividers(&self) -> Vec<u32> {
        (1..self.whites.len() as u32)
            .map(|i| i * self.white_width)
            .collect()
    }
}

/// Horizontal extent of the black key emitted before white key `index`, if any
///
/// `pattern` is the position of that white key within the octave (0 = C).
/// There is no black key before C or F. The C#/D# pair uses 3/5 of a white
/// key, the F#/G#/A# group uses 4/7. Coordinates are truncated to whole
/// pixels.
fn black_key_span(pattern: usize, index: usize, white_width: u32) -> Option<(i64, i64)> {
    let ww = white_width as f64;
    let i = index as f64;
    let narrow = (3.0f32 * white_width as f32 / 5.0) as f64;
    let wide = (4.0f32 * white_width as f32 / 7.0) as f64;

    let span = match pattern {
        // C#: right of the previous white key's left edge
        1 => {
            let left = ((i - 1.0) * ww + narrow) as i64;
            (left, (left as f64 + narrow) as i64)
        }
        // D#: mirrored against the right edge of the current white key
        2 => {
            let right = ((i + 1.0) * ww - narrow) as i64;
            ((right as f64 - narrow) as i64, right)
        }
        // F#
        4 => {
            let left = ((i - 1.0) * ww + wide) as i64;
            (left, (left as f64 + wide) as i64)
        }
        // G#: middle of the group, centered on the boundary
        5 => {
            let left = (i * ww - wide / 2.0) as i64;
            (left, (left as f64 + wide) as i64)
        }
        // A#
        6 => {
            let right = ((i + 1.0) * ww - wide) as i64;
            ((right as f64 - wide) as i64, right)
        }
        _ => return None,
    };
    Some(span)
}

/// Convert a MIDI note number to a note name (e.g. 60 -> "C4")
pub fn note_name(note: i32) -> String {
    let names = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
    let octave = note.div_euclid(12) - 1;
    let name = names[note.rem_euclid(12) as usize];
    format!("{}{}", name, octave)
}
