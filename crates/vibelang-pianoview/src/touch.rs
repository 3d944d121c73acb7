//! Multi-touch key resolution
//!
//! Resolves touch samples against the current [`KeyLayout`], keeps the
//! per-key down state and derives the press/release transitions caused by
//! each sample.

use crate::layout::{KeyId, KeyLayout};

/// Kind of a single-pointer transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    /// First pointer touched down
    Down,
    /// Last pointer lifted
    Up,
    /// An additional pointer touched down
    PointerDown,
    /// A pointer lifted while others remain
    PointerUp,
}

impl PointerAction {
    /// Whether this transition presses rather than releases
    pub fn is_down(self) -> bool {
        matches!(self, PointerAction::Down | PointerAction::PointerDown)
    }
}

/// One touch input sample
#[derive(Debug, Clone, PartialEq)]
pub enum TouchSample {
    /// One pointer went down or up at (x, y)
    Pointer { action: PointerAction, x: f32, y: f32 },
    /// One or more pointers moved; holds the position of every active pointer
    Move(Vec<(f32, f32)>),
}

impl TouchSample {
    pub fn down(x: f32, y: f32) -> Self {
        TouchSample::Pointer { action: PointerAction::Down, x, y }
    }

    pub fn up(x: f32, y: f32) -> Self {
        TouchSample::Pointer { action: PointerAction::Up, x, y }
    }
}

/// A key transition to forward to a listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Pressed(i32),
    Released(i32),
}

impl KeyEvent {
    pub fn note(self) -> i32 {
        match self {
            KeyEvent::Pressed(note) | KeyEvent::Released(note) => note,
        }
    }

    pub fn is_pressed(self) -> bool {
        matches!(self, KeyEvent::Pressed(_))
    }
}

/// Down flags for every key of a layout, indexed like the layout's collections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyStates {
    whites: Vec<bool>,
    blacks: Vec<bool>,
}

impl KeyStates {
    /// All keys up
    pub fn for_layout(layout: &KeyLayout) -> Self {
        Self {
            whites: vec![false; layout.whites().len()],
            blacks: vec![false; layout.blacks().len()],
        }
    }

    pub fn is_down(&self, id: KeyId) -> bool {
        match id {
            KeyId::White(i) => self.whites.get(i).copied().unwrap_or(false),
            KeyId::Black(i) => self.blacks.get(i).copied().unwrap_or(false),
        }
    }

    pub fn any_down(&self) -> bool {
        self.whites.iter().chain(self.blacks.iter()).any(|&down| down)
    }

    /// Keys currently down, black keys first
    pub fn down_keys(&self) -> Vec<KeyId> {
        let blacks = self
            .blacks
            .iter()
            .enumerate()
            .filter(|&(_, &down)| down)
            .map(|(i, _)| KeyId::Black(i));
        let whites = self
            .whites
            .iter()
            .enumerate()
            .filter(|&(_, &down)| down)
            .map(|(i, _)| KeyId::White(i));
        blacks.chain(whites).collect()
    }

    fn set(&mut self, id: KeyId, down: bool) {
        let slot = match id {
            KeyId::White(i) => self.whites.get_mut(i),
            KeyId::Black(i) => self.blacks.get_mut(i),
        };
        if let Some(slot) = slot {
            *slot = down;
        }
    }

    fn clear(&mut self) {
        self.whites.iter_mut().for_each(|down| *down = false);
        self.blacks.iter_mut().for_each(|down| *down = false);
    }
}

/// Tracks which keys are held and turns touch samples into key events
#[derive(Debug, Clone, Default)]
pub struct TouchResolver {
    layout: KeyLayout,
    states: KeyStates,
}

impl TouchResolver {
    /// Create a resolver with every key up
    pub fn new(layout: KeyLayout) -> Self {
        let states = KeyStates::for_layout(&layout);
        Self { layout, states }
    }

    pub fn layout(&self) -> &KeyLayout {
        &self.layout
    }

    /// Current down flags, for rendering
    pub fn states(&self) -> &KeyStates {
        &self.states
    }

    /// Copy of the current down flags
    pub fn snapshot(&self) -> KeyStates {
        self.states.clone()
    }

    pub fn key_at(&self, x: f32, y: f32) -> Option<KeyId> {
        self.layout.hit_test(x, y)
    }

    /// Apply one touch sample and return the resulting transitions in
    /// delivery order
    pub fn resolve(&mut self, sample: &TouchSample) -> Vec<KeyEvent> {
        let events = match sample {
            TouchSample::Pointer { action, x, y } => self.resolve_pointer(*action, *x, *y),
            TouchSample::Move(points) => self.resolve_move(points),
        };
        for event in &events {
            log::trace!("{:?}", event);
        }
        events
    }

    /// Release every held key
    pub fn release_all(&mut self) -> Vec<KeyEvent> {
        let events = self.events_for(&self.states.down_keys(), KeyEvent::Released);
        self.states.clear();
        events
    }

    fn resolve_pointer(&mut self, action: PointerAction, x: f32, y: f32) -> Vec<KeyEvent> {
        let Some(id) = self.layout.hit_test(x, y) else {
            return Vec::new();
        };

        if action.is_down() {
            if self.states.is_down(id) {
                return Vec::new();
            }
            self.states.set(id, true);
            self.events_for(&[id], KeyEvent::Pressed)
        } else {
            // Released even if the key was not down
            self.states.set(id, false);
            self.events_for(&[id], KeyEvent::Released)
        }
    }

    fn resolve_move(&mut self, points: &[(f32, f32)]) -> Vec<KeyEvent> {
        let released = self.states.down_keys();
        self.states.clear();

        let mut pressed: Vec<KeyId> = Vec::with_capacity(points.len());
        for &(x, y) in points {
            if let Some(id) = self.layout.hit_test(x, y) {
                self.states.set(id, true);
                if !pressed.contains(&id) {
                    pressed.push(id);
                }
            }
        }

        // Keys held across the sample stay silent
        let released_only: Vec<KeyId> = released
            .iter()
            .copied()
            .filter(|id| !pressed.contains(id))
            .collect();
        let pressed_only: Vec<KeyId> = pressed
            .iter()
            .copied()
            .filter(|id| !released.contains(id))
            .collect();

        let mut events = self.events_for(&released_only, KeyEvent::Released);
        events.extend(self.events_for(&pressed_only, KeyEvent::Pressed));
        events
    }

    fn events_for(&self, ids: &[KeyId], kind: fn(i32) -> KeyEvent) -> Vec<KeyEvent> {
        ids.iter()
            .filter_map(|&id| self.layout.key(id))
            .map(|key| kind(key.note))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One octave from C4, 100px white keys, black keys 67px tall
    fn resolver() -> TouchResolver {
        TouchResolver::new(KeyLayout::build(700, 100, 7, 60))
    }

    // Points on specific keys of the test octave
    const C: (f32, f32) = (30.0, 80.0);
    const C_SHARP: (f32, f32) = (90.0, 10.0);
    const D: (f32, f32) = (150.0, 80.0);
    const E: (f32, f32) = (250.0, 80.0);
    const F: (f32, f32) = (330.0, 80.0);

    fn down(p: (f32, f32)) -> TouchSample {
        TouchSample::down(p.0, p.1)
    }

    fn up(p: (f32, f32)) -> TouchSample {
        TouchSample::up(p.0, p.1)
    }

    #[test]
    fn test_down_up() {
        let mut r = resolver();
        assert_eq!(r.resolve(&down(C)), vec![KeyEvent::Pressed(60)]);
        assert!(r.states().is_down(KeyId::White(0)));

        assert_eq!(r.resolve(&up(C)), vec![KeyEvent::Released(60)]);
        assert!(!r.states().any_down());
    }

    #[test]
    fn test_repeated_down_is_ignored() {
        let mut r = resolver();
        assert_eq!(r.resolve(&down(D)), vec![KeyEvent::Pressed(62)]);
        assert!(r.resolve(&down(D)).is_empty());

        let extra = TouchSample::Pointer { action: PointerAction::PointerDown, x: D.0, y: D.1 };
        assert!(r.resolve(&extra).is_empty());
    }

    #[test]
    fn test_release_without_press_still_fires() {
        let mut r = resolver();
        assert_eq!(r.resolve(&up(E)), vec![KeyEvent::Released(64)]);
        assert_eq!(r.resolve(&up(E)), vec![KeyEvent::Released(64)]);

        let lifted = TouchSample::Pointer { action: PointerAction::PointerUp, x: E.0, y: E.1 };
        assert_eq!(r.resolve(&lifted), vec![KeyEvent::Released(64)]);
    }

    #[test]
    fn test_black_key_wins_hit_test() {
        let mut r = resolver();
        assert_eq!(r.key_at(C_SHARP.0, C_SHARP.1), Some(KeyId::Black(0)));
        assert_eq!(r.resolve(&down(C_SHARP)), vec![KeyEvent::Pressed(61)]);
        assert!(!r.states().is_down(KeyId::White(0)));
    }

    #[test]
    fn test_multi_pointer_down() {
        let mut r = resolver();
        assert_eq!(r.resolve(&down(C)), vec![KeyEvent::Pressed(60)]);
        let second = TouchSample::Pointer { action: PointerAction::PointerDown, x: E.0, y: E.1 };
        assert_eq!(r.resolve(&second), vec![KeyEvent::Pressed(64)]);
        assert_eq!(r.states().down_keys(), vec![KeyId::White(0), KeyId::White(2)]);
    }

    #[test]
    fn test_move_symmetric_difference() {
        let mut r = resolver();
        r.resolve(&down(C));
        r.resolve(&TouchSample::Pointer { action: PointerAction::PointerDown, x: D.0, y: D.1 });

        // {C, D} -> {D, E}
        let events = r.resolve(&TouchSample::Move(vec![D, E]));
        assert_eq!(events, vec![KeyEvent::Released(60), KeyEvent::Pressed(64)]);
        assert_eq!(r.states().down_keys(), vec![KeyId::White(1), KeyId::White(2)]);
    }

    #[test]
    fn test_move_releases_before_presses() {
        let mut r = resolver();
        r.resolve(&down(C));
        r.resolve(&TouchSample::Pointer { action: PointerAction::PointerDown, x: E.0, y: E.1 });

        let events = r.resolve(&TouchSample::Move(vec![F, C_SHARP]));
        assert_eq!(
            events,
            vec![
                KeyEvent::Released(60),
                KeyEvent::Released(64),
                KeyEvent::Pressed(65),
                KeyEvent::Pressed(61),
            ]
        );
    }

    #[test]
    fn test_move_within_same_key_is_silent() {
        let mut r = resolver();
        r.resolve(&down(C));
        assert!(r.resolve(&TouchSample::Move(vec![(10.0, 90.0)])).is_empty());
        assert!(r.states().is_down(KeyId::White(0)));
    }

    #[test]
    fn test_move_two_pointers_on_one_key() {
        let mut r = resolver();
        let events = r.resolve(&TouchSample::Move(vec![(150.0, 70.0), (160.0, 90.0)]));
        assert_eq!(events, vec![KeyEvent::Pressed(62)]);
    }

    #[test]
    fn test_move_off_keyboard_releases() {
        let mut r = resolver();
        r.resolve(&down(D));
        let events = r.resolve(&TouchSample::Move(vec![(150.0, 250.0)]));
        assert_eq!(events, vec![KeyEvent::Released(62)]);
        assert!(!r.states().any_down());
    }

    #[test]
    fn test_slide_from_white_onto_black() {
        let mut r = resolver();
        r.resolve(&down(D));
        let events = r.resolve(&TouchSample::Move(vec![(150.0, 30.0)]));
        // Top of D between C# and D# is still D
        assert!(events.is_empty());

        let events = r.resolve(&TouchSample::Move(vec![(190.0, 30.0)]));
        assert_eq!(events, vec![KeyEvent::Released(62), KeyEvent::Pressed(63)]);
    }

    #[test]
    fn test_miss_is_ignored() {
        let mut r = resolver();
        assert!(r.resolve(&down((900.0, 50.0))).is_empty());
        assert!(r.resolve(&up((-5.0, 50.0))).is_empty());
        assert!(!r.states().any_down());
    }

    #[test]
    fn test_empty_layout_emits_nothing() {
        let mut r = TouchResolver::new(KeyLayout::build(700, 100, 0, 60));
        assert!(r.resolve(&down(C)).is_empty());
        assert!(r.resolve(&up(C)).is_empty());
        assert!(r.resolve(&TouchSample::Move(vec![C, D, E])).is_empty());
        assert!(r.release_all().is_empty());
    }

    #[test]
    fn test_release_all() {
        let mut r = resolver();
        r.resolve(&down(E));
        r.resolve(&TouchSample::Pointer {
            action: PointerAction::PointerDown,
            x: C_SHARP.0,
            y: C_SHARP.1,
        });

        assert_eq!(r.release_all(), vec![KeyEvent::Released(61), KeyEvent::Released(64)]);
        assert!(!r.states().any_down());
        assert!(r.release_all().is_empty());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut r = resolver();
        r.resolve(&down(C));
        let frame = r.snapshot();
        r.resolve(&up(C));
        assert!(frame.is_down(KeyId::White(0)));
        assert!(!r.states().is_down(KeyId::White(0)));
    }

    #[test]
    fn test_key_event_accessors() {
        assert_eq!(KeyEvent::Pressed(61).note(), 61);
        assert!(KeyEvent::Pressed(61).is_pressed());
        assert!(!KeyEvent::Released(61).is_pressed());
    }
}
