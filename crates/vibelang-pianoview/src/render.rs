//! Keyboard rendering
//!
//! The keyboard is drawn onto anything implementing [`Canvas`]: solid
//! rectangles for the keys and vertical lines between white keys. A ratatui
//! [`Buffer`] canvas and [`KeyboardWidget`] are provided for the terminal.

use crate::config::KeyColors;
use crate::layout::{KeyId, KeyLayout, KeyRect};
use crate::touch::KeyStates;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::Widget;
use std::ops::Range;

/// Symbol used for the divider between white keys
pub const DIVIDER_SYMBOL: &str = "│";

/// A 2D drawing surface
pub trait Canvas {
    /// Fill `rect` with a solid color
    fn fill_rect(&mut self, rect: &KeyRect, color: Color);

    /// Draw a vertical line at `x` from `top` to `bottom`
    fn draw_line(&mut self, x: f32, top: f32, bottom: f32, color: Color);
}

/// Draw the whole keyboard: white keys, dividers, then black keys on top
pub fn draw_keyboard(
    canvas: &mut dyn Canvas,
    layout: &KeyLayout,
    states: &KeyStates,
    colors: &KeyColors,
) {
    for (i, key) in layout.whites().iter().enumerate() {
        let color = if states.is_down(KeyId::White(i)) { colors.pressed } else { colors.white };
        canvas.fill_rect(&key.rect, color);
    }

    let height = layout.height() as f32;
    for x in layout.dividers() {
        canvas.draw_line(x as f32, 0.0, height, colors.black);
    }

    for (i, key) in layout.blacks().iter().enumerate() {
        let color = if states.is_down(KeyId::Black(i)) { colors.pressed } else { colors.black };
        canvas.fill_rect(&key.rect, color);
    }
}

/// A recorded canvas call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect { rect: KeyRect, color: Color },
    Line { x: f32, top: f32, bottom: f32, color: Color },
}

/// Records draw calls instead of producing pixels
impl Canvas for Vec<DrawCommand> {
    fn fill_rect(&mut self, rect: &KeyRect, color: Color) {
        self.push(DrawCommand::FillRect { rect: *rect, color });
    }

    fn draw_line(&mut self, x: f32, top: f32, bottom: f32, color: Color) {
        self.push(DrawCommand::Line { x, top, bottom, color });
    }
}

/// Canvas over a ratatui buffer region, one terminal cell per pixel
///
/// A cell belongs to a rectangle when the cell's center lies inside it.
pub struct BufferCanvas<'a> {
    buf: &'a mut Buffer,
    area: Rect,
}

impl<'a> BufferCanvas<'a> {
    pub fn new(buf: &'a mut Buffer, area: Rect) -> Self {
        Self { buf, area }
    }

    fn columns(&self, left: f32, right: f32) -> Range<u16> {
        cell_span(left, right, self.area.width)
    }

    fn rows(&self, top: f32, bottom: f32) -> Range<u16> {
        cell_span(top, bottom, self.area.height)
    }
}

impl Canvas for BufferCanvas<'_> {
    fn fill_rect(&mut self, rect: &KeyRect, color: Color) {
        let rows = self.rows(rect.top, rect.bottom);
        for col in self.columns(rect.left, rect.right) {
            for row in rows.clone() {
                if let Some(cell) = self.buf.cell_mut((self.area.x + col, self.area.y + row)) {
                    cell.set_symbol(" ").set_bg(color);
                }
            }
        }
    }

    fn draw_line(&mut self, x: f32, top: f32, bottom: f32, color: Color) {
        if x < 0.0 || x >= self.area.width as f32 {
            return;
        }
        let col = x as u16;
        for row in self.rows(top, bottom) {
            if let Some(cell) = self.buf.cell_mut((self.area.x + col, self.area.y + row)) {
                cell.set_symbol(DIVIDER_SYMBOL).set_fg(color);
            }
        }
    }
}

/// Cells whose centers fall in `[lo, hi)`, clipped to `0..limit`
fn cell_span(lo: f32, hi: f32, limit: u16) -> Range<u16> {
    let start = (lo - 0.5).ceil().clamp(0.0, limit as f32) as u16;
    let end = (hi - 0.5).ceil().clamp(0.0, limit as f32) as u16;
    start..end.max(start)
}

/// Keyboard widget for rendering in ratatui
///
/// The layout is expected to have been built for the area's size.
pub struct KeyboardWidget<'a> {
    layout: &'a KeyLayout,
    states: &'a KeyStates,
    colors: KeyColors,
}

impl<'a> KeyboardWidget<'a> {
    pub fn new(layout: &'a KeyLayout, states: &'a KeyStates) -> Self {
        Self {
            layout,
            states,
            colors: KeyColors::default(),
        }
    }

    /// Set the key colors
    pub fn colors(mut self, colors: KeyColors) -> Self {
        self.colors = colors;
        self
    }
}

impl Widget for KeyboardWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut canvas = BufferCanvas::new(buf, area);
        draw_keyboard(&mut canvas, self.layout, self.states, &self.colors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::touch::{TouchResolver, TouchSample};
    use ratatui::buffer::Cell;

    fn cell(buf: &Buffer, x: u16, y: u16) -> &Cell {
        buf.cell((x, y)).unwrap()
    }

    #[test]
    fn test_draw_order() {
        let layout = KeyLayout::build(300, 100, 3, 60);
        let states = KeyStates::for_layout(&layout);
        let colors = KeyColors::default();
        let mut commands: Vec<DrawCommand> = Vec::new();
        draw_keyboard(&mut commands, &layout, &states, &colors);

        // 3 whites, 2 dividers, 2 blacks
        assert_eq!(commands.len(), 7);
        assert!(commands[..3]
            .iter()
            .all(|c| matches!(c, DrawCommand::FillRect { color: Color::White, .. })));
        assert_eq!(
            commands[3],
            DrawCommand::Line { x: 100.0, top: 0.0, bottom: 100.0, color: Color::Black }
        );
        assert_eq!(
            commands[4],
            DrawCommand::Line { x: 200.0, top: 0.0, bottom: 100.0, color: Color::Black }
        );
        assert!(commands[5..]
            .iter()
            .all(|c| matches!(c, DrawCommand::FillRect { color: Color::Black, .. })));
    }

    #[test]
    fn test_pressed_keys_use_pressed_color() {
        let mut resolver = TouchResolver::new(KeyLayout::build(300, 100, 3, 60));
        resolver.resolve(&TouchSample::down(150.0, 90.0));
        resolver.resolve(&TouchSample::Move(vec![(150.0, 90.0), (70.0, 10.0)]));

        let mut commands: Vec<DrawCommand> = Vec::new();
        draw_keyboard(&mut commands, resolver.layout(), resolver.states(), &KeyColors::default());

        let fills: Vec<Color> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillRect { color, .. } => Some(*color),
                DrawCommand::Line { .. } => None,
            })
            .collect();
        assert_eq!(
            fills,
            vec![Color::White, Color::Yellow, Color::White, Color::Yellow, Color::Black]
        );
    }

    #[test]
    fn test_empty_layout_draws_nothing() {
        let layout = KeyLayout::build(300, 100, 0, 60);
        let mut commands: Vec<DrawCommand> = Vec::new();
        let states = KeyStates::for_layout(&layout);
        draw_keyboard(&mut commands, &layout, &states, &KeyColors::default());
        assert!(commands.is_empty());
    }

    #[test]
    fn test_cell_span() {
        assert_eq!(cell_span(0.0, 7.0, 14), 0..7);
        assert_eq!(cell_span(4.0, 8.0, 14), 4..8);
        assert_eq!(cell_span(0.0, 2.68, 4), 0..3);
        assert_eq!(cell_span(10.0, 30.0, 14), 10..14);
        assert_eq!(cell_span(-3.0, 2.0, 14), 0..2);
        assert_eq!(cell_span(5.0, 5.0, 14), 5..5);
    }

    #[test]
    fn test_widget_renders_into_buffer() {
        let area = Rect::new(0, 0, 14, 4);
        let layout = KeyLayout::build(14, 4, 2, 60);
        let mut resolver = TouchResolver::new(layout);
        resolver.resolve(&TouchSample::down(1.5, 3.5));

        let mut buf = Buffer::empty(area);
        KeyboardWidget::new(resolver.layout(), resolver.states()).render(area, &mut buf);

        // Pressed C, idle D, C# on top of the boundary
        assert_eq!(cell(&buf, 0, 3).bg, Color::Yellow);
        assert_eq!(cell(&buf, 10, 3).bg, Color::White);
        assert_eq!(cell(&buf, 5, 0).bg, Color::Black);
        assert_eq!(cell(&buf, 7, 2).bg, Color::Black);
        assert_eq!(cell(&buf, 7, 2).symbol(), " ");

        // Divider only shows below the black key
        assert_eq!(cell(&buf, 7, 3).symbol(), DIVIDER_SYMBOL);
        assert_eq!(cell(&buf, 7, 3).fg, Color::Black);
    }

    #[test]
    fn test_widget_respects_area_offset() {
        let area = Rect::new(3, 2, 10, 2);
        let layout = KeyLayout::build(10, 2, 1, 60);
        let states = KeyStates::for_layout(&layout);
        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 6));

        let colors = KeyColors { white: Color::Gray, ..KeyColors::default() };
        KeyboardWidget::new(&layout, &states).colors(colors).render(area, &mut buf);

        assert_eq!(cell(&buf, 3, 2).bg, Color::Gray);
        assert_eq!(cell(&buf, 12, 3).bg, Color::Gray);
        assert_eq!(cell(&buf, 2, 2).bg, Color::Reset);
        assert_eq!(cell(&buf, 13, 3).bg, Color::Reset);
    }
}
