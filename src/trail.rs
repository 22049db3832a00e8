//! Trail renderer: turns two consecutive samples into one immediate stroke.
//!
//! This module holds no state of its own. Positions arrive normalized and are
//! scaled by the viewport at draw time, so a resize between samples only
//! affects strokes drawn after it. The actual drawing target is the
//! [`Surface`] capability; nothing here touches a real canvas.

use crate::protocol::Position;

/// Stroke width in pixels while the button is released.
const RELEASED_WIDTH_PX: f64 = 1.0;

/// Stroke width in pixels while the button is held.
const PRESSED_WIDTH_PX: f64 = 2.5;

// =============================================================================
// GEOMETRY
// =============================================================================

/// A point in viewport pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Current drawing-surface extents in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Scale a normalized position into this viewport.
    #[must_use]
    pub fn to_pixels(self, position: Position) -> Point {
        Point::new(position.x * self.width, position.y * self.height)
    }
}

// =============================================================================
// STYLE
// =============================================================================

/// Visual style of a stroke, keyed by button state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeStyle {
    Released,
    Pressed,
}

/// Pick the stroke style for a button state.
#[must_use]
pub fn style_for(pressed: bool) -> StrokeStyle {
    if pressed { StrokeStyle::Pressed } else { StrokeStyle::Released }
}

/// Resolved colour and width for one stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pen {
    pub color: &'static str,
    pub width: f64,
}

/// Stroke colours for one colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub lighter: &'static str,
    pub darker: &'static str,
}

impl Palette {
    pub const LIGHT: Self = Self { lighter: "#D3D3D3", darker: "#808080" };
    pub const DARK: Self = Self { lighter: "#007A7A", darker: "#EEEBD0" };

    #[must_use]
    pub fn for_scheme(dark: bool) -> Self {
        if dark { Self::DARK } else { Self::LIGHT }
    }

    /// Pressed strokes are darker and heavier.
    #[must_use]
    pub fn pen(self, style: StrokeStyle) -> Pen {
        match style {
            StrokeStyle::Released => Pen { color: self.lighter, width: RELEASED_WIDTH_PX },
            StrokeStyle::Pressed => Pen { color: self.darker, width: PRESSED_WIDTH_PX },
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::LIGHT
    }
}

// =============================================================================
// SEGMENTS AND STROKES
// =============================================================================

/// A draw request in normalized space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Position,
    pub to: Position,
    pub pressed: bool,
}

impl Segment {
    /// Segment from the previous sample to the current one. Without a
    /// previous sample the segment is zero-length at `current`, so the first
    /// sighting never draws a line from the origin.
    #[must_use]
    pub fn between(previous: Option<Position>, current: Position, pressed: bool) -> Self {
        Self { from: previous.unwrap_or(current), to: current, pressed }
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.from == self.to
    }
}

/// A draw instruction in viewport pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub from: Point,
    pub to: Point,
    pub style: StrokeStyle,
}

/// Scale a segment into the viewport as it is right now.
#[must_use]
pub fn stroke(segment: &Segment, viewport: Viewport) -> Stroke {
    Stroke {
        from: viewport.to_pixels(segment.from),
        to: viewport.to_pixels(segment.to),
        style: style_for(segment.pressed),
    }
}

// =============================================================================
// SURFACE
// =============================================================================

/// The drawing capability a host provides.
pub trait Surface {
    fn begin_stroke(&mut self, pen: Pen);
    fn draw_segment(&mut self, from: Point, to: Point);
}

/// Issue one immediate, one-shot stroke.
pub fn draw<S: Surface + ?Sized>(surface: &mut S, stroke: &Stroke, palette: Palette) {
    surface.begin_stroke(palette.pen(stroke.style));
    surface.draw_segment(stroke.from, stroke.to);
}

#[cfg(test)]
#[path = "trail_test.rs"]
mod tests;
