use super::*;

#[derive(Default)]
struct RecordingSurface {
    pens: Vec<Pen>,
    segments: Vec<(Point, Point)>,
}

impl Surface for RecordingSurface {
    fn begin_stroke(&mut self, pen: Pen) {
        self.pens.push(pen);
    }

    fn draw_segment(&mut self, from: Point, to: Point) {
        self.segments.push((from, to));
    }
}

#[test]
fn style_for_maps_button_state() {
    assert_eq!(style_for(true), StrokeStyle::Pressed);
    assert_eq!(style_for(false), StrokeStyle::Released);
}

#[test]
fn between_without_previous_is_degenerate_at_current() {
    let current = Position::new(0.4, 0.6);
    let segment = Segment::between(None, current, false);
    assert_eq!(segment.from, current);
    assert_eq!(segment.to, current);
    assert!(segment.is_degenerate());
}

#[test]
fn between_with_previous_spans_both_samples() {
    let segment = Segment::between(Some(Position::new(0.1, 0.1)), Position::new(0.2, 0.3), true);
    assert_eq!(segment.from, Position::new(0.1, 0.1));
    assert_eq!(segment.to, Position::new(0.2, 0.3));
    assert!(!segment.is_degenerate());
}

#[test]
fn between_keeps_zero_coordinate_previous() {
    let segment = Segment::between(Some(Position::new(0.0, 0.0)), Position::new(0.5, 0.5), false);
    assert_eq!(segment.from, Position::new(0.0, 0.0));
}

#[test]
fn stroke_scales_to_viewport_pixels() {
    let segment = Segment::between(Some(Position::new(0.25, 0.5)), Position::new(1.0, 1.0), true);
    let s = stroke(&segment, Viewport::new(800.0, 600.0));
    assert_eq!(s.from, Point::new(200.0, 300.0));
    assert_eq!(s.to, Point::new(800.0, 600.0));
    assert_eq!(s.style, StrokeStyle::Pressed);
}

#[test]
fn stroke_uses_viewport_at_draw_time() {
    let segment = Segment::between(Some(Position::new(0.5, 0.5)), Position::new(0.5, 0.5), false);
    let before = stroke(&segment, Viewport::new(100.0, 100.0));
    let after = stroke(&segment, Viewport::new(200.0, 50.0));
    assert_eq!(before.to, Point::new(50.0, 50.0));
    assert_eq!(after.to, Point::new(100.0, 25.0));
}

#[test]
fn pressed_pen_is_darker_and_heavier() {
    let palette = Palette::LIGHT;
    let released = palette.pen(StrokeStyle::Released);
    let pressed = palette.pen(StrokeStyle::Pressed);
    assert_eq!(released.color, palette.lighter);
    assert_eq!(pressed.color, palette.darker);
    assert!(pressed.width > released.width);
}

#[test]
fn for_scheme_selects_dark_palette() {
    assert_eq!(Palette::for_scheme(true), Palette::DARK);
    assert_eq!(Palette::for_scheme(false), Palette::default());
}

#[test]
fn draw_begins_stroke_then_draws_one_segment() {
    let mut surface = RecordingSurface::default();
    let s = Stroke { from: Point::new(1.0, 2.0), to: Point::new(3.0, 4.0), style: StrokeStyle::Released };
    draw(&mut surface, &s, Palette::DARK);
    assert_eq!(surface.pens, vec![Palette::DARK.pen(StrokeStyle::Released)]);
    assert_eq!(surface.segments, vec![(Point::new(1.0, 2.0), Point::new(3.0, 4.0))]);
}
