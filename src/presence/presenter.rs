//! Presentation capability consumed by the registry and the session.
//!
//! DESIGN
//! ======
//! The registry decides *what* changed (who joined, who left, what to draw)
//! and hands every visible side effect to a [`Presenter`]. Avatar handles are
//! owned by the registry and moved back into the presenter on removal, so a
//! handle can be destroyed at most once.
//!
//! [`TracingPresenter`] is the headless implementation used by the binary:
//! it keeps avatar positions in pixel space, renders trail strokes onto a
//! [`Surface`], and reports lifecycle changes through `tracing`.

use tracing::{debug, info, trace, warn};

use crate::identity::ClientId;
use crate::protocol::{EventKind, Position};
use crate::trail::{self, Palette, Pen, Point, Segment, Surface, Viewport};

/// Presentation state layered on top of the button state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AvatarState {
    /// Set once the peer has moved at least once.
    pub moving: bool,
    /// Set by Down, cleared by Up.
    pub pressed: bool,
}

impl AvatarState {
    pub fn apply(&mut self, kind: EventKind) {
        match kind {
            EventKind::Move => self.moving = true,
            EventKind::Down => self.pressed = true,
            EventKind::Up => self.pressed = false,
        }
    }
}

/// Side-effecting sink for presence changes.
pub trait Presenter {
    /// Opaque reference to a rendered avatar.
    type Handle;

    fn on_participant_count_changed(&mut self, count: usize);

    fn on_peer_first_seen(&mut self, id: &ClientId) -> Self::Handle;

    /// Move the avatar and refresh its state classes.
    fn on_peer_updated(&mut self, handle: &mut Self::Handle, position: Position, state: AvatarState);

    /// Destroy the avatar. Called exactly once per handle.
    fn on_peer_removed(&mut self, id: &ClientId, handle: Self::Handle);

    fn on_draw_segment(&mut self, segment: Segment);

    fn on_viewport_changed(&mut self, _viewport: Viewport) {}

    /// Transport-level status line (connection lost, closed, ...).
    fn on_status(&mut self, _status: &str) {}
}

/// "1 person" / "N people".
#[must_use]
pub fn people_label(count: usize) -> String {
    if count == 1 { "1 person".to_owned() } else { format!("{count} people") }
}

// =============================================================================
// TRACING PRESENTER
// =============================================================================

/// Headless avatar: where the cursor image would be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Avatar {
    pub id: ClientId,
    pub at: Option<Point>,
    pub state: AvatarState,
}

/// Surface that logs every stroke at `trace` level.
#[derive(Debug, Default)]
pub struct LogSurface {
    pen: Option<Pen>,
    strokes: u64,
}

impl LogSurface {
    #[must_use]
    pub fn strokes(&self) -> u64 {
        self.strokes
    }
}

impl Surface for LogSurface {
    fn begin_stroke(&mut self, pen: Pen) {
        self.pen = Some(pen);
    }

    fn draw_segment(&mut self, from: Point, to: Point) {
        self.strokes += 1;
        let (color, width) = self.pen.map_or(("-", 0.0), |p| (p.color, p.width));
        trace!(from_x = from.x, from_y = from.y, to_x = to.x, to_y = to.y, color, width, "trail: stroke");
    }
}

/// Presenter for the headless client.
pub struct TracingPresenter<S: Surface = LogSurface> {
    viewport: Viewport,
    palette: Palette,
    surface: S,
    count: usize,
}

impl TracingPresenter<LogSurface> {
    #[must_use]
    pub fn new(viewport: Viewport, palette: Palette) -> Self {
        Self::with_surface(viewport, palette, LogSurface::default())
    }
}

impl<S: Surface> TracingPresenter<S> {
    #[must_use]
    pub fn with_surface(viewport: Viewport, palette: Palette, surface: S) -> Self {
        Self { viewport, palette, surface, count: 1 }
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Last participant count published to this presenter.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }
}

impl<S: Surface> Presenter for TracingPresenter<S> {
    type Handle = Avatar;

    fn on_participant_count_changed(&mut self, count: usize) {
        self.count = count;
        info!(count, label = %people_label(count), "presence: participants");
    }

    fn on_peer_first_seen(&mut self, id: &ClientId) -> Avatar {
        info!(%id, "presence: peer joined");
        Avatar { id: id.clone(), at: None, state: AvatarState::default() }
    }

    fn on_peer_updated(&mut self, handle: &mut Avatar, position: Position, state: AvatarState) {
        handle.at = Some(self.viewport.to_pixels(position));
        handle.state = state;
        debug!(id = %handle.id, x = position.x, y = position.y, pressed = state.pressed, "presence: peer moved");
    }

    fn on_peer_removed(&mut self, id: &ClientId, handle: Avatar) {
        info!(%id, last_x = handle.at.map(|p| p.x), last_y = handle.at.map(|p| p.y), "presence: peer removed");
    }

    fn on_draw_segment(&mut self, segment: Segment) {
        let stroke = trail::stroke(&segment, self.viewport);
        trail::draw(&mut self.surface, &stroke, self.palette);
    }

    fn on_viewport_changed(&mut self, viewport: Viewport) {
        debug!(width = viewport.width, height = viewport.height, "presence: viewport resized");
        self.viewport = viewport;
    }

    fn on_status(&mut self, status: &str) {
        warn!(status, "presence: transport status");
    }
}

#[cfg(test)]
#[path = "presenter_test.rs"]
mod tests;
