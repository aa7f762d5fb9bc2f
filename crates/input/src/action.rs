use glam::Vec2;

/// A high-level action produced from raw window input.
///
/// The app loop consumes actions, never raw events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Start or continue painting at a window-space cursor position.
    Paint(Vec2),
    /// Stop painting (button released or cursor left the window).
    StopPaint,
    /// Grow or shrink the brush radius by a number of cells.
    AdjustRadius(f32),
    /// Pause or resume ticking.
    TogglePause,
    /// Rebuild the automaton with fresh noise.
    Reset,
    /// Input that is not bound to anything.
    Noop,
}

/// Cells of radius change per wheel line.
pub const RADIUS_STEP: f32 = 2.0;

/// Smallest radius the wheel can shrink the brush to.
pub const MIN_RADIUS: f32 = 1.0;

/// Tracks whether the paint button is held and where the cursor last was.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PaintState {
    held: bool,
    cursor: Option<Vec2>,
}

impl PaintState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cursor move. Returns `Paint` while the button is held.
    pub fn cursor_moved(&mut self, at: Vec2) -> Action {
        self.cursor = Some(at);
        if self.held { Action::Paint(at) } else { Action::Noop }
    }

    /// Record the paint button going down or up.
    pub fn button(&mut self, pressed: bool) -> Action {
        self.held = pressed;
        tracing::trace!(pressed, "paint button");
        match (pressed, self.cursor) {
            (true, Some(at)) => Action::Paint(at),
            (true, None) => Action::Noop,
            (false, _) => Action::StopPaint,
        }
    }

    pub fn cursor_left(&mut self) -> Action {
        self.cursor = None;
        Action::StopPaint
    }
}

/// Apply a wheel delta (in lines) to a brush radius.
pub fn adjust_radius(radius: f32, lines: f32) -> f32 {
    (radius + lines * RADIUS_STEP).max(MIN_RADIUS)
}
