//! Classifies pointer drags on the card into navigation intents
//!
//! A gesture starts with a press, may move, and resolves on release:
//! a horizontal travel beyond [`SWIPE_THRESHOLD`] is a swipe, a release
//! within [`TAP_TOLERANCE`] of the press on both axes is a tap. Anything in
//! between is ignored.

/// Minimum horizontal travel, in distance units, for a swipe
pub const SWIPE_THRESHOLD: f64 = 30.0;
/// Maximum travel on either axis for a tap
pub const TAP_TOLERANCE: f64 = 10.0;

/// Distance units per terminal cell when the terminal reports no pixel size
const FALLBACK_CELL_WIDTH: f64 = 8.0;
const FALLBACK_CELL_HEIGHT: f64 = 16.0;

/// What a resolved gesture asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Swipe left: go to the next card
    Next,
    /// Swipe right: go to the previous card
    Previous,
    /// Tap: turn the card over
    Flip,
}

/// Guidance returned while a gesture is in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionHint {
    /// Mostly horizontal so far; scrolling should be held back
    SuppressScroll,
    /// Let the platform behave normally
    Allow,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Tracking {
        start: Point,
    },
}

/// Maps a finished gesture's travel to an intent.
///
/// `diff_x`/`diff_y` are start minus end, so a positive `diff_x` is a
/// leftward swipe.
pub fn classify(diff_x: f64, diff_y: f64) -> Option<Intent> {
    if diff_x.abs() > SWIPE_THRESHOLD {
        if diff_x > 0.0 {
            Some(Intent::Next)
        } else {
            Some(Intent::Previous)
        }
    } else if diff_x.abs() < TAP_TOLERANCE && diff_y.abs() < TAP_TOLERANCE {
        Some(Intent::Flip)
    } else {
        None
    }
}

/// Press/move/release state machine for a single pointer
#[derive(Debug, Default)]
pub struct GestureInterpreter {
    state: GestureState,
}

impl GestureInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.state, GestureState::Tracking { .. })
    }

    /// Starts tracking from `at`; a press while tracking restarts the gesture
    pub fn press(&mut self, at: Point) {
        self.state = GestureState::Tracking { start: at };
    }

    pub fn motion(&mut self, at: Point) -> MotionHint {
        match self.state {
            GestureState::Tracking { start } => {
                let dx = start.x - at.x;
                let dy = start.y - at.y;
                if dx.abs() > dy.abs() {
                    MotionHint::SuppressScroll
                } else {
                    MotionHint::Allow
                }
            }
            GestureState::Idle => MotionHint::Allow,
        }
    }

    /// Ends the gesture at `at` and returns its intent, if any
    pub fn release(&mut self, at: Point) -> Option<Intent> {
        match std::mem::take(&mut self.state) {
            GestureState::Tracking { start } => classify(start.x - at.x, start.y - at.y),
            GestureState::Idle => None,
        }
    }

    /// The pointer left the card without releasing: drop the gesture
    pub fn leave(&mut self) {
        self.state = GestureState::Idle;
    }
}

/// Size of one terminal cell in gesture distance units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    pub width: f64,
    pub height: f64,
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self {
            width: FALLBACK_CELL_WIDTH,
            height: FALLBACK_CELL_HEIGHT,
        }
    }
}

impl CellMetrics {
    /// Derives cell size from the terminal's reported pixel dimensions
    pub fn from_window(columns: u16, rows: u16, width_px: u16, height_px: u16) -> Self {
        if columns == 0 || rows == 0 || width_px == 0 || height_px == 0 {
            return Self::default();
        }
        Self {
            width: width_px as f64 / columns as f64,
            height: height_px as f64 / rows as f64,
        }
    }

    /// Queries the running terminal, falling back to the default metrics
    pub fn detect() -> Self {
        match crossterm::terminal::window_size() {
            Ok(size) => Self::from_window(size.columns, size.rows, size.width, size.height),
            Err(e) => {
                tracing::debug!(error = %e, "terminal pixel size unavailable");
                Self::default()
            }
        }
    }

    pub fn to_point(&self, column: u16, row: u16) -> Point {
        Point::new(column as f64 * self.width, row as f64 * self.height)
    }
}
