/// Cursor bookkeeping for mouse-look.
#[derive(Debug, Clone, PartialEq)]
pub struct MouseTrackingState {
    pub last_x: f64,
    pub last_y: f64,
    /// Set until the first cursor sample after (re)capture has been seen, so
    /// a stale `last_x/last_y` never turns into a large look jump.
    pub first_move: bool,
    pub left_pressed: bool,
    pub right_pressed: bool,
}

impl MouseTrackingState {
    /// Start tracking from the centre of a `width x height` window.
    pub fn centered(width: u32, height: u32) -> Self {
        Self {
            last_x: width as f64 / 2.0,
            last_y: height as f64 / 2.0,
            first_move: true,
            left_pressed: false,
            right_pressed: false,
        }
    }
}

impl Default for MouseTrackingState {
    fn default() -> Self {
        Self::centered(800, 600)
    }
}
