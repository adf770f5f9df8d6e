use glam::Vec3;

use super::input::{InputState, KeyBindings, MouseButton};
use crate::model::{CameraState, MouseTrackingState};

/// Cursor mode the window should switch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMode {
    /// Hidden and locked to the window for mouse-look.
    Captured,
    Free,
}

/// Handles camera movement and orientation
#[derive(Debug, Clone)]
pub struct CameraController {
    /// World units per second.
    pub move_speed: f32,
    /// Degrees per pixel of cursor travel.
    pub mouse_sensitivity: f32,
}

impl CameraController {
    pub fn new(move_speed: f32, mouse_sensitivity: f32) -> Self {
        Self {
            move_speed,
            mouse_sensitivity,
        }
    }

    /// Move the camera for every held movement key. Contributions add up
    /// without renormalising, so diagonals are faster than single axes.
    pub fn update_movement(
        &self,
        camera: &mut CameraState,
        input: &InputState,
        bindings: &KeyBindings,
        dt: f32,
    ) {
        let speed = self.move_speed * dt;
        let front = camera.front();
        let right = camera.right();
        let up = camera.up;

        let mut cam_move = Vec3::ZERO;
        if input.is_key_pressed(bindings.forward) {
            cam_move += front;
        }
        if input.is_key_pressed(bindings.backward) {
            cam_move -= front;
        }
        if input.is_key_pressed(bindings.left) {
            cam_move -= right;
        }
        if input.is_key_pressed(bindings.right) {
            cam_move += right;
        }
        if input.is_key_pressed(bindings.up) {
            cam_move += up;
        }
        if input.is_key_pressed(bindings.down) {
            cam_move -= up;
        }

        camera.position += cam_move * speed;
    }

    /// Apply a cursor sample to yaw/pitch.
    pub fn apply_look(&self, camera: &mut CameraState, mouse: &mut MouseTrackingState, x: f64, y: f64) {
        if mouse.first_move {
            mouse.last_x = x;
            mouse.last_y = y;
            mouse.first_move = false;
            return;
        }

        // Screen y grows downward; pitch grows upward.
        let dx = (x - mouse.last_x) as f32 * self.mouse_sensitivity;
        let dy = (mouse.last_y - y) as f32 * self.mouse_sensitivity;
        mouse.last_x = x;
        mouse.last_y = y;

        camera.set_orientation(camera.yaw() + dx, camera.pitch() + dy);
    }

    /// Wheel zoom, clamped to the camera's field-of-view range.
    pub fn apply_zoom(&self, camera: &mut CameraState, delta_y: f32) {
        camera.set_fov(camera.fov() - delta_y);
    }

    /// Handle mouse button press/release
    pub fn on_mouse_button(
        &self,
        mouse: &mut MouseTrackingState,
        button: MouseButton,
        pressed: bool,
    ) -> Option<CursorMode> {
        match button {
            MouseButton::Right => {
                mouse.right_pressed = pressed;
                if pressed {
                    mouse.first_move = true;
                    Some(CursorMode::Captured)
                } else {
                    Some(CursorMode::Free)
                }
            }
            MouseButton::Left => {
                mouse.left_pressed = pressed;
                None
            }
            MouseButton::Middle => None,
        }
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(2.5, 0.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::input::{InputEvent, Key};
    use crate::model::camera::{FOV_MAX, FOV_MIN, PITCH_LIMIT};

    fn held(keys: &[Key]) -> InputState {
        let mut input = InputState::new();
        for key in keys {
            input.process_event(InputEvent::KeyDown(*key));
        }
        input
    }

    #[test]
    fn forward_for_one_second_moves_two_and_a_half_units() {
        let ctrl = CameraController::default();
        let mut cam = CameraState::new(Vec3::ZERO, -90.0, 0.0, 45.0);
        let input = held(&[Key::W]);
        for _ in 0..60 {
            ctrl.update_movement(&mut cam, &input, &KeyBindings::default(), 1.0 / 60.0);
        }
        assert!((cam.position - Vec3::new(0.0, 0.0, -2.5)).length() < 1e-3, "{:?}", cam.position);
    }

    #[test]
    fn diagonal_movement_is_not_normalised() {
        let ctrl = CameraController::default();
        let mut cam = CameraState::new(Vec3::ZERO, -90.0, 0.0, 45.0);
        ctrl.update_movement(&mut cam, &held(&[Key::W, Key::D]), &KeyBindings::default(), 1.0);
        assert!((cam.position.length() - 2.5 * 2f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn vertical_keys_follow_up_vector() {
        let ctrl = CameraController::default();
        let mut cam = CameraState::default();
        let start = cam.position;
        ctrl.update_movement(&mut cam, &held(&[Key::E]), &KeyBindings::default(), 0.4);
        assert!((cam.position - start - Vec3::Y).length() < 1e-5);
        ctrl.update_movement(&mut cam, &held(&[Key::Q]), &KeyBindings::default(), 0.4);
        assert!((cam.position - start).length() < 1e-5);
    }

    #[test]
    fn first_sample_after_capture_does_not_turn() {
        let ctrl = CameraController::default();
        let mut cam = CameraState::default();
        let mut mouse = MouseTrackingState::default();
        ctrl.on_mouse_button(&mut mouse, MouseButton::Right, true);
        ctrl.apply_look(&mut cam, &mut mouse, 5000.0, -3000.0);
        assert_eq!(cam.yaw(), -90.0);
        assert_eq!(cam.pitch(), 0.0);

        ctrl.apply_look(&mut cam, &mut mouse, 5010.0, -3020.0);
        assert!((cam.yaw() - -89.0).abs() < 1e-4);
        assert!((cam.pitch() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn pitch_and_front_invariants_hold_for_wild_input() {
        let ctrl = CameraController::default();
        let mut cam = CameraState::default();
        let mut mouse = MouseTrackingState::default();
        let samples = [
            (0.0, 0.0),
            (10.0, -1e6),
            (-3e5, 1e6),
            (42.0, 17.0),
            (1e7, -1e7),
            (-5.5, 900.25),
        ];
        for (x, y) in samples {
            ctrl.apply_look(&mut cam, &mut mouse, x, y);
            assert!(cam.pitch() >= -PITCH_LIMIT && cam.pitch() <= PITCH_LIMIT);
            assert!((cam.front().length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn zoom_is_clamped() {
        let ctrl = CameraController::default();
        let mut cam = CameraState::default();
        for delta in [3.0, 100.0, -7.5, -1000.0, 0.25, 44.0] {
            ctrl.apply_zoom(&mut cam, delta);
            assert!(cam.fov() >= FOV_MIN && cam.fov() <= FOV_MAX);
        }
    }

    #[test]
    fn buttons_request_cursor_modes() {
        let ctrl = CameraController::default();
        let mut mouse = MouseTrackingState::default();
        mouse.first_move = false;
        assert_eq!(ctrl.on_mouse_button(&mut mouse, MouseButton::Right, true), Some(CursorMode::Captured));
        assert!(mouse.right_pressed && mouse.first_move);
        assert_eq!(ctrl.on_mouse_button(&mut mouse, MouseButton::Right, false), Some(CursorMode::Free));
        assert_eq!(ctrl.on_mouse_button(&mut mouse, MouseButton::Left, true), None);
        assert!(mouse.left_pressed);
    }
}
