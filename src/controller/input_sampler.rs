use tracing::debug;

use super::camera_controller::{CameraController, CursorMode};
use super::input::{ActionBinding, InputEvent, InputState, KeyBindings, KeyLatch};
use crate::model::SimulationState;

/// What the window layer should do after this frame's input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameRequests {
    pub quit: bool,
    /// Last cursor mode change requested this frame, if any.
    pub cursor: Option<CursorMode>,
}

/// Turns raw input into camera motion and toggle flips, once per frame.
#[derive(Debug, Clone)]
pub struct InputSampler {
    bindings: KeyBindings,
    controller: CameraController,
    latches: Vec<KeyLatch>,
}

impl InputSampler {
    pub fn new(bindings: KeyBindings, controller: CameraController) -> Self {
        let latches = vec![KeyLatch::default(); bindings.actions.len()];
        Self {
            bindings,
            controller,
            latches,
        }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn controller(&self) -> &CameraController {
        &self.controller
    }

    pub fn sample(&mut self, state: &mut SimulationState, input: &mut InputState, dt: f32) -> FrameRequests {
        let mut requests = FrameRequests::default();

        for event in input.drain_pointer_events() {
            if let Some(mode) = self.handle_pointer(state, event) {
                requests.cursor = Some(mode);
            }
        }

        if input.is_key_pressed(self.bindings.quit) {
            state.quit_requested = true;
        }
        requests.quit = state.quit_requested;

        self.controller
            .update_movement(&mut state.camera, input, &self.bindings, dt);

        for (binding, latch) in self.bindings.actions.iter().zip(self.latches.iter_mut()) {
            if latch.update(input.is_key_pressed(binding.key)) {
                fire(binding, state);
            }
        }

        requests
    }

    fn handle_pointer(&self, state: &mut SimulationState, event: InputEvent) -> Option<CursorMode> {
        match event {
            InputEvent::CursorMoved { x, y } => {
                self.controller
                    .apply_look(&mut state.camera, &mut state.mouse, x, y);
                None
            }
            InputEvent::MouseButton { button, pressed } => {
                let mode = self
                    .controller
                    .on_mouse_button(&mut state.mouse, button, pressed);
                if let Some(mode) = mode {
                    debug!(?mode, "cursor mode change");
                }
                mode
            }
            InputEvent::Scroll { delta_y } => {
                self.controller.apply_zoom(&mut state.camera, delta_y);
                None
            }
            _ => None,
        }
    }
}

fn fire(binding: &ActionBinding, state: &mut SimulationState) {
    for target in &binding.targets {
        if let Some(object) = state.object_mut(target) {
            binding.effect.apply(&mut object.engaged);
            debug!(key = ?binding.key, object = %object.name, engaged = object.engaged, "toggle");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::input::{Key, MouseButton, ToggleEffect};
    use crate::model::{Animation, CameraState, Fade, Hinge, MouseTrackingState, Placement, SceneObject};

    fn scene() -> SimulationState {
        let objects = vec![
            SceneObject::new("door", Animation::Hinge(Hinge::new(45.0, 0.0, 90.0)), Placement::default()),
            SceneObject::new("door2", Animation::Hinge(Hinge::new(45.0, 0.0, 90.0)), Placement::default()),
            SceneObject::new("sunset", Animation::Fade(Fade::new(0.05)), Placement::default()),
        ];
        SimulationState::new(CameraState::default(), MouseTrackingState::default(), objects)
    }

    fn sampler() -> InputSampler {
        let bindings = KeyBindings {
            actions: vec![
                ActionBinding {
                    key: Key::Digit1,
                    effect: ToggleEffect::OpenClose,
                    targets: vec!["door".into(), "door2".into()],
                },
                ActionBinding {
                    key: Key::Digit4,
                    effect: ToggleEffect::OneShot,
                    targets: vec!["sunset".into()],
                },
            ],
            ..KeyBindings::default()
        };
        InputSampler::new(bindings, CameraController::default())
    }

    #[test]
    fn held_action_key_toggles_exactly_once() {
        let mut state = scene();
        let mut sampler = sampler();
        let mut input = InputState::new();
        input.process_event(InputEvent::KeyDown(Key::Digit1));
        for _ in 0..30 {
            sampler.sample(&mut state, &mut input, 1.0 / 60.0);
        }
        assert!(state.is_engaged("door"));
        assert!(state.is_engaged("door2"));

        input.process_event(InputEvent::KeyUp(Key::Digit1));
        sampler.sample(&mut state, &mut input, 1.0 / 60.0);
        input.process_event(InputEvent::KeyDown(Key::Digit1));
        sampler.sample(&mut state, &mut input, 1.0 / 60.0);
        assert!(!state.is_engaged("door"));
        assert!(!state.is_engaged("door2"));
    }

    #[test]
    fn simultaneous_edges_all_fire() {
        let mut state = scene();
        let mut sampler = sampler();
        let mut input = InputState::new();
        input.process_event(InputEvent::KeyDown(Key::Digit1));
        input.process_event(InputEvent::KeyDown(Key::Digit4));
        sampler.sample(&mut state, &mut input, 0.0);
        assert!(state.is_engaged("door"));
        assert!(state.is_engaged("sunset"));
    }

    #[test]
    fn one_shot_does_not_cancel_on_second_press() {
        let mut state = scene();
        let mut sampler = sampler();
        let mut input = InputState::new();
        for _ in 0..2 {
            input.process_event(InputEvent::KeyDown(Key::Digit4));
            sampler.sample(&mut state, &mut input, 0.0);
            input.process_event(InputEvent::KeyUp(Key::Digit4));
            sampler.sample(&mut state, &mut input, 0.0);
        }
        assert!(state.is_engaged("sunset"));
    }

    #[test]
    fn quit_key_is_reported() {
        let mut state = scene();
        let mut sampler = sampler();
        let mut input = InputState::new();
        assert!(!sampler.sample(&mut state, &mut input, 0.0).quit);
        input.process_event(InputEvent::KeyDown(Key::Escape));
        assert!(sampler.sample(&mut state, &mut input, 0.0).quit);
        assert!(state.quit_requested);
    }

    #[test]
    fn pointer_events_drive_camera_and_cursor() {
        let mut state = scene();
        let mut sampler = sampler();
        let mut input = InputState::new();
        input.process_event(InputEvent::MouseButton { button: MouseButton::Right, pressed: true });
        input.process_event(InputEvent::CursorMoved { x: 100.0, y: 100.0 });
        input.process_event(InputEvent::CursorMoved { x: 150.0, y: 100.0 });
        input.process_event(InputEvent::Scroll { delta_y: 5.0 });
        let requests = sampler.sample(&mut state, &mut input, 0.0);
        assert_eq!(requests.cursor, Some(CursorMode::Captured));
        assert!((state.camera.yaw() - -85.0).abs() < 1e-4);
        assert_eq!(state.camera.fov(), 40.0);

        input.process_event(InputEvent::MouseButton { button: MouseButton::Right, pressed: false });
        let requests = sampler.sample(&mut state, &mut input, 0.0);
        assert_eq!(requests.cursor, Some(CursorMode::Free));
        assert_eq!(sampler.sample(&mut state, &mut input, 0.0).cursor, None);
    }
}
