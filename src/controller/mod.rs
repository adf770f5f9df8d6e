// CONTROLLER: input, animation and the per-frame update order
pub mod animation;
pub mod camera_controller;
pub mod frame_loop;
pub mod input;
pub mod input_sampler;

pub use animation::AnimationUpdater;
pub use camera_controller::{CameraController, CursorMode};
pub use frame_loop::{FrameClock, FrameLoopContext};
pub use input::{ActionBinding, InputEvent, InputState, Key, KeyBindings, KeyLatch, MouseButton, ToggleEffect};
pub use input_sampler::{FrameRequests, InputSampler};
