// MODEL: simulation state
pub mod animation;
pub mod camera;
pub mod mouse;
pub mod scene;

pub use animation::{Animation, Ease, Fade, Hinge, Spin};
pub use camera::CameraState;
pub use mouse::MouseTrackingState;
pub use scene::{Placement, SceneObject, SimulationState};
