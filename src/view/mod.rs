// VIEW: window, GPU and HUD
pub mod app;
pub mod gpu_init;
pub mod render;
pub mod ui;

pub use app::{run, ViewerApp};
pub use gpu_init::GpuContext;
pub use render::SceneRenderer;
