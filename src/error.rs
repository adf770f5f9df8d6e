use std::path::PathBuf;

/// Problems with a scene description.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The scene file does not exist.
    #[error("scene file not found: {0}")]
    Missing(PathBuf),

    /// The scene file could not be read or parsed.
    #[error("failed to load scene file {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: confy::ConfyError,
    },

    /// The scene could not be written out.
    #[error("failed to write scene file {path}: {source}")]
    Store {
        path: PathBuf,
        #[source]
        source: confy::ConfyError,
    },

    #[error("scene has no objects")]
    Empty,

    #[error("object name must not be empty")]
    UnnamedObject,

    #[error("object `{0}` is defined more than once")]
    DuplicateObject(String),

    /// An action binding names an object the scene does not have.
    #[error("binding for {key} targets unknown object `{target}`")]
    UnknownTarget { key: String, target: String },

    #[error("binding for {0} has no targets")]
    NoTargets(String),

    #[error("key {0} is bound more than once")]
    DuplicateKey(String),

    /// A rate, speed or size that must be a finite non-negative number.
    #[error("{field} of `{object}` must be finite and non-negative, got {value}")]
    InvalidRate {
        object: String,
        field: &'static str,
        value: f32,
    },

    #[error("hinge `{object}` has min {min} greater than max {max}")]
    InvertedBounds { object: String, min: f32, max: f32 },

    #[error("invalid setting {field}: {reason}")]
    InvalidSetting { field: &'static str, reason: String },
}

/// Fatal startup failures, one per collaborator, so the message says which
/// layer gave up.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create rendering surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to open GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}
