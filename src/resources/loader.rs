use crate::scene::model::ShapeSpec;
use serde::{Deserialize, Serialize};

/// Non-owning reference to a resource held by the loader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle {
    /// Loader-assigned id.
    pub id: u32,
    /// False when the load failed.
    pub valid: bool,
}

impl Handle {
    /// A successfully loaded resource.
    pub fn new(id: u32) -> Self {
        Self { id, valid: true }
    }

    /// A failed load.
    pub fn invalid() -> Self {
        Self { id: 0, valid: false }
    }
}

/// Everything the loader needs to build a shader program.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ShaderSpec {
    /// Program name, unique per program.
    pub program_name: String,
    /// Source files.
    pub sources: Vec<String>,
    /// Uniform values and other settings, passed through untouched.
    pub variables: serde_json::Map<String, serde_json::Value>,
}

/// Framebuffer creation parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FboConfig {
    /// Keep a depth attachment.
    pub store_depth: bool,
    /// Fixed width; screen size when unset.
    pub width: Option<u32>,
    /// Fixed height; screen size when unset.
    pub height: Option<u32>,
}

/// Per-object render switches; `None` leaves the loader default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ObjectOptions {
    /// Lighting on/off.
    pub lighting: Option<bool>,
    /// Flat vertex colors.
    pub simple_colors: Option<bool>,
    /// Use the object's own camera.
    pub object_camera: Option<bool>,
}

impl ObjectOptions {
    /// True when nothing deviates from the loader default.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Loads and owns external resources. Asset decoding and GPU allocation live
/// behind this trait.
pub trait ResourceLoader {
    /// Start loading an image in the background.
    fn request_image_async(&mut self, name: &str);

    /// Block until every background load has finished.
    fn wait_for_pending_loads(&mut self);

    /// Image texture.
    fn load_image(&mut self, name: &str) -> Handle;

    /// Video stream for a texture.
    fn load_video(&mut self, name: &str) -> Handle;

    /// Object file.
    fn load_object(&mut self, name: &str) -> Handle;

    /// Generated shape registered under `name`.
    fn load_shape(&mut self, name: &str, shape: &ShapeSpec) -> Handle;

    /// Shader program.
    fn load_shader(&mut self, spec: &ShaderSpec) -> Handle;

    /// Framebuffer; an existing one with the same name is returned as is.
    fn init_fbo(&mut self, name: &str, config: &FboConfig) -> Handle;

    /// Object already in memory, if loaded.
    fn find_object(&mut self, name: &str) -> Option<Handle>;

    /// Apply render switches to a loaded object.
    fn configure_object(&mut self, object: Handle, options: &ObjectOptions);

    /// Make `name` the current text font.
    fn set_text_font(&mut self, name: &str);
}
