use crate::animation::sync::SyncState;
use crate::animation::track::Track;
use crate::animation::value::Scalar;
use crate::expression::interp::{ExprContext, ExprValue};
use crate::foundation::core::{Angle, Perspective, Rgba, TimeWindow, Xyz};
use crate::render::backend::Blend;
use crate::resources::loader::{Handle, ObjectOptions};
use crate::scene::layers::LayerKey;
use crate::scene::model::{Align, Projection, ShapeSpec, UvDef, VideoDef};
use serde::Serialize;
use std::fmt;

/// Category of a recorded animation error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnimationErrorKind {
    /// A required resource failed to load.
    Resource,
    /// Structurally invalid directive.
    Parse,
    /// A valid expression failed while evaluating.
    Expression,
}

impl fmt::Display for AnimationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Resource => "RESOURCE",
            Self::Parse => "PARSE",
            Self::Expression => "EXPRESSION",
        })
    }
}

/// Error marker on an animation. Once set the animation is never drawn again.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnimationError {
    /// Category.
    pub kind: AnimationErrorKind,
    /// Human-readable cause.
    pub message: String,
}

impl AnimationError {
    /// Build an error marker.
    pub fn new(kind: AnimationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// A loaded shader program bound to an animation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ShaderBinding {
    /// Program name.
    pub program_name: String,
    /// Loaded program.
    pub handle: Handle,
}

/// Transform and color tracks shared by images, text and objects.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TransformTracks {
    /// Position keyframes.
    pub position: Option<Track<Xyz<Scalar>>>,
    /// Pivot keyframes.
    pub pivot: Option<Track<Xyz<Scalar>>>,
    /// Rotation keyframes.
    pub angle: Option<Track<Angle<Scalar>>>,
    /// Scale keyframes.
    pub scale: Option<Track<Xyz<Scalar>>>,
    /// Color keyframes.
    pub color: Option<Track<Rgba<Scalar>>>,
}

/// Video stream attached to a texture unit.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VideoBinding {
    /// Loaded stream.
    pub handle: Handle,
    /// Playback settings, evaluated each frame.
    pub settings: VideoDef,
    /// Set once playback has been started.
    pub playing: bool,
}

/// One texture unit of an image animation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextureBinding {
    /// Texture name.
    pub name: String,
    /// Loaded texture.
    pub handle: Handle,
    /// Video playback, when the texture is a video.
    pub video: Option<VideoBinding>,
}

/// Textured quad.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImageAnimation {
    /// Texture units; the first one is drawn.
    pub textures: Vec<TextureBinding>,
    /// Blend override.
    pub blend: Option<Blend>,
    /// Screen or scene space.
    pub projection: Projection,
    /// Canvas size override.
    pub canvas: Option<(Scalar, Scalar)>,
    /// Texture coordinates.
    pub uv: Option<UvDef>,
    /// Screen alignment.
    pub align: Option<Align>,
    /// Transform tracks.
    pub transform: TransformTracks,
}

/// Text string.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextAnimation {
    /// Text.
    pub string: String,
    /// Font.
    pub font: Option<String>,
    /// Screen or scene space.
    pub projection: Projection,
    /// Clear depth before a 3-D draw.
    pub clear_depth_buffer: bool,
    /// Screen alignment.
    pub align: Option<Align>,
    /// Transform tracks.
    pub transform: TransformTracks,
}

/// Mesh from a file or a generated shape, and/or a per-frame object hook.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ObjectAnimation {
    /// Object name.
    pub name: Option<String>,
    /// Loaded mesh; `None` for hook-only objects.
    pub handle: Option<Handle>,
    /// Generated geometry.
    pub shape: Option<ShapeSpec>,
    /// Hook evaluated after the draw.
    pub function: Option<String>,
    /// Frames per second of the object's own animation.
    pub fps: Scalar,
    /// Fixed frame, overriding `fps`.
    pub frame: Option<Scalar>,
    /// Camera inside the object file.
    pub camera: String,
    /// Clear depth before drawing.
    pub clear_depth_buffer: bool,
    /// Render switches applied at load.
    pub options: ObjectOptions,
    /// Transform tracks.
    pub transform: TransformTracks,
}

impl ObjectAnimation {
    /// Custom shapes draw inside their own matrix scope.
    pub fn needs_matrix_scope(&self) -> bool {
        matches!(self.shape, Some(ShapeSpec::Custom))
    }
}

/// What an FBO animation does when drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FboAction {
    /// Render into the framebuffer.
    Begin,
    /// Back to the screen, then draw the framebuffer.
    End,
    /// Back to the screen.
    Unbind,
    /// Draw the framebuffer.
    Draw,
}

impl FboAction {
    /// Parse an action name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "begin" => Some(Self::Begin),
            "end" => Some(Self::End),
            "unbind" => Some(Self::Unbind),
            "draw" => Some(Self::Draw),
            _ => None,
        }
    }
}

/// Framebuffer step.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FboAnimation {
    /// Framebuffer name.
    pub name: String,
    /// Loaded framebuffer.
    pub handle: Handle,
    /// Action; `None` draws nothing.
    pub action: Option<FboAction>,
    /// Render dimension keyframes.
    pub dimension: Option<Track<Xyz<Scalar>>>,
}

/// What a light animation does to its light.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LightAction {
    /// Switch on.
    Begin,
    /// Switch off.
    End,
}

/// Light setup.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LightAnimation {
    /// Light index.
    pub index: u32,
    /// On/off switch.
    pub action: Option<LightAction>,
    /// Position keyframes.
    pub position: Option<Track<Xyz<Scalar>>>,
    /// Ambient color keyframes.
    pub ambient: Option<Track<Rgba<Scalar>>>,
    /// Diffuse color keyframes.
    pub diffuse: Option<Track<Rgba<Scalar>>>,
    /// Specular color keyframes.
    pub specular: Option<Track<Rgba<Scalar>>>,
    /// Object the light follows.
    pub relative_position: Option<String>,
    /// Fetched `relative_position` object.
    pub position_object: Option<Handle>,
}

/// Camera setup.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CameraAnimation {
    /// Projection keyframes; applied every frame, seeded from the host aspect ratio.
    pub perspective: Track<Perspective<Scalar>>,
    /// Position keyframes.
    pub position: Option<Track<Xyz<Scalar>>>,
    /// Look-at keyframes.
    pub target: Option<Track<Xyz<Scalar>>>,
    /// Up vector keyframes.
    pub up: Option<Track<Xyz<Scalar>>>,
    /// Object the camera follows.
    pub relative_position: Option<String>,
    /// Object the camera looks at.
    pub relative_target: Option<String>,
    /// Fetched `relative_position` object.
    pub position_object: Option<Handle>,
    /// Fetched `relative_target` object.
    pub target_object: Option<Handle>,
}

/// Resolved animation type.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnimationKind {
    /// Textured quad.
    Image(ImageAnimation),
    /// Text.
    Text(TextAnimation),
    /// Mesh or object hook.
    Object(ObjectAnimation),
    /// Framebuffer step.
    Fbo(FboAnimation),
    /// Light setup.
    Light(LightAnimation),
    /// Camera setup.
    Camera(CameraAnimation),
    /// Only hooks and shader binding.
    Hook,
}

impl AnimationKind {
    /// Short type name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Image(_) => "image",
            Self::Text(_) => "text",
            Self::Object(_) => "object",
            Self::Fbo(_) => "fbo",
            Self::Light(_) => "light",
            Self::Camera(_) => "camera",
            Self::Hook => "hook",
        }
    }
}

/// A fully processed animation, ready for the dispatcher.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Animation {
    /// Declaration order, synthetic entries included.
    pub id: u32,
    /// Render layer.
    pub layer: LayerKey,
    /// Active window.
    pub window: TimeWindow,
    /// Bound shader.
    pub shader: Option<ShaderBinding>,
    /// Sync flags and latest progress; `None` without a sync block.
    pub sync: Option<SyncState>,
    /// Hook evaluated once at load.
    pub init_function: Option<String>,
    /// Hook evaluated every drawn frame.
    pub run_function: Option<String>,
    /// Error marker.
    pub error: Option<AnimationError>,
    /// Type-specific data.
    #[serde(flatten)]
    pub kind: AnimationKind,
    /// Unrecognized fields of the definition, visible to expressions.
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Animation {
    /// Whether the dispatcher should draw this animation at `time`.
    pub fn is_active(&self, time: f64) -> bool {
        self.error.is_none() && self.window.contains(time)
    }
}

/// Expression view of one animation at one instant.
pub(crate) struct AnimationScope<'a> {
    pub(crate) time: f64,
    pub(crate) animation: &'a Animation,
}

impl AnimationScope<'_> {
    fn lookup_extra(&self, path: &[String]) -> Option<ExprValue> {
        let (first, rest) = path.split_first()?;
        let mut value = self.animation.extra.get(first)?;
        for key in rest {
            value = value.get(key.as_str())?;
        }
        match value {
            serde_json::Value::Number(n) => n.as_f64().map(ExprValue::Number),
            serde_json::Value::Bool(b) => Some(ExprValue::Bool(*b)),
            _ => None,
        }
    }
}

impl ExprContext for AnimationScope<'_> {
    fn time(&self) -> f64 {
        self.time
    }

    fn window(&self) -> TimeWindow {
        self.animation.window
    }

    fn lookup(&self, path: &[String]) -> Option<ExprValue> {
        let segments: Vec<&str> = path.iter().map(String::as_str).collect();
        let window = self.animation.window;
        match segments.as_slice() {
            ["time"] => Some(ExprValue::Number(self.time)),
            ["animation", "start"] => Some(ExprValue::Number(window.start)),
            ["animation", "duration"] => Some(ExprValue::Number(window.duration)),
            ["animation", "end"] => Some(ExprValue::Number(window.end)),
            ["animation", "sync", "progress"] => self
                .animation
                .sync
                .map(|s| ExprValue::Number(s.progress)),
            ["animation", _, ..] => self.lookup_extra(&path[1..]),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/definition.rs"]
mod tests;
