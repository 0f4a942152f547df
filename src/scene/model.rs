use crate::animation::cascade::{AngleDef, PerspectiveDef, RgbaDef, ScaleDef, XyzDef};
use crate::animation::sync::SyncDef;
use crate::animation::track::{TimeFields, TimeValue};
use crate::animation::value::Scalar;
use serde::{Deserialize, Serialize};

/// A scene file: either a bare array of animations or `{ "animations": [...] }`.
///
/// Entries are parsed one at a time; an entry that does not fit [`AnimationDef`] is kept in
/// `invalid` instead of failing the whole document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SceneDef {
    /// Well-formed animations in declaration order.
    pub animations: Vec<AnimationDef>,
    /// Entries that could not be parsed.
    pub invalid: Vec<InvalidEntry>,
}

/// A scene entry that failed to parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidEntry {
    /// Position in the document.
    pub index: usize,
    /// The entry's `layer`, when that part of it was readable.
    pub layer: Option<LayerValue>,
    /// Parser message.
    pub message: String,
    /// The entry as authored.
    pub raw: serde_json::Value,
}

/// One scene entry in document order.
#[derive(Debug, Clone)]
pub enum SceneEntry {
    /// Parsed definition.
    Def(AnimationDef),
    /// Entry that failed to parse.
    Invalid(InvalidEntry),
}

impl SceneEntry {
    /// The authored layer, if any.
    pub fn layer(&self) -> Option<&LayerValue> {
        match self {
            Self::Def(def) => def.layer.as_ref(),
            Self::Invalid(invalid) => invalid.layer.as_ref(),
        }
    }
}

impl SceneDef {
    /// Parse every entry separately.
    pub fn from_values(values: Vec<serde_json::Value>) -> Self {
        let mut scene = Self::default();
        for (index, raw) in values.into_iter().enumerate() {
            match AnimationDef::deserialize(&raw) {
                Ok(def) => scene.animations.push(def),
                Err(e) => scene.invalid.push(InvalidEntry {
                    index,
                    layer: raw
                        .get("layer")
                        .and_then(|v| LayerValue::deserialize(v).ok()),
                    message: format!("animation {index} could not be parsed: {e}"),
                    raw,
                }),
            }
        }
        scene
    }

    /// All entries, parsed or not, in document order.
    pub fn into_entries(self) -> Vec<SceneEntry> {
        let total = self.animations.len() + self.invalid.len();
        let mut defs = self.animations.into_iter();
        let mut invalid = self.invalid.into_iter().peekable();
        let mut out = Vec::with_capacity(total);
        for index in 0..total {
            match invalid.next_if(|e| e.index == index) {
                Some(entry) => out.push(SceneEntry::Invalid(entry)),
                None => match defs.next() {
                    Some(def) => out.push(SceneEntry::Def(def)),
                    None => out.extend(invalid.by_ref().map(SceneEntry::Invalid)),
                },
            }
        }
        out
    }
}

impl<'de> Deserialize<'de> for SceneDef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Bare(Vec<serde_json::Value>),
            Wrapped { animations: Vec<serde_json::Value> },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Bare(values) | Repr::Wrapped { animations: values } => {
                Ok(Self::from_values(values))
            }
        }
    }
}

/// One animation definition as authored. Field presence decides the animation kind
/// during processing; everything not recognized is kept in `extra` and stays visible
/// to expressions as `animation.<field>`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationDef {
    /// Start time.
    #[serde(default)]
    pub start: Option<TimeValue>,
    /// Duration.
    #[serde(default)]
    pub duration: Option<TimeValue>,
    /// End time.
    #[serde(default)]
    pub end: Option<TimeValue>,
    /// Render layer; numbers are zero padded to five digits.
    #[serde(default)]
    pub layer: Option<LayerValue>,

    /// Texture(s) to draw.
    #[serde(default)]
    pub image: Option<ImageField>,
    /// Text to draw.
    #[serde(default)]
    pub text: Option<TextDef>,
    /// Object file or generated shape name.
    #[serde(default)]
    pub object: Option<String>,
    /// Hook evaluated when the object is drawn.
    #[serde(default)]
    pub object_function: Option<String>,
    /// Generated shape for `object`.
    #[serde(default)]
    pub shape: Option<ShapeSpec>,
    /// Framebuffer directive.
    #[serde(default)]
    pub fbo: Option<FboDef>,
    /// Light directive.
    #[serde(default)]
    pub light: Option<LightDef>,
    /// Object camera name, or the marker of a camera animation.
    #[serde(default)]
    pub camera: Option<serde_json::Value>,
    /// Shader program, or an array of programs for a multi-pass pipeline.
    #[serde(default)]
    pub shader: Option<ShaderField>,
    /// Render this animation into a framebuffer.
    #[serde(default)]
    pub pass_to_fbo: Option<PassToFbo>,

    /// Position track.
    #[serde(default)]
    pub position: Option<Vec<XyzDef>>,
    /// Pivot track.
    #[serde(default)]
    pub pivot: Option<Vec<XyzDef>>,
    /// Scale track.
    #[serde(default)]
    pub scale: Option<Vec<ScaleDef>>,
    /// Rotation track.
    #[serde(default)]
    pub angle: Option<Vec<AngleDef>>,
    /// Color track.
    #[serde(default)]
    pub color: Option<Vec<RgbaDef>>,
    /// Image projection mode, or a camera projection track.
    #[serde(default)]
    pub perspective: Option<PerspectiveField>,
    /// FBO render dimension track.
    #[serde(default)]
    pub dimension: Option<Vec<XyzDef>>,
    /// Camera look-at track.
    #[serde(default)]
    pub target: Option<Vec<XyzDef>>,
    /// Camera up vector track.
    #[serde(default)]
    pub up: Option<Vec<XyzDef>>,
    /// Light ambient color track.
    #[serde(default)]
    pub ambient_color: Option<Vec<RgbaDef>>,
    /// Light diffuse color track.
    #[serde(default)]
    pub diffuse_color: Option<Vec<RgbaDef>>,
    /// Light specular color track.
    #[serde(default)]
    pub specular_color: Option<Vec<RgbaDef>>,

    /// Sync flags.
    #[serde(default)]
    pub sync: Option<SyncDef>,
    /// Hook evaluated once while processing.
    #[serde(default)]
    pub init_function: Option<String>,
    /// Hook evaluated every drawn frame.
    #[serde(default)]
    pub run_function: Option<String>,

    /// Explicit blend factors.
    #[serde(default)]
    pub blend: Option<BlendDef>,
    /// Additive blending shorthand.
    #[serde(default)]
    pub additive: Option<bool>,
    /// Screen alignment.
    #[serde(default)]
    pub align: Option<Align>,
    /// Canvas width override.
    #[serde(default)]
    pub canvas_width: Option<Scalar>,
    /// Canvas height override.
    #[serde(default)]
    pub canvas_height: Option<Scalar>,
    /// Texture coordinate rectangle.
    #[serde(default)]
    pub uv: Option<UvDef>,

    /// Object animation frames per second.
    #[serde(default)]
    pub fps: Option<Scalar>,
    /// Fixed object animation frame.
    #[serde(default)]
    pub frame: Option<Scalar>,
    /// Clear depth before drawing.
    #[serde(default)]
    pub clear_depth_buffer: Option<bool>,
    /// Object lighting toggle.
    #[serde(default)]
    pub object_lighting: Option<bool>,
    /// Flat vertex colors toggle.
    #[serde(default)]
    pub simple_colors: Option<bool>,
    /// Use the object's own camera.
    #[serde(default)]
    pub object_camera: Option<bool>,

    /// Object the light position follows.
    #[serde(default)]
    pub light_relative_position: Option<String>,
    /// Object the camera position follows.
    #[serde(default)]
    pub camera_relative_position: Option<String>,
    /// Object the camera looks at.
    #[serde(default)]
    pub camera_relative_target: Option<String>,

    /// Unrecognized fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AnimationDef {
    /// The animation's own timing fields.
    pub fn time_fields(&self) -> TimeFields {
        TimeFields {
            start: self.start.clone(),
            duration: self.duration.clone(),
            end: self.end.clone(),
        }
    }
}

/// Layer as written: a number or an arbitrary sort key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayerValue {
    /// Numeric layer.
    Number(f64),
    /// Verbatim key.
    Text(String),
}

/// `image` as a name, a `{name, video}` object or an array of either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageField {
    /// Several texture units; the first one is the drawn texture.
    Many(Vec<ImageRef>),
    /// Single texture.
    One(ImageRef),
}

impl ImageField {
    /// Texture references in unit order.
    pub fn refs(&self) -> Vec<&ImageRef> {
        match self {
            Self::Many(v) => v.iter().collect(),
            Self::One(r) => vec![r],
        }
    }

    /// Rewrite every texture name in place.
    pub fn rename(&mut self, mut f: impl FnMut(&str) -> Option<String>) {
        let refs: Vec<&mut ImageRef> = match self {
            Self::Many(v) => v.iter_mut().collect(),
            Self::One(r) => vec![r],
        };
        for r in refs {
            if let Some(name) = f(r.name()) {
                r.set_name(name);
            }
        }
    }
}

/// One texture reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageRef {
    /// Plain file name.
    Name(String),
    /// File name with optional video playback settings.
    Spec {
        /// File name.
        name: String,
        /// Video settings when the texture is a video.
        #[serde(default)]
        video: Option<VideoDef>,
    },
}

impl ImageRef {
    /// Texture name.
    pub fn name(&self) -> &str {
        match self {
            Self::Name(n) | Self::Spec { name: n, .. } => n,
        }
    }

    /// Video settings, if any.
    pub fn video(&self) -> Option<&VideoDef> {
        match self {
            Self::Name(_) => None,
            Self::Spec { video, .. } => video.as_ref(),
        }
    }

    fn set_name(&mut self, new: String) {
        match self {
            Self::Name(n) | Self::Spec { name: n, .. } => *n = new,
        }
    }
}

/// Video playback settings for a texture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoDef {
    /// Playback speed multiplier.
    #[serde(default)]
    pub speed: Option<Scalar>,
    /// Decode rate.
    #[serde(default)]
    pub fps: Option<Scalar>,
    /// Loop flag (non-zero loops).
    #[serde(default, rename = "loop")]
    pub looping: Option<Scalar>,
    /// Playback length in seconds.
    #[serde(default)]
    pub length: Option<Scalar>,
}

/// 2-D screen space or 3-D scene space drawing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Projection {
    /// Screen space.
    #[default]
    #[serde(rename = "2d")]
    TwoD,
    /// Scene space.
    #[serde(rename = "3d")]
    ThreeD,
}

/// `perspective` is a projection mode on images and a track on cameras.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PerspectiveField {
    /// Image projection mode.
    Mode(Projection),
    /// Camera projection keyframes.
    Track(Vec<PerspectiveDef>),
}

/// Text directive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextDef {
    /// Text to draw.
    #[serde(default)]
    pub string: String,
    /// Font name.
    #[serde(default)]
    pub name: Option<String>,
    /// Projection mode, `2d` by default.
    #[serde(default)]
    pub perspective: Option<Projection>,
}

/// Framebuffer directive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FboDef {
    /// Framebuffer name, `"fbo"` by default.
    #[serde(default)]
    pub name: Option<String>,
    /// `begin`, `end`, `unbind` or `draw`.
    #[serde(default)]
    pub action: Option<String>,
    /// Keep a depth attachment.
    #[serde(default)]
    pub store_depth: Option<bool>,
    /// Fixed width.
    #[serde(default)]
    pub width: Option<u32>,
    /// Fixed height.
    #[serde(default)]
    pub height: Option<u32>,
    /// Render dimension track.
    #[serde(default)]
    pub dimension: Option<Vec<XyzDef>>,
}

/// Name used when an FBO directive has none.
pub const DEFAULT_FBO_NAME: &str = "fbo";

impl FboDef {
    /// Name with the default applied.
    pub fn resolved_name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_FBO_NAME)
    }
}

/// Light directive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LightDef {
    /// Light slot.
    #[serde(default)]
    pub index: u32,
    /// `begin` switches on, `end` switches off.
    #[serde(default)]
    pub action: Option<String>,
}

/// Shader program definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShaderDef {
    /// Shader source file(s).
    pub name: ShaderSources,
    /// Program name; defaults to the last source name.
    #[serde(default)]
    pub program_name: Option<String>,
    /// Uniform values and other program settings.
    #[serde(flatten)]
    pub variables: serde_json::Map<String, serde_json::Value>,
}

impl ShaderDef {
    /// Program name with the default applied.
    pub fn resolved_program_name(&self) -> String {
        match &self.program_name {
            Some(n) => n.clone(),
            None => self.name.last().unwrap_or_default().to_owned(),
        }
    }
}

/// One or several shader sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShaderSources {
    /// Single source.
    One(String),
    /// Several sources linked into one program.
    Many(Vec<String>),
}

impl ShaderSources {
    /// Sources as a list.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::One(s) => vec![s.clone()],
            Self::Many(v) => v.clone(),
        }
    }

    fn last(&self) -> Option<&str> {
        match self {
            Self::One(s) => Some(s),
            Self::Many(v) => v.last().map(String::as_str),
        }
    }
}

/// `shader` as a single program or a multi-pass array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShaderField {
    /// Multi-pass pipeline.
    Many(Vec<ShaderDef>),
    /// Single program.
    One(ShaderDef),
}

/// Render-to-texture directive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassToFbo {
    /// Target framebuffer.
    pub name: String,
    /// Layer of the synthesized bind entry.
    #[serde(default)]
    pub begin_layer: Option<LayerValue>,
    /// Layer of the synthesized unbind entry.
    #[serde(default)]
    pub end_layer: Option<LayerValue>,
    /// Action of the bind entry, `begin` by default.
    #[serde(default)]
    pub begin_action: Option<String>,
    /// Action of the unbind entry, `unbind` by default.
    #[serde(default)]
    pub end_action: Option<String>,
}

/// Generated object geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum ShapeSpec {
    /// UV sphere.
    Sphere {
        /// Radius.
        #[serde(default = "one")]
        radius: f64,
        /// Latitude bands.
        #[serde(default = "thirty")]
        lats: u32,
        /// Longitude bands.
        #[serde(default = "thirty")]
        longs: u32,
    },
    /// Capped cylinder or cone.
    Cylinder {
        /// Base radius.
        #[serde(default = "one")]
        base: f64,
        /// Top radius.
        #[serde(default = "one")]
        top: f64,
        /// Height.
        #[serde(default = "one")]
        height: f64,
        /// Radial slices.
        #[serde(default = "thirty")]
        slices: u32,
        /// Height stacks.
        #[serde(default = "thirty")]
        stacks: u32,
    },
    /// Flat annulus.
    Disk {
        /// Inner radius.
        #[serde(default)]
        inner: f64,
        /// Outer radius.
        #[serde(default = "one")]
        outer: f64,
        /// Radial slices.
        #[serde(default = "thirty")]
        slices: u32,
        /// Concentric loops.
        #[serde(default = "thirty")]
        loops: u32,
    },
    /// Unit cube.
    Cube,
    /// Host-provided matrix shape.
    Matrix,
    /// Host-provided shape drawn inside its own matrix scope.
    Custom,
}

fn one() -> f64 {
    1.0
}

fn thirty() -> u32 {
    30
}

/// Explicit blend factors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlendDef {
    /// Source factor.
    #[serde(default)]
    pub src: Option<BlendFactor>,
    /// Destination factor.
    #[serde(default)]
    pub dst: Option<BlendFactor>,
}

/// OpenGL blend factor, accepted as its GL enum value or name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    DstColor,
    OneMinusDstColor,
}

impl BlendFactor {
    const TABLE: [(Self, u32, &'static str); 10] = [
        (Self::Zero, 0, "ZERO"),
        (Self::One, 1, "ONE"),
        (Self::SrcColor, 0x0300, "SRC_COLOR"),
        (Self::OneMinusSrcColor, 0x0301, "ONE_MINUS_SRC_COLOR"),
        (Self::SrcAlpha, 0x0302, "SRC_ALPHA"),
        (Self::OneMinusSrcAlpha, 0x0303, "ONE_MINUS_SRC_ALPHA"),
        (Self::DstAlpha, 0x0304, "DST_ALPHA"),
        (Self::OneMinusDstAlpha, 0x0305, "ONE_MINUS_DST_ALPHA"),
        (Self::DstColor, 0x0306, "DST_COLOR"),
        (Self::OneMinusDstColor, 0x0307, "ONE_MINUS_DST_COLOR"),
    ];

    /// GL enum value.
    pub fn gl_code(self) -> u32 {
        Self::TABLE
            .iter()
            .find(|(f, _, _)| *f == self)
            .map_or(0, |(_, code, _)| *code)
    }

    /// Look up a GL enum value.
    pub fn from_gl(code: u32) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(_, c, _)| *c == code)
            .map(|(f, _, _)| *f)
    }

    /// Look up `SRC_ALPHA` or `GL_SRC_ALPHA` style names.
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.trim().to_ascii_uppercase();
        let bare = upper.strip_prefix("GL_").unwrap_or(&upper);
        Self::TABLE
            .iter()
            .find(|(_, _, n)| *n == bare)
            .map(|(f, _, _)| *f)
    }
}

impl<'de> Deserialize<'de> for BlendFactor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Code(u32),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Code(c) => Self::from_gl(c).ok_or_else(|| {
                serde::de::Error::custom(format!("unknown blend factor 0x{c:04x}"))
            }),
            Repr::Name(n) => Self::from_name(&n)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown blend factor \"{n}\""))),
        }
    }
}

/// Screen alignment, accepted as the host's numeric constant or its name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum Align {
    #[default]
    None,
    Center,
    Horizontal,
    Vertical,
    Left,
    Right,
}

impl Align {
    const ORDER: [Self; 6] = [
        Self::None,
        Self::Center,
        Self::Horizontal,
        Self::Vertical,
        Self::Left,
        Self::Right,
    ];

    /// Host constant.
    pub fn code(self) -> u32 {
        Self::ORDER.iter().position(|a| *a == self).unwrap_or(0) as u32
    }
}

impl<'de> Deserialize<'de> for Align {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Code(u32),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Code(c) => Self::ORDER
                .get(c as usize)
                .copied()
                .ok_or_else(|| serde::de::Error::custom(format!("unknown align {c}"))),
            Repr::Name(n) => match n.trim().to_ascii_uppercase().as_str() {
                "NONE" => Ok(Self::None),
                "CENTER" => Ok(Self::Center),
                "HORIZONTAL" => Ok(Self::Horizontal),
                "VERTICAL" => Ok(Self::Vertical),
                "LEFT" => Ok(Self::Left),
                "RIGHT" => Ok(Self::Right),
                _ => Err(serde::de::Error::custom(format!("unknown align \"{n}\""))),
            },
        }
    }
}

/// Texture coordinate rectangle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UvDef {
    /// Left.
    #[serde(default)]
    pub u_min: Scalar,
    /// Bottom.
    #[serde(default)]
    pub v_min: Scalar,
    /// Right.
    #[serde(default = "unit_scalar")]
    pub u_max: Scalar,
    /// Top.
    #[serde(default = "unit_scalar")]
    pub v_max: Scalar,
}

fn unit_scalar() -> Scalar {
    Scalar::Number(1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
