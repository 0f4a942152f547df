use crate::foundation::core::{Angle, Perspective, Rgba, Xyz};
use crate::resources::loader::Handle;
use crate::scene::model::{Align, BlendFactor, Projection};
use serde::Serialize;

/// Source/destination blend pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Blend {
    /// Source factor.
    pub src: BlendFactor,
    /// Destination factor.
    pub dst: BlendFactor,
}

impl Blend {
    /// Regular alpha blending.
    pub const ALPHA: Self = Self {
        src: BlendFactor::SrcAlpha,
        dst: BlendFactor::OneMinusSrcAlpha,
    };

    /// Additive blending.
    pub const ADDITIVE: Self = Self {
        src: BlendFactor::SrcAlpha,
        dst: BlendFactor::One,
    };
}

/// Which light color a value applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LightChannel {
    /// Ambient term.
    Ambient,
    /// Diffuse term.
    Diffuse,
    /// Specular term.
    Specular,
}

/// Evaluated video playback settings, applied before each draw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct VideoSettings {
    /// Playback origin in scene time.
    pub start_time: f64,
    /// Speed multiplier.
    pub speed: Option<f64>,
    /// Decode rate.
    pub fps: Option<f64>,
    /// Loop flag.
    pub looping: Option<f64>,
    /// Length in seconds.
    pub length: Option<f64>,
}

/// One textured quad with its evaluated transform. Texture state resets after the draw.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImageDraw {
    /// Primary texture.
    pub texture: Handle,
    /// Extra texture units, keyed by unit index starting at 1.
    pub units: Vec<(u32, Handle)>,
    /// Blend override.
    pub blend: Option<Blend>,
    /// Screen or scene space.
    pub projection: Projection,
    /// Canvas size override.
    pub canvas: Option<(f64, f64)>,
    /// Texture coordinate rectangle `(u_min, v_min, u_max, v_max)`.
    pub uv: Option<[f64; 4]>,
    /// Pivot.
    pub pivot: Option<Xyz<f64>>,
    /// Rotation.
    pub angle: Option<Angle<f64>>,
    /// Scale; x and y apply to a quad.
    pub scale: Xyz<f64>,
    /// Position.
    pub position: Option<Xyz<f64>>,
    /// Screen alignment.
    pub align: Option<Align>,
}

/// One text draw with its evaluated transform.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextDraw {
    /// Text.
    pub string: String,
    /// Screen or scene space.
    pub projection: Projection,
    /// Pivot.
    pub pivot: Option<Xyz<f64>>,
    /// Rotation in degrees per axis.
    pub rotation: Option<Xyz<f64>>,
    /// Glyph size, from the scale track.
    pub size: (f64, f64),
    /// Position.
    pub position: Option<Xyz<f64>>,
    /// Screen alignment, 2-D only.
    pub align: Option<Align>,
}

/// One mesh draw with its evaluated transform.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ObjectDraw {
    /// Mesh.
    pub object: Handle,
    /// Position.
    pub position: Option<Xyz<f64>>,
    /// Pivot.
    pub pivot: Option<Xyz<f64>>,
    /// Rotation.
    pub angle: Option<Angle<f64>>,
    /// Scale.
    pub scale: Xyz<f64>,
    /// Tint in `[0, 1]`.
    pub color: Option<[f64; 4]>,
    /// Camera name inside the object file.
    pub camera: String,
    /// Animation frame.
    pub frame: f64,
    /// Clear the depth buffer before drawing.
    pub clear_depth_buffer: bool,
}

/// Immediate-mode draw backend. Calls arrive in render order within one frame.
pub trait Renderer {
    /// Save the transform.
    fn push_matrix(&mut self);
    /// Restore the transform.
    fn pop_matrix(&mut self);
    /// Save the current color.
    fn push_attrib(&mut self);
    /// Restore the current color.
    fn pop_attrib(&mut self);

    /// Bind a shader program.
    fn enable_shader(&mut self, program: Handle, name: &str);
    /// Unbind a shader program.
    fn disable_shader(&mut self, program: Handle, name: &str);

    /// Current color in 0..=255 channel units.
    fn set_color(&mut self, color: Rgba<f64>);
    /// Set the blend function.
    fn set_blend(&mut self, blend: Blend);
    /// Clear depth.
    fn clear_depth(&mut self);

    /// Draw a textured quad.
    fn draw_image(&mut self, draw: &ImageDraw);
    /// Apply video settings.
    fn configure_video(&mut self, video: Handle, settings: &VideoSettings);
    /// Start video playback.
    fn play_video(&mut self, video: Handle);

    /// Use a font for following text draws.
    fn set_text_font(&mut self, name: &str);
    /// Draw text.
    fn draw_text(&mut self, draw: &TextDraw);

    /// Draw a mesh.
    fn draw_object(&mut self, draw: &ObjectDraw);

    /// Render dimensions of a framebuffer.
    fn set_fbo_render_dimensions(&mut self, fbo: Handle, width: f64, height: f64);
    /// Bind a framebuffer, or the screen with `None`.
    fn bind_fbo(&mut self, fbo: Option<Handle>);
    /// Match the viewport to a framebuffer, or the screen with `None`.
    fn update_viewport(&mut self, fbo: Option<Handle>);
    /// Bind framebuffer textures to the texture units, or unbind with `None`.
    fn bind_fbo_textures(&mut self, fbo: Option<Handle>);
    /// Draw a framebuffer's color texture over the whole screen.
    fn draw_fbo(&mut self, fbo: Handle);

    /// Light color in `[0, 1]`.
    fn set_light_color(&mut self, index: u32, channel: LightChannel, color: [f64; 4]);
    /// Light position.
    fn set_light_position(&mut self, index: u32, position: Xyz<f64>);
    /// Attach the light to an object, or detach with `None`.
    fn set_light_position_object(&mut self, index: u32, object: Option<Handle>);
    /// Switch a light on or off.
    fn set_light_enabled(&mut self, index: u32, on: bool);

    /// Camera projection.
    fn set_camera_perspective(&mut self, perspective: Perspective<f64>);
    /// Camera position.
    fn set_camera_position(&mut self, position: Xyz<f64>);
    /// Camera look-at point.
    fn set_camera_look_at(&mut self, target: Xyz<f64>);
    /// Camera up vector.
    fn set_camera_up(&mut self, up: Xyz<f64>);
    /// Follow an object's position, or stop with `None`.
    fn set_camera_position_object(&mut self, object: Option<Handle>);
    /// Look at an object, or stop with `None`.
    fn set_camera_target_object(&mut self, object: Option<Handle>);
    /// Reset viewport and view after camera setup.
    fn reset_view(&mut self);

    /// Enter a 2-D screen-space overlay of the given size.
    fn begin_overlay(&mut self, width: f64, height: f64);
    /// Fill a screen-space rectangle; color in `[0, 1]`.
    fn draw_screen_quad(&mut self, rect: kurbo::Rect, color: [f64; 4]);
    /// Leave the overlay.
    fn end_overlay(&mut self);
}
