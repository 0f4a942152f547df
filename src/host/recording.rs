//! In-memory collaborators for tests, the CLI and debugging.
//!
//! Each double records what it was asked to do so callers can assert on the exact call sequence.

use crate::foundation::core::{Perspective, Rgba, TimeWindow, Xyz};
use crate::host::{Clock, Host, ProgressReporter, StatusReporter, SyncProvider};
use crate::render::backend::{
    Blend, ImageDraw, LightChannel, ObjectDraw, Renderer, TextDraw, VideoSettings,
};
use crate::resources::loader::{FboConfig, Handle, ObjectOptions, ResourceLoader, ShaderSpec};
use crate::scene::model::ShapeSpec;
use serde::Serialize;
use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};

/// Clock whose time is set by hand.
#[derive(Debug, Default)]
pub struct ManualClock {
    time: Cell<f64>,
}

impl ManualClock {
    /// Clock reading `time`.
    pub fn new(time: f64) -> Self {
        Self {
            time: Cell::new(time),
        }
    }

    /// Move the clock.
    pub fn set(&self, time: f64) {
        self.time.set(time);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.time.get()
    }
}

/// Sync provider returning a fixed progress, recording every query.
#[derive(Debug, Default)]
pub struct FixedSync {
    /// Progress handed out.
    pub progress: f64,
    /// `(time, window)` of each query.
    pub queries: Vec<(f64, TimeWindow)>,
}

impl FixedSync {
    /// Provider always answering `progress`.
    pub fn new(progress: f64) -> Self {
        Self {
            progress,
            queries: Vec::new(),
        }
    }
}

impl SyncProvider for FixedSync {
    fn progress(&mut self, time: f64, window: TimeWindow) -> f64 {
        self.queries.push((time, window));
        self.progress
    }
}

/// Progress reporter that only counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CountingProgress {
    /// Sum of `add_resource_count` arguments.
    pub added: u32,
    /// Number of `notify_resource_loaded` calls.
    pub loaded: u32,
}

impl ProgressReporter for CountingProgress {
    fn add_resource_count(&mut self, n: u32) {
        self.added += n;
    }

    fn notify_resource_loaded(&mut self) {
        self.loaded += 1;
    }
}

/// Status reporter keeping every title it was given.
#[derive(Debug, Default)]
pub struct TitleLog {
    /// Titles in order.
    pub titles: Vec<String>,
}

impl StatusReporter for TitleLog {
    fn set_title(&mut self, title: &str) {
        self.titles.push(title.to_owned());
    }
}

/// Loader call, as recorded by [`MemoryLoader`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum LoaderCall {
    RequestImageAsync { name: String },
    WaitForPendingLoads,
    LoadImage { name: String },
    LoadVideo { name: String },
    LoadObject { name: String },
    LoadShape { name: String, shape: ShapeSpec },
    LoadShader { spec: ShaderSpec },
    InitFbo { name: String, config: FboConfig },
    ConfigureObject { object: Handle, options: ObjectOptions },
    SetTextFont { name: String },
}

/// Loader that hands out sequential handles without touching disk.
///
/// Names in `failing` load as invalid handles. Objects become findable once loaded.
/// Framebuffers are created once per name.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    next_id: u32,
    failing: BTreeSet<String>,
    objects: BTreeMap<String, Handle>,
    fbos: BTreeMap<String, Handle>,
    /// Every call in order.
    pub calls: Vec<LoaderCall>,
}

impl MemoryLoader {
    /// Loader where every load succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make loads of `name` fail.
    pub fn fail_on(mut self, name: impl Into<String>) -> Self {
        self.failing.insert(name.into());
        self
    }

    fn handle_for(&mut self, name: &str) -> Handle {
        if self.failing.contains(name) {
            return Handle::invalid();
        }
        self.next_id += 1;
        Handle::new(self.next_id)
    }
}

impl ResourceLoader for MemoryLoader {
    fn request_image_async(&mut self, name: &str) {
        self.calls.push(LoaderCall::RequestImageAsync {
            name: name.to_owned(),
        });
    }

    fn wait_for_pending_loads(&mut self) {
        self.calls.push(LoaderCall::WaitForPendingLoads);
    }

    fn load_image(&mut self, name: &str) -> Handle {
        self.calls.push(LoaderCall::LoadImage {
            name: name.to_owned(),
        });
        self.handle_for(name)
    }

    fn load_video(&mut self, name: &str) -> Handle {
        self.calls.push(LoaderCall::LoadVideo {
            name: name.to_owned(),
        });
        self.handle_for(name)
    }

    fn load_object(&mut self, name: &str) -> Handle {
        self.calls.push(LoaderCall::LoadObject {
            name: name.to_owned(),
        });
        let handle = self.handle_for(name);
        if handle.valid {
            self.objects.insert(name.to_owned(), handle);
        }
        handle
    }

    fn load_shape(&mut self, name: &str, shape: &ShapeSpec) -> Handle {
        self.calls.push(LoaderCall::LoadShape {
            name: name.to_owned(),
            shape: shape.clone(),
        });
        let handle = self.handle_for(name);
        if handle.valid {
            self.objects.insert(name.to_owned(), handle);
        }
        handle
    }

    fn load_shader(&mut self, spec: &ShaderSpec) -> Handle {
        self.calls.push(LoaderCall::LoadShader { spec: spec.clone() });
        let name = spec.program_name.clone();
        self.handle_for(&name)
    }

    fn init_fbo(&mut self, name: &str, config: &FboConfig) -> Handle {
        self.calls.push(LoaderCall::InitFbo {
            name: name.to_owned(),
            config: *config,
        });
        if let Some(existing) = self.fbos.get(name) {
            return *existing;
        }
        let handle = self.handle_for(name);
        if handle.valid {
            self.fbos.insert(name.to_owned(), handle);
        }
        handle
    }

    fn find_object(&mut self, name: &str) -> Option<Handle> {
        self.objects.get(name).copied()
    }

    fn configure_object(&mut self, object: Handle, options: &ObjectOptions) {
        self.calls.push(LoaderCall::ConfigureObject {
            object,
            options: *options,
        });
    }

    fn set_text_font(&mut self, name: &str) {
        self.calls.push(LoaderCall::SetTextFont {
            name: name.to_owned(),
        });
    }
}

/// Renderer call, as recorded by [`RecordingRenderer`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum DrawCall {
    PushMatrix,
    PopMatrix,
    PushAttrib,
    PopAttrib,
    EnableShader { program: Handle, name: String },
    DisableShader { program: Handle, name: String },
    SetColor { color: Rgba<f64> },
    SetBlend { blend: Blend },
    ClearDepth,
    DrawImage(ImageDraw),
    ConfigureVideo { video: Handle, settings: VideoSettings },
    PlayVideo { video: Handle },
    SetTextFont { name: String },
    DrawText(TextDraw),
    DrawObject(ObjectDraw),
    SetFboRenderDimensions { fbo: Handle, width: f64, height: f64 },
    BindFbo { fbo: Option<Handle> },
    UpdateViewport { fbo: Option<Handle> },
    BindFboTextures { fbo: Option<Handle> },
    DrawFbo { fbo: Handle },
    SetLightColor { index: u32, channel: LightChannel, color: [f64; 4] },
    SetLightPosition { index: u32, position: Xyz<f64> },
    SetLightPositionObject { index: u32, object: Option<Handle> },
    SetLightEnabled { index: u32, on: bool },
    SetCameraPerspective { perspective: Perspective<f64> },
    SetCameraPosition { position: Xyz<f64> },
    SetCameraLookAt { target: Xyz<f64> },
    SetCameraUp { up: Xyz<f64> },
    SetCameraPositionObject { object: Option<Handle> },
    SetCameraTargetObject { object: Option<Handle> },
    ResetView,
    BeginOverlay { width: f64, height: f64 },
    DrawScreenQuad { rect: kurbo::Rect, color: [f64; 4] },
    EndOverlay,
}

/// Renderer that records every call.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    /// Calls in order.
    pub calls: Vec<DrawCall>,
}

impl RecordingRenderer {
    /// Empty recording.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything recorded so far.
    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// Recorded image draws.
    pub fn images(&self) -> impl Iterator<Item = &ImageDraw> {
        self.calls.iter().filter_map(|c| match c {
            DrawCall::DrawImage(d) => Some(d),
            _ => None,
        })
    }

    /// Recorded color changes.
    pub fn colors(&self) -> impl Iterator<Item = Rgba<f64>> + '_ {
        self.calls.iter().filter_map(|c| match c {
            DrawCall::SetColor { color } => Some(*color),
            _ => None,
        })
    }
}

impl Renderer for RecordingRenderer {
    fn push_matrix(&mut self) {
        self.calls.push(DrawCall::PushMatrix);
    }

    fn pop_matrix(&mut self) {
        self.calls.push(DrawCall::PopMatrix);
    }

    fn push_attrib(&mut self) {
        self.calls.push(DrawCall::PushAttrib);
    }

    fn pop_attrib(&mut self) {
        self.calls.push(DrawCall::PopAttrib);
    }

    fn enable_shader(&mut self, program: Handle, name: &str) {
        self.calls.push(DrawCall::EnableShader {
            program,
            name: name.to_owned(),
        });
    }

    fn disable_shader(&mut self, program: Handle, name: &str) {
        self.calls.push(DrawCall::DisableShader {
            program,
            name: name.to_owned(),
        });
    }

    fn set_color(&mut self, color: Rgba<f64>) {
        self.calls.push(DrawCall::SetColor { color });
    }

    fn set_blend(&mut self, blend: Blend) {
        self.calls.push(DrawCall::SetBlend { blend });
    }

    fn clear_depth(&mut self) {
        self.calls.push(DrawCall::ClearDepth);
    }

    fn draw_image(&mut self, draw: &ImageDraw) {
        self.calls.push(DrawCall::DrawImage(draw.clone()));
    }

    fn configure_video(&mut self, video: Handle, settings: &VideoSettings) {
        self.calls.push(DrawCall::ConfigureVideo {
            video,
            settings: *settings,
        });
    }

    fn play_video(&mut self, video: Handle) {
        self.calls.push(DrawCall::PlayVideo { video });
    }

    fn set_text_font(&mut self, name: &str) {
        self.calls.push(DrawCall::SetTextFont {
            name: name.to_owned(),
        });
    }

    fn draw_text(&mut self, draw: &TextDraw) {
        self.calls.push(DrawCall::DrawText(draw.clone()));
    }

    fn draw_object(&mut self, draw: &ObjectDraw) {
        self.calls.push(DrawCall::DrawObject(draw.clone()));
    }

    fn set_fbo_render_dimensions(&mut self, fbo: Handle, width: f64, height: f64) {
        self.calls.push(DrawCall::SetFboRenderDimensions { fbo, width, height });
    }

    fn bind_fbo(&mut self, fbo: Option<Handle>) {
        self.calls.push(DrawCall::BindFbo { fbo });
    }

    fn update_viewport(&mut self, fbo: Option<Handle>) {
        self.calls.push(DrawCall::UpdateViewport { fbo });
    }

    fn bind_fbo_textures(&mut self, fbo: Option<Handle>) {
        self.calls.push(DrawCall::BindFboTextures { fbo });
    }

    fn draw_fbo(&mut self, fbo: Handle) {
        self.calls.push(DrawCall::DrawFbo { fbo });
    }

    fn set_light_color(&mut self, index: u32, channel: LightChannel, color: [f64; 4]) {
        self.calls.push(DrawCall::SetLightColor {
            index,
            channel,
            color,
        });
    }

    fn set_light_position(&mut self, index: u32, position: Xyz<f64>) {
        self.calls.push(DrawCall::SetLightPosition { index, position });
    }

    fn set_light_position_object(&mut self, index: u32, object: Option<Handle>) {
        self.calls
            .push(DrawCall::SetLightPositionObject { index, object });
    }

    fn set_light_enabled(&mut self, index: u32, on: bool) {
        self.calls.push(DrawCall::SetLightEnabled { index, on });
    }

    fn set_camera_perspective(&mut self, perspective: Perspective<f64>) {
        self.calls
            .push(DrawCall::SetCameraPerspective { perspective });
    }

    fn set_camera_position(&mut self, position: Xyz<f64>) {
        self.calls.push(DrawCall::SetCameraPosition { position });
    }

    fn set_camera_look_at(&mut self, target: Xyz<f64>) {
        self.calls.push(DrawCall::SetCameraLookAt { target });
    }

    fn set_camera_up(&mut self, up: Xyz<f64>) {
        self.calls.push(DrawCall::SetCameraUp { up });
    }

    fn set_camera_position_object(&mut self, object: Option<Handle>) {
        self.calls.push(DrawCall::SetCameraPositionObject { object });
    }

    fn set_camera_target_object(&mut self, object: Option<Handle>) {
        self.calls.push(DrawCall::SetCameraTargetObject { object });
    }

    fn reset_view(&mut self) {
        self.calls.push(DrawCall::ResetView);
    }

    fn begin_overlay(&mut self, width: f64, height: f64) {
        self.calls.push(DrawCall::BeginOverlay { width, height });
    }

    fn draw_screen_quad(&mut self, rect: kurbo::Rect, color: [f64; 4]) {
        self.calls.push(DrawCall::DrawScreenQuad { rect, color });
    }

    fn end_overlay(&mut self) {
        self.calls.push(DrawCall::EndOverlay);
    }
}

/// One of every double, lending itself out as a [`Host`].
#[derive(Debug, Default)]
pub struct RecordingHost {
    /// Clock.
    pub clock: ManualClock,
    /// Loader.
    pub loader: MemoryLoader,
    /// Renderer.
    pub renderer: RecordingRenderer,
    /// Sync provider.
    pub sync: FixedSync,
    /// Progress counters.
    pub progress: CountingProgress,
    /// Status titles.
    pub titles: TitleLog,
}

impl RecordingHost {
    /// Doubles with the clock at `time`.
    pub fn at(time: f64) -> Self {
        Self {
            clock: ManualClock::new(time),
            ..Self::default()
        }
    }

    /// Borrow everything as a [`Host`].
    pub fn host(&mut self) -> Host<'_> {
        Host {
            clock: &self.clock,
            loader: &mut self.loader,
            renderer: &mut self.renderer,
            sync: &mut self.sync,
            progress: &mut self.progress,
            status: &mut self.titles,
        }
    }
}
