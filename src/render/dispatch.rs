use crate::animation::cascade::seeds;
use crate::animation::ease::Interpolate;
use crate::animation::sync::SyncProperty;
use crate::animation::track::Track;
use crate::animation::value::{ResolveScalars, Scalar};
use crate::config::PlayerSettings;
use crate::eval::evaluator::PropertyEvaluator;
use crate::expression::engine::ExpressionEngine;
use crate::foundation::core::Xyz;
use crate::foundation::error::SceneResult;
use crate::host::Host;
use crate::render::backend::{
    ImageDraw, LightChannel, ObjectDraw, Renderer, TextDraw, VideoSettings,
};
use crate::resources::loader::Handle;
use crate::scene::context::{SceneContext, report_error};
use crate::scene::definition::{
    Animation, AnimationError, AnimationErrorKind, AnimationKind, CameraAnimation, FboAction,
    FboAnimation, ImageAnimation, LightAction, LightAnimation, ObjectAnimation, TextAnimation,
};
use crate::scene::model::Projection;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
/// Per-frame counters.
pub struct FrameStats {
    /// Layers visited.
    pub layers: usize,
    /// Animations drawn.
    pub drawn: usize,
    /// Animations outside their window or already in error.
    pub skipped: usize,
    /// Animations that failed while drawing this frame.
    pub failed: usize,
}

/// Frame half of the engine: draws every active animation in layer order.
pub struct Dispatcher<'c> {
    ctx: &'c mut SceneContext,
}

impl<'c> Dispatcher<'c> {
    /// Draw from `ctx`.
    pub fn new(ctx: &'c mut SceneContext) -> Self {
        Self { ctx }
    }

    /// Draw one frame at the clock's current time.
    pub fn draw_frame(&mut self, host: &mut Host<'_>) -> FrameStats {
        let time = host.clock.now();
        self.draw_at(time, host)
    }

    /// Draw one frame at `time`.
    ///
    /// Each layer is wrapped in a matrix scope and each animation in an attribute scope, so the
    /// renderer sees balanced push/pop pairs whatever happens inside.
    #[tracing::instrument(skip(self, host))]
    pub fn draw_at(&mut self, time: f64, host: &mut Host<'_>) -> FrameStats {
        let ctx = &mut *self.ctx;
        let engine = &*ctx.engine;
        let settings = &ctx.settings;
        let mut stats = FrameStats::default();

        for (_, layer) in ctx.layers.iter_mut() {
            stats.layers += 1;
            host.renderer.push_matrix();
            for animation in layer.iter_mut() {
                host.renderer.push_attrib();
                if !animation.is_active(time) {
                    stats.skipped += 1;
                } else if draw_animation(time, animation, engine, settings, host) {
                    stats.drawn += 1;
                } else {
                    stats.failed += 1;
                }
                host.renderer.pop_attrib();
            }
            host.renderer.pop_matrix();
        }

        if stats.failed > 0 {
            tracing::warn!(failed = stats.failed, "animations failed this frame");
        }
        stats
    }
}

/// Runtime state gathered while drawing, written back once the draw is done.
#[derive(Default)]
struct Effects {
    started_videos: Vec<usize>,
    light_object: Option<Handle>,
    camera_position_object: Option<Handle>,
    camera_target_object: Option<Handle>,
}

/// Returns false when the animation failed and is now flagged.
fn draw_animation(
    time: f64,
    animation: &mut Animation,
    engine: &dyn ExpressionEngine,
    settings: &PlayerSettings,
    host: &mut Host<'_>,
) -> bool {
    let window = animation.window;
    if let Some(sync) = animation.sync.as_mut() {
        sync.progress = host.sync.progress(time, window);
    }

    if let Some(shader) = &animation.shader {
        host.renderer.enable_shader(shader.handle, &shader.program_name);
    }

    let mut effects = Effects::default();
    let result = {
        let eval = PropertyEvaluator::new(engine, &*animation, time);
        let mut draw = Draw {
            eval: &eval,
            time,
            animation: &*animation,
            settings,
            host: &mut *host,
            effects: &mut effects,
        };
        draw.kind().and_then(|()| match &animation.run_function {
            Some(src) => eval.hook(src),
            None => Ok(()),
        })
    };

    if let Some(shader) = &animation.shader {
        host.renderer.disable_shader(shader.handle, &shader.program_name);
    }

    apply_effects(animation, effects);

    match result {
        Ok(()) => true,
        Err(e) => {
            let error = AnimationError::new(AnimationErrorKind::Expression, e.to_string());
            report_error(host.status, &error, &*animation);
            animation.error = Some(error);
            false
        }
    }
}

fn apply_effects(animation: &mut Animation, effects: Effects) {
    match &mut animation.kind {
        AnimationKind::Image(image) => {
            for i in effects.started_videos {
                if let Some(video) = image.textures.get_mut(i).and_then(|t| t.video.as_mut()) {
                    video.playing = true;
                }
            }
        }
        AnimationKind::Light(light) => {
            if effects.light_object.is_some() {
                light.position_object = effects.light_object;
            }
        }
        AnimationKind::Camera(camera) => {
            if effects.camera_position_object.is_some() {
                camera.position_object = effects.camera_position_object;
            }
            if effects.camera_target_object.is_some() {
                camera.target_object = effects.camera_target_object;
            }
        }
        _ => {}
    }
}

struct Draw<'d, 'h> {
    eval: &'d PropertyEvaluator<'d>,
    time: f64,
    animation: &'d Animation,
    settings: &'d PlayerSettings,
    host: &'d mut Host<'h>,
    effects: &'d mut Effects,
}

impl Draw<'_, '_> {
    fn kind(&mut self) -> SceneResult<()> {
        let animation = self.animation;
        match &animation.kind {
            AnimationKind::Image(image) => self.image(image),
            AnimationKind::Text(text) => self.text(text),
            AnimationKind::Object(object) => self.object(object),
            AnimationKind::Fbo(fbo) => self.fbo(fbo),
            AnimationKind::Light(light) => self.light(light),
            AnimationKind::Camera(camera) => self.camera(camera),
            AnimationKind::Hook => Ok(()),
        }
    }

    /// Current value of a track that is only applied when authored.
    fn applied<S>(
        &self,
        track: Option<&Track<S>>,
        property: SyncProperty,
        seed: S::Output,
    ) -> SceneResult<Option<S::Output>>
    where
        S: ResolveScalars,
        S::Output: Interpolate,
    {
        track
            .map(|t| self.eval.property(Some(t.as_slice()), property, seed))
            .transpose()
    }

    /// Older scripts measure screen-space y from the top.
    fn screen_y(&self, mut position: Xyz<f64>) -> Xyz<f64> {
        if self.settings.legacy_coordinates {
            position.y = f64::from(self.settings.height) - position.y;
        }
        position
    }

    fn image(&mut self, image: &ImageAnimation) -> SceneResult<()> {
        let Some(first) = image.textures.first() else {
            return Ok(());
        };
        let eval = self.eval;
        let t = &image.transform;

        let canvas = match &image.canvas {
            Some((w, h)) => Some((eval.scalar(w)?, eval.scalar(h)?)),
            None => None,
        };
        let uv = match &image.uv {
            Some(uv) => Some([
                eval.scalar(&uv.u_min)?,
                eval.scalar(&uv.v_min)?,
                eval.scalar(&uv.u_max)?,
                eval.scalar(&uv.v_max)?,
            ]),
            None => None,
        };
        let units = image
            .textures
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, tex)| (i as u32, tex.handle))
            .collect();

        let pivot = self.applied(t.pivot.as_ref(), SyncProperty::Pivot, seeds::ORIGIN)?;
        let angle = self.applied(t.angle.as_ref(), SyncProperty::Angle, seeds::ANGLE)?;
        let scale = eval.property(t.scale.as_deref(), SyncProperty::Scale, seeds::SCALE)?;
        let position = self
            .applied(t.position.as_ref(), SyncProperty::Position, seeds::ORIGIN)?
            .map(|p| self.screen_y(p));

        let color = eval.property(t.color.as_deref(), SyncProperty::Color, seeds::COLOR)?;
        self.host.renderer.set_color(color);

        for (i, tex) in image.textures.iter().enumerate() {
            let Some(video) = &tex.video else {
                continue;
            };
            let optional = |v: &Option<Scalar>| v.as_ref().map(|s| eval.scalar(s)).transpose();
            let settings = VideoSettings {
                start_time: self.animation.window.start,
                speed: optional(&video.settings.speed)?,
                fps: optional(&video.settings.fps)?,
                looping: optional(&video.settings.looping)?,
                length: optional(&video.settings.length)?,
            };
            self.host.renderer.configure_video(video.handle, &settings);
            if !video.playing {
                self.host.renderer.play_video(video.handle);
                self.effects.started_videos.push(i);
            }
        }

        self.host.renderer.draw_image(&ImageDraw {
            texture: first.handle,
            units,
            blend: image.blend,
            projection: image.projection,
            canvas,
            uv,
            pivot,
            angle,
            scale,
            position,
            align: image.align,
        });
        Ok(())
    }

    fn text(&mut self, text: &TextAnimation) -> SceneResult<()> {
        let t = &text.transform;
        let pivot = self.applied(t.pivot.as_ref(), SyncProperty::Pivot, seeds::ORIGIN)?;
        let rotation = self
            .applied(t.angle.as_ref(), SyncProperty::Angle, seeds::ANGLE)?
            .map(|a| Xyz::new(a.degrees_x, a.degrees_y, a.degrees_z));
        let scale = self
            .eval
            .property(t.scale.as_deref(), SyncProperty::Scale, seeds::SCALE)?;
        let position = self.applied(t.position.as_ref(), SyncProperty::Position, seeds::ORIGIN)?;
        let (position, align) = match text.projection {
            Projection::TwoD => (position.map(|p| self.screen_y(p)), text.align),
            Projection::ThreeD => (position, None),
        };

        if let Some(font) = &text.font {
            self.host.renderer.set_text_font(font);
        }
        let color = self
            .eval
            .property(t.color.as_deref(), SyncProperty::Color, seeds::COLOR)?;
        self.host.renderer.set_color(color);

        if text.projection == Projection::ThreeD && text.clear_depth_buffer {
            self.host.renderer.clear_depth();
        }
        self.host.renderer.draw_text(&TextDraw {
            string: text.string.clone(),
            projection: text.projection,
            pivot,
            rotation,
            size: (scale.x, scale.y),
            position,
            align,
        });
        Ok(())
    }

    fn object(&mut self, object: &ObjectAnimation) -> SceneResult<()> {
        let scoped = object.needs_matrix_scope();
        if let Some(handle) = object.handle {
            let t = &object.transform;
            let position =
                self.applied(t.position.as_ref(), SyncProperty::Position, seeds::ORIGIN)?;
            let pivot = self.applied(t.pivot.as_ref(), SyncProperty::Pivot, seeds::ORIGIN)?;
            let angle = self.applied(t.angle.as_ref(), SyncProperty::Angle, seeds::ANGLE)?;
            let scale = self
                .eval
                .property(t.scale.as_deref(), SyncProperty::Scale, seeds::SCALE)?;
            let color = self
                .applied(t.color.as_ref(), SyncProperty::Color, seeds::COLOR)?
                .map(|c| c.normalized());
            let frame = match &object.frame {
                Some(frame) => self.eval.scalar(frame)?,
                None => (self.time - self.animation.window.start) * self.eval.scalar(&object.fps)?,
            };

            if scoped {
                self.host.renderer.push_matrix();
            }
            if object.clear_depth_buffer {
                self.host.renderer.clear_depth();
            }
            self.host.renderer.draw_object(&ObjectDraw {
                object: handle,
                position,
                pivot,
                angle,
                scale,
                color,
                camera: object.camera.clone(),
                frame,
                clear_depth_buffer: object.clear_depth_buffer,
            });
        }

        let hook = match &object.function {
            Some(src) => self.eval.hook(src),
            None => Ok(()),
        };
        if scoped && object.handle.is_some() {
            self.host.renderer.pop_matrix();
        }
        hook
    }

    fn fbo(&mut self, fbo: &FboAnimation) -> SceneResult<()> {
        let dimension = self.applied(
            fbo.dimension.as_ref(),
            SyncProperty::Dimension,
            seeds::DIMENSION,
        )?;
        let renderer = &mut *self.host.renderer;
        if let Some(dimension) = dimension {
            renderer.set_fbo_render_dimensions(fbo.handle, dimension.x, dimension.y);
        }

        match fbo.action {
            Some(FboAction::Begin) => {
                renderer.bind_fbo(Some(fbo.handle));
                renderer.update_viewport(Some(fbo.handle));
            }
            Some(FboAction::End) => {
                renderer.bind_fbo(None);
                renderer.update_viewport(None);
                draw_fbo_texture(renderer, fbo.handle);
            }
            Some(FboAction::Unbind) => {
                renderer.bind_fbo(None);
                renderer.update_viewport(None);
            }
            Some(FboAction::Draw) => draw_fbo_texture(renderer, fbo.handle),
            None => {}
        }
        Ok(())
    }

    fn light(&mut self, light: &LightAnimation) -> SceneResult<()> {
        let index = light.index;
        let channels = [
            (&light.ambient, LightChannel::Ambient),
            (&light.diffuse, LightChannel::Diffuse),
            (&light.specular, LightChannel::Specular),
        ];
        for (track, channel) in channels {
            if let Some(color) = self.applied(track.as_ref(), SyncProperty::Color, seeds::COLOR)? {
                self.host
                    .renderer
                    .set_light_color(index, channel, color.normalized());
            }
        }

        if let Some(position) = self.applied(
            light.position.as_ref(),
            SyncProperty::Position,
            seeds::LIGHT_POSITION,
        )? {
            self.host.renderer.set_light_position(index, position);
        }

        self.host.renderer.set_light_position_object(index, None);
        let object = self.relative_object(light.position_object, light.relative_position.as_deref());
        if light.position_object.is_none() {
            self.effects.light_object = object;
        }
        if object.is_some() {
            self.host.renderer.set_light_position_object(index, object);
        }

        match light.action {
            Some(LightAction::Begin) => self.host.renderer.set_light_enabled(index, true),
            Some(LightAction::End) => self.host.renderer.set_light_enabled(index, false),
            None => {}
        }
        Ok(())
    }

    fn camera(&mut self, camera: &CameraAnimation) -> SceneResult<()> {
        let perspective = self.eval.property(
            Some(camera.perspective.as_slice()),
            SyncProperty::Perspective,
            seeds::perspective(self.settings.aspect_ratio()),
        )?;
        self.host.renderer.set_camera_perspective(perspective);

        if let Some(position) = self.applied(
            camera.position.as_ref(),
            SyncProperty::Position,
            seeds::CAMERA_POSITION,
        )? {
            self.host.renderer.set_camera_position(position);
        }
        if let Some(target) =
            self.applied(camera.target.as_ref(), SyncProperty::Target, seeds::ORIGIN)?
        {
            self.host.renderer.set_camera_look_at(target);
        }
        if let Some(up) = self.applied(camera.up.as_ref(), SyncProperty::Up, seeds::CAMERA_UP)? {
            self.host.renderer.set_camera_up(up);
        }

        self.host.renderer.set_camera_position_object(None);
        let object =
            self.relative_object(camera.position_object, camera.relative_position.as_deref());
        if camera.position_object.is_none() {
            self.effects.camera_position_object = object;
        }
        if object.is_some() {
            self.host.renderer.set_camera_position_object(object);
        }

        self.host.renderer.set_camera_target_object(None);
        let object = self.relative_object(camera.target_object, camera.relative_target.as_deref());
        if camera.target_object.is_none() {
            self.effects.camera_target_object = object;
        }
        if object.is_some() {
            self.host.renderer.set_camera_target_object(object);
        }

        self.host.renderer.reset_view();
        Ok(())
    }

    /// Already fetched object, else a lookup of `name` among loaded objects.
    fn relative_object(&mut self, fetched: Option<Handle>, name: Option<&str>) -> Option<Handle> {
        fetched.or_else(|| name.and_then(|n| self.host.loader.find_object(n)))
    }
}

fn draw_fbo_texture(renderer: &mut dyn Renderer, fbo: Handle) {
    renderer.bind_fbo_textures(Some(fbo));
    renderer.set_color(seeds::COLOR);
    renderer.draw_fbo(fbo);
    renderer.bind_fbo_textures(None);
}

#[cfg(test)]
#[path = "../../tests/unit/render/dispatch.rs"]
mod tests;
