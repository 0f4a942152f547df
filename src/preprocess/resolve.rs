use crate::animation::cascade::{AngleDef, Cascade, cascade, seeds};
use crate::animation::sync::SyncDef;
use crate::animation::track::Track;
use crate::animation::value::{IntoScalars, ResolveScalars, Scalar};
use crate::config::PlayerSettings;
use crate::eval::evaluator::{PropertyEvaluator, is_expression};
use crate::expression::engine::ExpressionEngine;
use crate::foundation::core::TimeWindow;
use crate::foundation::error::SceneResult;
use crate::host::Host;
use crate::render::backend::Blend;
use crate::resources::loader::{FboConfig, Handle, ObjectOptions, ShaderSpec};
use crate::resources::registry::ResourceRegistry;
use crate::scene::context::{SceneContext, Staged, report_error};
use crate::scene::definition::{
    Animation, AnimationError, AnimationErrorKind, AnimationKind, CameraAnimation, FboAction,
    FboAnimation, ImageAnimation, LightAction, LightAnimation, ObjectAnimation, ShaderBinding,
    TextAnimation, TextureBinding, TransformTracks, VideoBinding,
};
use crate::scene::model::{
    Align, AnimationDef, BlendFactor, PerspectiveField, Projection, ShaderField,
};

/// Default camera name inside object files.
pub const DEFAULT_OBJECT_CAMERA: &str = "Camera01";

/// Resolve every staged definition into a drawable [`Animation`] and move it into the layer map.
///
/// Waits for background loads first, so every handle is acquired against finished loads.
/// Windows chain in render order, seeded by the scene window. Returns how many animations were
/// processed, errored ones included.
#[tracing::instrument(skip_all, fields(staged = ctx.pending()))]
pub(crate) fn process(ctx: &mut SceneContext, host: &mut Host<'_>) -> SceneResult<usize> {
    host.loader.wait_for_pending_loads();
    let mut running = ctx.settings.scene_window(host.clock)?;

    let staged: Vec<Staged> = ctx.staged.drain().map(|(_, s)| s).collect();
    let count = staged.len();
    for entry in staged {
        let (animation, next) = resolve_entry(ctx, host, entry, running);
        running = next;
        ctx.layers.push(animation.layer.clone(), animation);
    }
    tracing::info!(
        processed = count,
        failed = ctx.failed().count(),
        "scene processed"
    );
    Ok(count)
}

/// Resolve one definition. Returns the animation and the running window for the next entry.
fn resolve_entry(
    ctx: &mut SceneContext,
    host: &mut Host<'_>,
    entry: Staged,
    running: TimeWindow,
) -> (Animation, TimeWindow) {
    let Staged { id, layer, def } = entry;
    let mut resolver = Resolver {
        settings: &ctx.settings,
        registry: &mut ctx.registry,
        engine: ctx.engine.as_ref(),
        host,
        window: running,
        errors: Vec::new(),
        sources: Vec::new(),
    };

    let next = match def.time_fields().resolve(running, resolver.host.clock) {
        Ok(window) => {
            resolver.window = window;
            window.following_span()
        }
        Err(e) => {
            resolver.fail(AnimationErrorKind::Parse, e.to_string());
            running
        }
    };

    let shader = resolver.shader(&def);
    let kind = resolver.kind(&def);
    resolver.collect_hook(def.run_function.as_deref());
    resolver.collect_hook(def.init_function.as_deref());
    resolver.check_sources();

    let mut animation = Animation {
        id,
        layer,
        window: resolver.window,
        shader,
        sync: def.sync.clone().map(SyncDef::resolve),
        init_function: def.init_function.clone(),
        run_function: def.run_function.clone(),
        error: None,
        kind,
        extra: def.extra.clone(),
    };

    if let Some(init) = &def.init_function {
        if resolver.errors.is_empty() {
            let now = resolver.host.clock.now();
            let evaluator = PropertyEvaluator::new(resolver.engine, &animation, now);
            if let Err(e) = evaluator.hook(init) {
                resolver.fail(AnimationErrorKind::Expression, e.to_string());
            }
        }
        resolver.mark_loaded(init);
    }

    for error in &resolver.errors {
        report_error(resolver.host.status, error, &def);
    }
    animation.error = resolver.errors.into_iter().next();

    tracing::debug!(
        id,
        layer = %animation.layer,
        kind = animation.kind.name(),
        start = animation.window.start,
        end = animation.window.end,
        failed = animation.error.is_some(),
        "processed animation"
    );
    (animation, next)
}

struct Resolver<'r, 'h> {
    settings: &'r PlayerSettings,
    registry: &'r mut ResourceRegistry,
    engine: &'r dyn ExpressionEngine,
    host: &'r mut Host<'h>,
    window: TimeWindow,
    errors: Vec<AnimationError>,
    /// Expression sources found so far, validated once the definition is resolved.
    sources: Vec<String>,
}

impl Resolver<'_, '_> {
    fn fail(&mut self, kind: AnimationErrorKind, message: impl Into<String>) {
        self.errors.push(AnimationError::new(kind, message));
    }

    fn require(&mut self, handle: Handle, what: &str) -> bool {
        if !handle.valid {
            self.fail(AnimationErrorKind::Resource, format!("Could not load {what}"));
        }
        handle.valid
    }

    fn mark_loaded(&mut self, name: &str) {
        self.registry.mark_loaded(name, self.host.progress);
    }

    fn collect<S: ResolveScalars>(&mut self, value: &S) {
        let sources = &mut self.sources;
        let _ = value.resolve_scalars(&mut |s: &Scalar| {
            if let Scalar::Expr(src) = s {
                sources.push(src.clone());
            }
            Ok(0.0)
        });
    }

    fn collect_hook(&mut self, src: Option<&str>) {
        if let Some(src) = src
            && is_expression(src)
        {
            self.sources.push(src.to_owned());
        }
    }

    fn check_sources(&mut self) {
        let sources = std::mem::take(&mut self.sources);
        for src in sources {
            if let Err(e) = self.engine.check(&src) {
                self.fail(AnimationErrorKind::Parse, format!("invalid expression {src}: {e}"));
            }
        }
    }

    /// Cascade a raw track against the animation window. Absent tracks stay absent.
    fn track<D>(&mut self, raw: Option<&[D]>, seed: D::Value) -> Option<Track<D::Value>>
    where
        D: Cascade,
        D::Value: ResolveScalars,
    {
        let raw = raw?;
        match cascade(raw, seed, self.window, self.host.clock) {
            Ok(track) => {
                for keyframe in &track {
                    self.collect(&keyframe.value);
                }
                Some(track)
            }
            Err(e) => {
                self.fail(AnimationErrorKind::Parse, e.to_string());
                None
            }
        }
    }

    fn shader(&mut self, def: &AnimationDef) -> Option<ShaderBinding> {
        let Some(ShaderField::One(shader)) = &def.shader else {
            return None;
        };
        let program_name = shader.resolved_program_name();
        let spec = ShaderSpec {
            program_name: program_name.clone(),
            sources: shader.name.to_vec(),
            variables: shader.variables.clone(),
        };
        let handle = self.host.loader.load_shader(&spec);
        self.require(handle, &format!("shader program {program_name}"));
        self.mark_loaded(&program_name);
        Some(ShaderBinding {
            program_name,
            handle,
        })
    }

    fn kind(&mut self, def: &AnimationDef) -> AnimationKind {
        if def.object.is_some() || def.object_function.is_some() {
            AnimationKind::Object(self.object(def))
        } else if def.image.is_some() {
            AnimationKind::Image(self.image(def))
        } else if let Some(text) = &def.text {
            let projection = text.perspective.unwrap_or_default();
            if let Some(font) = &text.name {
                self.host.loader.set_text_font(font);
            }
            AnimationKind::Text(TextAnimation {
                string: text.string.clone(),
                font: text.name.clone(),
                projection,
                clear_depth_buffer: def.clear_depth_buffer.unwrap_or(false),
                align: default_align(def),
                transform: self.transform(def),
            })
        } else if def.fbo.is_some() {
            AnimationKind::Fbo(self.fbo(def))
        } else if def.light.is_some() {
            AnimationKind::Light(self.light(def))
        } else if def.camera.is_some() {
            AnimationKind::Camera(self.camera(def))
        } else {
            AnimationKind::Hook
        }
    }

    fn transform(&mut self, def: &AnimationDef) -> TransformTracks {
        if def
            .angle
            .as_ref()
            .is_some_and(|keys| keys.iter().any(AngleDef::has_deprecated_pivot))
        {
            self.fail(
                AnimationErrorKind::Parse,
                "angle.pivot is deprecated. move pivot under animation.",
            );
        }
        TransformTracks {
            position: self.track(def.position.as_deref(), seeds::ORIGIN.into_scalars()),
            pivot: self.track(def.pivot.as_deref(), seeds::ORIGIN.into_scalars()),
            angle: self.track(def.angle.as_deref(), seeds::ANGLE.into_scalars()),
            scale: self.track(def.scale.as_deref(), seeds::SCALE.into_scalars()),
            color: self.track(def.color.as_deref(), seeds::COLOR.into_scalars()),
        }
    }

    fn object(&mut self, def: &AnimationDef) -> ObjectAnimation {
        let mut options = ObjectOptions {
            lighting: def.object_lighting,
            simple_colors: def.simple_colors,
            object_camera: def.object_camera,
        };
        if self.settings.legacy_coordinates {
            options.lighting.get_or_insert(false);
            options.simple_colors.get_or_insert(true);
        }

        let handle = def.object.as_deref().map(|name| {
            let handle = match &def.shape {
                Some(shape) => self.host.loader.load_shape(name, shape),
                None => self.host.loader.load_object(name),
            };
            if self.require(handle, name) && !options.is_default() {
                self.host.loader.configure_object(handle, &options);
            }
            handle
        });

        let fps = def.fps.clone().unwrap_or_default();
        self.collect(&fps);
        if let Some(frame) = &def.frame {
            self.collect(frame);
        }
        self.collect_hook(def.object_function.as_deref());

        let camera = def
            .camera
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .unwrap_or(DEFAULT_OBJECT_CAMERA)
            .to_owned();

        let object = ObjectAnimation {
            name: def.object.clone(),
            handle,
            shape: def.shape.clone(),
            function: def.object_function.clone(),
            fps,
            frame: def.frame.clone(),
            camera,
            clear_depth_buffer: def.clear_depth_buffer.unwrap_or(false),
            options,
            transform: self.transform(def),
        };
        if let Some(name) = &def.object {
            self.mark_loaded(name);
        }
        object
    }

    fn image(&mut self, def: &AnimationDef) -> ImageAnimation {
        let refs = def.image.as_ref().map(|i| i.refs()).unwrap_or_default();
        let first = refs.first().map(|r| r.name().to_owned()).unwrap_or_default();
        if refs.is_empty() {
            self.fail(AnimationErrorKind::Parse, "image declares no textures");
        }

        let mut textures = Vec::with_capacity(refs.len());
        for r in &refs {
            let handle = self.host.loader.load_image(r.name());
            self.require(handle, &first);
            let video = r.video().map(|settings| {
                for value in [&settings.speed, &settings.fps, &settings.looping, &settings.length]
                    .into_iter()
                    .flatten()
                {
                    self.collect(value);
                }
                VideoBinding {
                    handle: self.host.loader.load_video(r.name()),
                    settings: settings.clone(),
                    playing: false,
                }
            });
            textures.push(TextureBinding {
                name: r.name().to_owned(),
                handle,
                video,
            });
        }

        let blend = match (&def.blend, def.additive) {
            (Some(b), _) => Some(Blend {
                src: b.src.unwrap_or(BlendFactor::SrcAlpha),
                dst: b.dst.unwrap_or(BlendFactor::OneMinusSrcAlpha),
            }),
            (None, Some(true)) => Some(Blend::ADDITIVE),
            (None, _) => None,
        };
        let projection = match &def.perspective {
            Some(PerspectiveField::Mode(mode)) => *mode,
            _ => Projection::TwoD,
        };
        let canvas = match (&def.canvas_width, &def.canvas_height) {
            (Some(w), Some(h)) => {
                self.collect(w);
                self.collect(h);
                Some((w.clone(), h.clone()))
            }
            _ => None,
        };
        if let Some(uv) = &def.uv {
            for value in [&uv.u_min, &uv.v_min, &uv.u_max, &uv.v_max] {
                self.collect(value);
            }
        }

        let image = ImageAnimation {
            textures,
            blend,
            projection,
            canvas,
            uv: def.uv.clone(),
            align: default_align(def),
            transform: self.transform(def),
        };
        for r in &refs {
            self.mark_loaded(r.name());
        }
        image
    }

    fn fbo(&mut self, def: &AnimationDef) -> FboAnimation {
        let fbo = def.fbo.clone().unwrap_or_default();
        let name = fbo.resolved_name().to_owned();
        let (width, height) = match (fbo.width, fbo.height) {
            (Some(w), Some(h)) => (Some(w), Some(h)),
            _ => (None, None),
        };
        let config = FboConfig {
            store_depth: fbo.store_depth.unwrap_or(false),
            width,
            height,
        };
        let handle = self.host.loader.init_fbo(&name, &config);
        self.require(handle, &name);

        let action = fbo.action.as_deref().and_then(|a| {
            let action = FboAction::from_name(a);
            if action.is_none() {
                tracing::warn!(fbo = %name, action = a, "unknown fbo action, nothing will be drawn");
            }
            action
        });
        let raw = fbo.dimension.as_deref().or(def.dimension.as_deref());
        let dimension = self.track(raw, seeds::DIMENSION.into_scalars());

        self.mark_loaded(&name);
        FboAnimation {
            name,
            handle,
            action,
            dimension,
        }
    }

    fn light(&mut self, def: &AnimationDef) -> LightAnimation {
        let light = def.light.clone().unwrap_or_default();
        let action = light.action.as_deref().and_then(|a| match a {
            "begin" => Some(LightAction::Begin),
            "end" => Some(LightAction::End),
            other => {
                tracing::warn!(index = light.index, action = other, "unknown light action");
                None
            }
        });
        LightAnimation {
            index: light.index,
            action,
            position: self.track(def.position.as_deref(), seeds::LIGHT_POSITION.into_scalars()),
            ambient: self.track(def.ambient_color.as_deref(), seeds::COLOR.into_scalars()),
            diffuse: self.track(def.diffuse_color.as_deref(), seeds::COLOR.into_scalars()),
            specular: self.track(def.specular_color.as_deref(), seeds::COLOR.into_scalars()),
            relative_position: def.light_relative_position.clone(),
            position_object: None,
        }
    }

    fn camera(&mut self, def: &AnimationDef) -> CameraAnimation {
        let raw = match &def.perspective {
            Some(PerspectiveField::Track(keys)) => keys.as_slice(),
            _ => &[],
        };
        let seed = seeds::perspective(self.settings.aspect_ratio()).into_scalars();
        CameraAnimation {
            perspective: self.track(Some(raw), seed).unwrap_or_default(),
            position: self.track(def.position.as_deref(), seeds::CAMERA_POSITION.into_scalars()),
            target: self.track(def.target.as_deref(), seeds::ORIGIN.into_scalars()),
            up: self.track(def.up.as_deref(), seeds::CAMERA_UP.into_scalars()),
            relative_position: def.camera_relative_position.clone(),
            relative_target: def.camera_relative_target.clone(),
            position_object: None,
            target_object: None,
        }
    }
}

/// Center on screen unless the definition places itself.
fn default_align(def: &AnimationDef) -> Option<Align> {
    match (def.align, &def.position) {
        (Some(align), _) => Some(align),
        (None, None) => Some(Align::Center),
        (None, Some(_)) => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/preprocess/resolve.rs"]
mod tests;
