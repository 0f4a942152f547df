use crate::host::Host;
use crate::scene::context::{Rejected, SceneContext, Staged, report_error};
use crate::scene::definition::{AnimationError, AnimationErrorKind};
use crate::scene::layers::LayerKey;
use crate::scene::model::{AnimationDef, FboDef, PassToFbo, SceneEntry, ShaderDef, ShaderField};
use std::collections::VecDeque;

const COLOR_FBO_SUFFIX: &str = ".color.fbo";
const DEPTH_FBO_SUFFIX: &str = ".depth.fbo";

struct Work {
    entry: SceneEntry,
    /// Set for derived entries; authored entries take the running layer.
    layer: Option<LayerKey>,
    /// `passToFbo` brackets are already queued around this entry.
    bracketed: bool,
}

impl Work {
    fn authored(entry: SceneEntry) -> Self {
        Self {
            entry,
            layer: None,
            bracketed: false,
        }
    }

    fn derived(def: AnimationDef, layer: LayerKey) -> Self {
        Self {
            entry: SceneEntry::Def(def),
            layer: Some(layer),
            bracketed: false,
        }
    }
}

/// Stage definitions in declaration order. Returns how many entries were staged, synthetic
/// ones included.
pub(crate) fn add_animations(
    ctx: &mut SceneContext,
    defs: Vec<AnimationDef>,
    host: &mut Host<'_>,
) -> usize {
    add_entries(ctx, defs.into_iter().map(SceneEntry::Def).collect(), host)
}

/// Like [`add_animations`], with unparsable entries rejected in place. They still move the
/// running layer when their `layer` was readable.
pub(crate) fn add_entries(
    ctx: &mut SceneContext,
    entries: Vec<SceneEntry>,
    host: &mut Host<'_>,
) -> usize {
    let mut queue: VecDeque<Work> = entries.into_iter().map(Work::authored).collect();
    let mut current = LayerKey::first();
    let mut staged = 0;

    while let Some(work) = queue.pop_front() {
        let layer = match work.layer {
            Some(layer) => layer,
            None => {
                if let Some(value) = work.entry.layer() {
                    current = LayerKey::from_value(value);
                }
                current.clone()
            }
        };
        let def = match work.entry {
            SceneEntry::Def(def) => def,
            SceneEntry::Invalid(invalid) => {
                reject(ctx, host, layer, invalid.raw, &invalid.message);
                continue;
            }
        };

        if let Some(ShaderField::Many(shaders)) = &def.shader {
            let Some(pass) = def.pass_to_fbo.clone() else {
                reject(
                    ctx,
                    host,
                    layer,
                    serde_json::to_value(&def).unwrap_or_default(),
                    "passToFbo must be declared when declaring animation shaders as an Array.",
                );
                continue;
            };
            let passes = expand_shader_passes(&def, shaders, &pass);
            tracing::debug!(
                layer = %layer,
                passes = passes.len(),
                target = %pass.name,
                "expanded shader array"
            );
            for pass_def in passes.into_iter().rev() {
                queue.push_front(Work::derived(pass_def, layer.clone()));
            }
            continue;
        }

        if !work.bracketed
            && let Some(pass) = def.pass_to_fbo.clone()
        {
            let begin = fbo_bracket(&def, &pass, Bracket::Begin);
            let end = fbo_bracket(&def, &pass, Bracket::End);
            let begin_layer = pass
                .begin_layer
                .as_ref()
                .map_or_else(|| layer.clone(), LayerKey::from_value);
            let end_layer = pass
                .end_layer
                .as_ref()
                .map_or_else(|| layer.clone(), LayerKey::from_value);
            queue.push_front(Work::derived(end, end_layer));
            queue.push_front(Work {
                entry: SceneEntry::Def(def),
                layer: Some(layer),
                bracketed: true,
            });
            queue.push_front(Work::derived(begin, begin_layer));
            continue;
        }

        register_dependencies(ctx, &def, host);
        let id = ctx.allocate_id();
        ctx.staged.push(layer.clone(), Staged { id, layer, def });
        staged += 1;
    }
    staged
}

fn reject(
    ctx: &mut SceneContext,
    host: &mut Host<'_>,
    layer: LayerKey,
    def: serde_json::Value,
    message: &str,
) {
    let error = AnimationError::new(AnimationErrorKind::Parse, message);
    report_error(host.status, &error, &def);
    ctx.rejected.push(Rejected { layer, error, def });
}

/// One definition per shader. All but the last render into `<target>.pass.<k>`; each pass reads
/// the previous pass's output.
pub(crate) fn expand_shader_passes(
    def: &AnimationDef,
    shaders: &[ShaderDef],
    pass: &PassToFbo,
) -> Vec<AnimationDef> {
    let mut out = Vec::with_capacity(shaders.len());
    let mut previous: Option<String> = None;
    for (k, shader) in shaders.iter().enumerate() {
        let mut dup = def.clone();
        dup.shader = Some(ShaderField::One(shader.clone()));

        if let Some(prev) = &previous {
            chain_input(&mut dup, prev);
        }

        let mut target = pass.clone();
        if k + 1 < shaders.len() {
            target.name = format!("{}.pass.{k}", pass.name);
        }
        previous = Some(target.name.clone());
        dup.pass_to_fbo = Some(target);
        out.push(dup);
    }
    out
}

fn chain_input(def: &mut AnimationDef, previous: &str) {
    if let Some(fbo) = &mut def.fbo {
        if fbo.name.is_some() {
            fbo.name = Some(previous.to_owned());
        }
    } else if let Some(image) = &mut def.image {
        image.rename(|name| {
            if name.ends_with(COLOR_FBO_SUFFIX) {
                Some(format!("{previous}{COLOR_FBO_SUFFIX}"))
            } else if name.ends_with(DEPTH_FBO_SUFFIX) {
                Some(format!("{previous}{DEPTH_FBO_SUFFIX}"))
            } else {
                None
            }
        });
    }
}

#[derive(Clone, Copy)]
enum Bracket {
    Begin,
    End,
}

/// Synthetic framebuffer entry around a `passToFbo` owner, sharing its explicit timing.
fn fbo_bracket(owner: &AnimationDef, pass: &PassToFbo, bracket: Bracket) -> AnimationDef {
    let action = match bracket {
        Bracket::Begin => pass.begin_action.clone().unwrap_or_else(|| "begin".to_owned()),
        Bracket::End => pass.end_action.clone().unwrap_or_else(|| "unbind".to_owned()),
    };
    AnimationDef {
        start: owner.start.clone(),
        duration: owner.duration.clone(),
        end: owner.end.clone(),
        fbo: Some(FboDef {
            name: Some(pass.name.clone()),
            action: Some(action),
            ..FboDef::default()
        }),
        ..AnimationDef::default()
    }
}

/// Register everything the definition will load so the loading bar knows the total up front.
fn register_dependencies(ctx: &mut SceneContext, def: &AnimationDef, host: &mut Host<'_>) {
    let registry = &mut ctx.registry;

    if let Some(ShaderField::One(shader)) = &def.shader {
        registry.register(&shader.resolved_program_name(), host.progress);
    }

    if let Some(object) = &def.object {
        registry.register(object, host.progress);
    } else if let Some(image) = &def.image {
        for r in image.refs() {
            if registry.register(r.name(), host.progress) {
                host.loader.request_image_async(r.name());
            }
        }
    } else if let Some(fbo) = &def.fbo {
        registry.register(fbo.resolved_name(), host.progress);
    }

    if let Some(init) = &def.init_function {
        registry.register(init, host.progress);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/preprocess/expand.rs"]
mod tests;
