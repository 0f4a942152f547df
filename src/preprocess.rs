pub(crate) mod expand;
pub(crate) mod resolve;

use crate::foundation::error::SceneResult;
use crate::host::Host;
use crate::scene::context::SceneContext;
use crate::scene::model::{AnimationDef, SceneDef};

/// Scene-load half of the engine: stages definitions, then resolves them into the layer map.
///
/// `add_animations` may run several times before `process`; each `process` call resolves
/// only what was staged since the previous one.
pub struct Preprocessor<'c> {
    ctx: &'c mut SceneContext,
}

impl<'c> Preprocessor<'c> {
    /// Preprocess into `ctx`.
    pub fn new(ctx: &'c mut SceneContext) -> Self {
        Self { ctx }
    }

    /// Assign layers, expand shader arrays and `passToFbo` brackets, and register resources.
    /// Returns how many entries were staged.
    #[tracing::instrument(skip_all, fields(definitions = defs.len()))]
    pub fn add_animations(&mut self, defs: Vec<AnimationDef>, host: &mut Host<'_>) -> usize {
        expand::add_animations(self.ctx, defs, host)
    }

    /// Stage a parsed scene. Entries that failed to parse are rejected as PARSE errors in
    /// document order; the rest stage as with `add_animations`.
    #[tracing::instrument(
        skip_all,
        fields(definitions = scene.animations.len(), invalid = scene.invalid.len())
    )]
    pub fn add_scene(&mut self, scene: SceneDef, host: &mut Host<'_>) -> usize {
        expand::add_entries(self.ctx, scene.into_entries(), host)
    }

    /// Resolve windows, tracks and handles of everything staged.
    pub fn process(&mut self, host: &mut Host<'_>) -> SceneResult<usize> {
        resolve::process(self.ctx, host)
    }

    /// `add_scene` followed by `process`.
    pub fn load(&mut self, scene: SceneDef, host: &mut Host<'_>) -> SceneResult<usize> {
        self.add_scene(scene, host);
        self.process(host)
    }
}

#[cfg(test)]
#[path = "../tests/unit/preprocess.rs"]
mod tests;
