use crate::config::PlayerSettings;
use crate::expression::engine::{ExpressionEngine, SandboxedEngine};
use crate::host::StatusReporter;
use crate::resources::registry::ResourceRegistry;
use crate::scene::definition::{Animation, AnimationError};
use crate::scene::layers::{LayerKey, LayerMap};
use crate::scene::model::AnimationDef;
use serde::Serialize;

/// A definition accepted by `add_animations`, waiting for `process`.
#[derive(Debug, Clone)]
pub(crate) struct Staged {
    pub(crate) id: u32,
    pub(crate) layer: LayerKey,
    pub(crate) def: AnimationDef,
}

/// A definition refused while adding; it never reaches the layer map.
#[derive(Debug, Clone, Serialize)]
pub struct Rejected {
    /// Layer it would have been drawn on.
    pub layer: LayerKey,
    /// Why it was refused.
    pub error: AnimationError,
    /// The entry as authored.
    pub def: serde_json::Value,
}

/// Everything a loaded scene owns: settings, resource bookkeeping, the expression engine and
/// the layer maps. Dropping the context drops the scene.
pub struct SceneContext {
    pub(crate) settings: PlayerSettings,
    pub(crate) registry: ResourceRegistry,
    pub(crate) engine: Box<dyn ExpressionEngine>,
    pub(crate) staged: LayerMap<Staged>,
    pub(crate) layers: LayerMap<Animation>,
    pub(crate) rejected: Vec<Rejected>,
    pub(crate) next_id: u32,
}

impl SceneContext {
    /// Empty scene using the sandboxed expression engine.
    pub fn new(settings: PlayerSettings) -> Self {
        Self::with_engine(settings, Box::new(SandboxedEngine::new()))
    }

    /// Empty scene with a custom expression engine.
    pub fn with_engine(settings: PlayerSettings, engine: Box<dyn ExpressionEngine>) -> Self {
        Self {
            settings,
            registry: ResourceRegistry::default(),
            engine,
            staged: LayerMap::default(),
            layers: LayerMap::default(),
            rejected: Vec::new(),
            next_id: 0,
        }
    }

    /// Host settings.
    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    /// Resource bookkeeping.
    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Processed animations by layer, in render order.
    pub fn layers(&self) -> &LayerMap<Animation> {
        &self.layers
    }

    /// Processed animations in render order.
    pub fn animations(&self) -> impl Iterator<Item = &Animation> {
        self.layers.entries()
    }

    /// Processed animations carrying an error marker.
    pub fn failed(&self) -> impl Iterator<Item = &Animation> {
        self.animations().filter(|a| a.error.is_some())
    }

    /// Definitions refused while adding.
    pub fn rejected(&self) -> &[Rejected] {
        &self.rejected
    }

    /// Number of definitions added but not yet processed.
    pub fn pending(&self) -> usize {
        self.staged.len()
    }

    pub(crate) fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl std::fmt::Debug for SceneContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneContext")
            .field("settings", &self.settings)
            .field("registered", &self.registry.registered())
            .field("staged", &self.staged.len())
            .field("animations", &self.layers.len())
            .field("rejected", &self.rejected.len())
            .finish()
    }
}

/// Log an animation error with a dump of its subject and surface it in the status line.
pub(crate) fn report_error(
    status: &mut dyn StatusReporter,
    error: &AnimationError,
    subject: &impl Serialize,
) {
    let dump = serde_json::to_string_pretty(subject)
        .unwrap_or_else(|e| format!("<unserializable: {e}>"));
    tracing::error!(kind = %error.kind, "{} - JSON: {}", error.message, dump);
    status.set_title(&format!("{} ERROR", error.kind));
}

#[cfg(test)]
#[path = "../../tests/unit/scene/context.rs"]
mod tests;
