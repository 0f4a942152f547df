//! scenetrack is the timeline core of a real-time demo player.
//!
//! A scene is a JSON list of animation definitions. The engine works in two halves:
//!
//! - A [`Preprocessor`] stages definitions into layers, expands multi-pass shader pipelines,
//!   loads resources through a [`ResourceLoader`] and resolves every keyframe track
//! - A [`Dispatcher`] draws the active animations of each frame through a [`Renderer`]
//!
//! Everything outside the engine (clock, loader, renderer, sync source, status line) is a
//! trait object borrowed per call through [`Host`]. [`host::recording`] has in-memory doubles.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod foundation;

pub(crate) mod animation;
pub(crate) mod eval;
pub(crate) mod expression;
/// Host collaborator traits.
pub mod host;
pub(crate) mod preprocess;
pub(crate) mod render;
pub(crate) mod resources;
pub(crate) mod scene;

pub use crate::foundation::core::{Angle, Perspective, Rgba, TimeWindow, Xyz};
pub use crate::foundation::error::{SceneError, SceneResult};

pub use crate::animation::cascade::{AngleDef, PerspectiveDef, RgbaDef, ScaleDef, XyzDef};
pub use crate::animation::ease::Ease;
pub use crate::animation::sync::{SyncDef, SyncProperty, SyncState};
pub use crate::animation::track::{Keyframe, TimeFields, TimeValue, Track};
pub use crate::animation::value::Scalar;
pub use crate::config::PlayerSettings;
pub use crate::expression::engine::{ExpressionEngine, SandboxedEngine};
pub use crate::expression::error::ExprError;
pub use crate::expression::interp::{ExprContext, ExprValue};
pub use crate::host::{
    Clock, Host, ProgressReporter, StatusReporter, SyncProvider, parse_clock_time,
};
pub use crate::preprocess::Preprocessor;
pub use crate::preprocess::resolve::DEFAULT_OBJECT_CAMERA;
pub use crate::render::backend::{
    Blend, ImageDraw, LightChannel, ObjectDraw, Renderer, TextDraw, VideoSettings,
};
pub use crate::render::dispatch::{Dispatcher, FrameStats};
pub use crate::render::loading_bar::{BarQuad, LoadingProgress};
pub use crate::resources::loader::{FboConfig, Handle, ObjectOptions, ResourceLoader, ShaderSpec};
pub use crate::resources::registry::{ResourceRegistry, ResourceState};
pub use crate::scene::context::{Rejected, SceneContext};
pub use crate::scene::definition::{
    Animation, AnimationError, AnimationErrorKind, AnimationKind, CameraAnimation, FboAction,
    FboAnimation, ImageAnimation, LightAction, LightAnimation, ObjectAnimation, ShaderBinding,
    TextAnimation, TextureBinding, TransformTracks, VideoBinding,
};
pub use crate::scene::layers::{LayerKey, LayerMap};
pub use crate::scene::model::{
    Align, AnimationDef, BlendDef, BlendFactor, FboDef, ImageField, ImageRef, InvalidEntry,
    LayerValue, LightDef, PassToFbo, PerspectiveField, Projection, SceneDef, SceneEntry,
    ShaderDef, ShaderField, ShaderSources, ShapeSpec, TextDef, UvDef, VideoDef,
};
