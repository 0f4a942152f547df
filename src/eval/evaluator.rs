use crate::animation::ease::{Ease, Interpolate};
use crate::animation::sync::{SyncProperty, SyncState};
use crate::animation::track::Keyframe;
use crate::animation::value::{ResolveScalars, Scalar};
use crate::expression::engine::ExpressionEngine;
use crate::foundation::core::TimeWindow;
use crate::foundation::error::SceneResult;
use crate::scene::definition::{Animation, AnimationScope};

/// The time a property is sampled at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sampling {
    /// Scene time.
    pub time: f64,
    /// Window of the owning animation.
    pub window: TimeWindow,
    /// Follow sync progress instead of scene time.
    pub synced: bool,
    /// Latest sync progress.
    pub progress: f64,
}

impl Sampling {
    /// Sample at scene time.
    pub fn wall(time: f64, window: TimeWindow) -> Self {
        Self {
            time,
            window,
            synced: false,
            progress: 0.0,
        }
    }

    /// Sample `property` of an animation with optional sync flags.
    pub fn for_property(
        time: f64,
        window: TimeWindow,
        sync: Option<&SyncState>,
        property: SyncProperty,
    ) -> Self {
        match sync {
            Some(s) if s.flag(property) => Self {
                time,
                window,
                synced: true,
                progress: s.progress,
            },
            _ => Self::wall(time, window),
        }
    }
}

/// Walk a track from `seed`. Every keyframe whose start has passed blends the running value
/// toward its own target, so elapsed keyframes compound in declaration order.
///
/// A synced sample reads time as `start + duration * progress`; zero progress yields `seed`
/// without looking at any keyframe.
pub fn evaluate<S, V>(
    track: &[Keyframe<S>],
    sampling: Sampling,
    seed: V,
    resolve: &mut dyn FnMut(&S) -> SceneResult<V>,
) -> SceneResult<V>
where
    V: Interpolate,
{
    let time = if sampling.synced {
        if sampling.progress == 0.0 {
            return Ok(seed);
        }
        sampling.window.start + sampling.window.duration * sampling.progress
    } else {
        sampling.time
    };

    let mut value = seed;
    for keyframe in track {
        if time >= keyframe.window.start {
            let p = (time - keyframe.window.start) / keyframe.window.duration;
            let target = resolve(&keyframe.value)?;
            value = V::interpolate(Ease::Linear, p, &value, &target);
        }
    }
    Ok(value)
}

/// Whether a hook or field source is an inline expression.
pub fn is_expression(src: &str) -> bool {
    src.starts_with('{')
}

/// Evaluates one animation's properties at one instant.
pub(crate) struct PropertyEvaluator<'a> {
    engine: &'a dyn ExpressionEngine,
    scope: AnimationScope<'a>,
}

impl<'a> PropertyEvaluator<'a> {
    pub(crate) fn new(
        engine: &'a dyn ExpressionEngine,
        animation: &'a Animation,
        time: f64,
    ) -> Self {
        Self {
            engine,
            scope: AnimationScope { time, animation },
        }
    }

    /// Concrete value of one field.
    pub(crate) fn scalar(&self, scalar: &Scalar) -> SceneResult<f64> {
        match scalar {
            Scalar::Number(n) => Ok(*n),
            Scalar::Expr(src) => Ok(self.engine.evaluate(src, &self.scope)?.as_number()),
        }
    }

    /// Current value of a property track; an absent track yields `seed`.
    pub(crate) fn property<S>(
        &self,
        track: Option<&[Keyframe<S>]>,
        property: SyncProperty,
        seed: S::Output,
    ) -> SceneResult<S::Output>
    where
        S: ResolveScalars,
        S::Output: Interpolate,
    {
        let animation = self.scope.animation;
        let sampling = Sampling::for_property(
            self.scope.time,
            animation.window,
            animation.sync.as_ref(),
            property,
        );
        let mut resolve = |value: &S| value.resolve_scalars(&mut |s: &Scalar| self.scalar(s));
        evaluate(track.unwrap_or(&[]), sampling, seed, &mut resolve)
    }

    /// Run a hook. Plain text is a no-op.
    pub(crate) fn hook(&self, src: &str) -> SceneResult<()> {
        if is_expression(src) {
            self.engine.evaluate(src, &self.scope)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/evaluator.rs"]
mod tests;
