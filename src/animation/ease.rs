use crate::foundation::core::{Angle, Perspective, Rgba, Xyz};

/// Interpolation curve applied to a keyframe's progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    /// Straight blend.
    #[default]
    Linear,
    /// Cubic Hermite `3p² - 2p³`.
    SmoothStep,
    /// Quintic `6p⁵ - 15p⁴ + 10p³`.
    SmootherStep,
}

impl Ease {
    /// Map the host's numeric interpolation selector (0, 1, 2) to a curve.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::SmoothStep,
            2 => Self::SmootherStep,
            _ => Self::Linear,
        }
    }

    /// Shape clamped progress through this curve.
    pub fn apply(self, p: f64) -> f64 {
        let p = clamp_progress(p);
        match self {
            Self::Linear => p,
            Self::SmoothStep => p * p * (3.0 - 2.0 * p),
            Self::SmootherStep => p * p * p * (p * (p * 6.0 - 15.0) + 10.0),
        }
    }
}

/// Clamp progress into `[0, 1]`. Infinite progress from zero-length keyframes
/// saturates; NaN (a zero-length keyframe sampled exactly at its start) counts as complete.
pub fn clamp_progress(p: f64) -> f64 {
    if p.is_nan() { 1.0 } else { p.clamp(0.0, 1.0) }
}

/// `interpolate(p, a, b)` as exposed to scenes: `p` is clamped, curve is linear.
pub fn interpolate(p: f64, a: f64, b: f64) -> f64 {
    interpolate_with(Ease::Linear, p, a, b)
}

/// `interpolate(p, a, b, kind)` as exposed to scenes. The linear kind blends `a` toward `b`;
/// the smooth kinds return the bare curve value in `[0, 1]` and ignore the range.
pub fn interpolate_kind(ease: Ease, p: f64, a: f64, b: f64) -> f64 {
    match ease {
        Ease::Linear => interpolate(p, a, b),
        Ease::SmoothStep | Ease::SmootherStep => ease.apply(p),
    }
}

/// Blend `a` toward `b` by `p` shaped through `ease`.
pub fn interpolate_with(ease: Ease, p: f64, a: f64, b: f64) -> f64 {
    a + (b - a) * ease.apply(p)
}

/// Component-wise interpolation for evaluated property values.
pub trait Interpolate: Sized {
    /// Blend `from` toward `to` by progress `p`.
    fn interpolate(ease: Ease, p: f64, from: &Self, to: &Self) -> Self;
}

impl Interpolate for f64 {
    fn interpolate(ease: Ease, p: f64, from: &Self, to: &Self) -> Self {
        interpolate_with(ease, p, *from, *to)
    }
}

impl Interpolate for Xyz<f64> {
    fn interpolate(ease: Ease, p: f64, from: &Self, to: &Self) -> Self {
        Self {
            x: interpolate_with(ease, p, from.x, to.x),
            y: interpolate_with(ease, p, from.y, to.y),
            z: interpolate_with(ease, p, from.z, to.z),
        }
    }
}

impl Interpolate for Rgba<f64> {
    fn interpolate(ease: Ease, p: f64, from: &Self, to: &Self) -> Self {
        Self {
            r: interpolate_with(ease, p, from.r, to.r),
            g: interpolate_with(ease, p, from.g, to.g),
            b: interpolate_with(ease, p, from.b, to.b),
            a: interpolate_with(ease, p, from.a, to.a),
        }
    }
}

impl Interpolate for Angle<f64> {
    fn interpolate(ease: Ease, p: f64, from: &Self, to: &Self) -> Self {
        Self {
            degrees_x: interpolate_with(ease, p, from.degrees_x, to.degrees_x),
            degrees_y: interpolate_with(ease, p, from.degrees_y, to.degrees_y),
            degrees_z: interpolate_with(ease, p, from.degrees_z, to.degrees_z),
            x: interpolate_with(ease, p, from.x, to.x),
            y: interpolate_with(ease, p, from.y, to.y),
            z: interpolate_with(ease, p, from.z, to.z),
        }
    }
}

impl Interpolate for Perspective<f64> {
    fn interpolate(ease: Ease, p: f64, from: &Self, to: &Self) -> Self {
        Self {
            fov: interpolate_with(ease, p, from.fov, to.fov),
            aspect: interpolate_with(ease, p, from.aspect, to.aspect),
            near: interpolate_with(ease, p, from.near, to.near),
            far: interpolate_with(ease, p, from.far, to.far),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
