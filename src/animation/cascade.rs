use crate::animation::track::{Keyframe, TimeFields, Track, resolve_time_defaults};
use crate::animation::value::Scalar;
use crate::foundation::core::{Angle, Perspective, Rgba, TimeWindow, Xyz};
use crate::foundation::error::SceneResult;
use crate::host::Clock;
use serde::{Deserialize, Serialize};

/// A raw keyframe whose unset fields hold the value reached by the previous keyframe.
pub trait Cascade {
    /// Fully resolved keyframe value.
    type Value: Clone;

    /// Timing fields of this keyframe.
    fn time(&self) -> &TimeFields;

    /// Fill unset fields from `running`.
    fn fill(&self, running: &Self::Value) -> Self::Value;
}

/// Resolve a raw track: time fields chain from `inherited`, value fields chain from `seed`.
pub fn cascade<D: Cascade>(
    raw: &[D],
    seed: D::Value,
    inherited: TimeWindow,
    clock: &dyn Clock,
) -> SceneResult<Track<D::Value>> {
    let times: Vec<TimeFields> = raw.iter().map(|d| d.time().clone()).collect();
    let windows = resolve_time_defaults(&times, inherited, clock)?;

    let mut running = seed;
    let mut out = Track::with_capacity(raw.len());
    for (def, window) in raw.iter().zip(windows) {
        let value = def.fill(&running);
        running = value.clone();
        out.push(Keyframe { window, value });
    }
    Ok(out)
}

fn or_running(field: &Option<Scalar>, running: &Scalar) -> Scalar {
    field.clone().unwrap_or_else(|| running.clone())
}

/// Raw position/pivot/target/up/dimension keyframe.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct XyzDef {
    /// Timing.
    #[serde(flatten)]
    pub time: TimeFields,
    /// X component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<Scalar>,
    /// Y component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<Scalar>,
    /// Z component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<Scalar>,
}

impl Cascade for XyzDef {
    type Value = Xyz<Scalar>;

    fn time(&self) -> &TimeFields {
        &self.time
    }

    fn fill(&self, running: &Xyz<Scalar>) -> Xyz<Scalar> {
        Xyz::new(
            or_running(&self.x, &running.x),
            or_running(&self.y, &running.y),
            or_running(&self.z, &running.z),
        )
    }
}

/// Raw scale keyframe; `uniform3d` and `uniform2d` are shorthands over the axes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScaleDef {
    /// Timing.
    #[serde(flatten)]
    pub time: TimeFields,
    /// X factor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<Scalar>,
    /// Y factor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<Scalar>,
    /// Z factor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<Scalar>,
    /// Sets x, y and z.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uniform3d: Option<Scalar>,
    /// Sets x and y.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uniform2d: Option<Scalar>,
}

impl Cascade for ScaleDef {
    type Value = Xyz<Scalar>;

    fn time(&self) -> &TimeFields {
        &self.time
    }

    fn fill(&self, running: &Xyz<Scalar>) -> Xyz<Scalar> {
        let (x, y, z) = if let Some(u) = &self.uniform3d {
            (Some(u.clone()), Some(u.clone()), Some(u.clone()))
        } else if let Some(u) = &self.uniform2d {
            (Some(u.clone()), Some(u.clone()), self.z.clone())
        } else {
            (self.x.clone(), self.y.clone(), self.z.clone())
        };
        Xyz::new(
            or_running(&x, &running.x),
            or_running(&y, &running.y),
            or_running(&z, &running.z),
        )
    }
}

/// Raw color keyframe in 0..=255 units.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RgbaDef {
    /// Timing.
    #[serde(flatten)]
    pub time: TimeFields,
    /// Red.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<Scalar>,
    /// Green.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub g: Option<Scalar>,
    /// Blue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<Scalar>,
    /// Alpha.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<Scalar>,
}

impl Cascade for RgbaDef {
    type Value = Rgba<Scalar>;

    fn time(&self) -> &TimeFields {
        &self.time
    }

    fn fill(&self, running: &Rgba<Scalar>) -> Rgba<Scalar> {
        Rgba::new(
            or_running(&self.r, &running.r),
            or_running(&self.g, &running.g),
            or_running(&self.b, &running.b),
            or_running(&self.a, &running.a),
        )
    }
}

/// Raw rotation keyframe.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AngleDef {
    /// Timing.
    #[serde(flatten)]
    pub time: TimeFields,
    /// Degrees around X.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degrees_x: Option<Scalar>,
    /// Degrees around Y.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degrees_y: Option<Scalar>,
    /// Degrees around Z.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degrees_z: Option<Scalar>,
    /// Axis X weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<Scalar>,
    /// Axis Y weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<Scalar>,
    /// Axis Z weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<Scalar>,
    /// No longer supported here; pivots live on the animation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot: Option<serde_json::Value>,
}

impl AngleDef {
    /// True when this keyframe still carries the retired per-angle pivot.
    pub fn has_deprecated_pivot(&self) -> bool {
        self.pivot.is_some()
    }
}

impl Cascade for AngleDef {
    type Value = Angle<Scalar>;

    fn time(&self) -> &TimeFields {
        &self.time
    }

    fn fill(&self, running: &Angle<Scalar>) -> Angle<Scalar> {
        Angle {
            degrees_x: or_running(&self.degrees_x, &running.degrees_x),
            degrees_y: or_running(&self.degrees_y, &running.degrees_y),
            degrees_z: or_running(&self.degrees_z, &running.degrees_z),
            x: or_running(&self.x, &running.x),
            y: or_running(&self.y, &running.y),
            z: or_running(&self.z, &running.z),
        }
    }
}

/// Raw camera projection keyframe.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveDef {
    /// Timing.
    #[serde(flatten)]
    pub time: TimeFields,
    /// Field of view in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fov: Option<Scalar>,
    /// Aspect ratio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect: Option<Scalar>,
    /// Near plane.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub near: Option<Scalar>,
    /// Far plane.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub far: Option<Scalar>,
}

impl Cascade for PerspectiveDef {
    type Value = Perspective<Scalar>;

    fn time(&self) -> &TimeFields {
        &self.time
    }

    fn fill(&self, running: &Perspective<Scalar>) -> Perspective<Scalar> {
        Perspective {
            fov: or_running(&self.fov, &running.fov),
            aspect: or_running(&self.aspect, &running.aspect),
            near: or_running(&self.near, &running.near),
            far: or_running(&self.far, &running.far),
        }
    }
}

/// Seed values for the first keyframe of each property family.
pub mod seeds {
    use crate::foundation::core::{Angle, Perspective, Rgba, Xyz};

    /// Opaque white.
    pub const COLOR: Rgba<f64> = Rgba {
        r: 255.0,
        g: 255.0,
        b: 255.0,
        a: 255.0,
    };
    /// Zero degrees around axis (1, 1, 1).
    pub const ANGLE: Angle<f64> = Angle {
        degrees_x: 0.0,
        degrees_y: 0.0,
        degrees_z: 0.0,
        x: 1.0,
        y: 1.0,
        z: 1.0,
    };
    /// Unit scale.
    pub const SCALE: Xyz<f64> = Xyz { x: 1.0, y: 1.0, z: 1.0 };
    /// Unit render dimension.
    pub const DIMENSION: Xyz<f64> = Xyz { x: 1.0, y: 1.0, z: 1.0 };
    /// Origin, for positions and pivots.
    pub const ORIGIN: Xyz<f64> = Xyz { x: 0.0, y: 0.0, z: 0.0 };
    /// Default light position.
    pub const LIGHT_POSITION: Xyz<f64> = Xyz { x: 0.0, y: 0.0, z: 1.0 };
    /// Default camera position.
    pub const CAMERA_POSITION: Xyz<f64> = Xyz { x: 0.0, y: 0.0, z: 2.0 };
    /// Default camera up vector.
    pub const CAMERA_UP: Xyz<f64> = Xyz { x: 0.0, y: 1.0, z: 0.0 };

    /// 45 degree projection for the host aspect ratio.
    pub fn perspective(aspect: f64) -> Perspective<f64> {
        Perspective {
            fov: 45.0,
            aspect,
            near: 1.0,
            far: 1000.0,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/cascade.rs"]
mod tests;
