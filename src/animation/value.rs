use crate::foundation::core::{Angle, Perspective, Rgba, Xyz};
use crate::foundation::error::SceneResult;
use serde::{Deserialize, Serialize};

/// A keyframe field: either a literal number or an inline `{ ... }` expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    /// Literal value.
    Number(f64),
    /// Expression source, evaluated against the owning animation each frame.
    Expr(String),
}

impl Scalar {
    /// Literal value, if this is not an expression.
    pub fn number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Expr(_) => None,
        }
    }

    /// True when the field must go through the expression engine.
    pub fn is_expr(&self) -> bool {
        matches!(self, Self::Expr(_))
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Self::Number(0.0)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl Serialize for Scalar {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Number(v) => serializer.serialize_f64(*v),
            Self::Expr(src) => serializer.serialize_str(src),
        }
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(f64),
            Bool(bool),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Num(v) => Ok(Self::Number(v)),
            Repr::Bool(b) => Ok(Self::Number(if b { 1.0 } else { 0.0 })),
            Repr::Text(s) => {
                if s.starts_with('{') {
                    return Ok(Self::Expr(s));
                }
                s.trim().parse::<f64>().map(Self::Number).map_err(|_| {
                    serde::de::Error::custom(format!(
                        "expected a number or a '{{ ... }}' expression, got \"{s}\""
                    ))
                })
            }
        }
    }
}

/// Turns a keyframe value with possible expression fields into concrete numbers.
pub trait ResolveScalars {
    /// Concrete counterpart of `Self`.
    type Output;

    /// Resolve every field through `eval`, stopping at the first failure.
    fn resolve_scalars(
        &self,
        eval: &mut dyn FnMut(&Scalar) -> SceneResult<f64>,
    ) -> SceneResult<Self::Output>;
}

impl ResolveScalars for Scalar {
    type Output = f64;

    fn resolve_scalars(
        &self,
        eval: &mut dyn FnMut(&Scalar) -> SceneResult<f64>,
    ) -> SceneResult<f64> {
        eval(self)
    }
}

impl ResolveScalars for Xyz<Scalar> {
    type Output = Xyz<f64>;

    fn resolve_scalars(
        &self,
        eval: &mut dyn FnMut(&Scalar) -> SceneResult<f64>,
    ) -> SceneResult<Xyz<f64>> {
        Ok(Xyz::new(eval(&self.x)?, eval(&self.y)?, eval(&self.z)?))
    }
}

impl ResolveScalars for Rgba<Scalar> {
    type Output = Rgba<f64>;

    fn resolve_scalars(
        &self,
        eval: &mut dyn FnMut(&Scalar) -> SceneResult<f64>,
    ) -> SceneResult<Rgba<f64>> {
        Ok(Rgba::new(
            eval(&self.r)?,
            eval(&self.g)?,
            eval(&self.b)?,
            eval(&self.a)?,
        ))
    }
}

impl ResolveScalars for Angle<Scalar> {
    type Output = Angle<f64>;

    fn resolve_scalars(
        &self,
        eval: &mut dyn FnMut(&Scalar) -> SceneResult<f64>,
    ) -> SceneResult<Angle<f64>> {
        Ok(Angle {
            degrees_x: eval(&self.degrees_x)?,
            degrees_y: eval(&self.degrees_y)?,
            degrees_z: eval(&self.degrees_z)?,
            x: eval(&self.x)?,
            y: eval(&self.y)?,
            z: eval(&self.z)?,
        })
    }
}

impl ResolveScalars for Perspective<Scalar> {
    type Output = Perspective<f64>;

    fn resolve_scalars(
        &self,
        eval: &mut dyn FnMut(&Scalar) -> SceneResult<f64>,
    ) -> SceneResult<Perspective<f64>> {
        Ok(Perspective {
            fov: eval(&self.fov)?,
            aspect: eval(&self.aspect)?,
            near: eval(&self.near)?,
            far: eval(&self.far)?,
        })
    }
}

/// Lift a concrete seed into its scalar form.
pub trait IntoScalars {
    /// Scalar counterpart of `Self`.
    type Scalars;

    /// Wrap every field as [`Scalar::Number`].
    fn into_scalars(self) -> Self::Scalars;
}

impl IntoScalars for Xyz<f64> {
    type Scalars = Xyz<Scalar>;

    fn into_scalars(self) -> Xyz<Scalar> {
        Xyz::new(self.x.into(), self.y.into(), self.z.into())
    }
}

impl IntoScalars for Rgba<f64> {
    type Scalars = Rgba<Scalar>;

    fn into_scalars(self) -> Rgba<Scalar> {
        Rgba::new(self.r.into(), self.g.into(), self.b.into(), self.a.into())
    }
}

impl IntoScalars for Angle<f64> {
    type Scalars = Angle<Scalar>;

    fn into_scalars(self) -> Angle<Scalar> {
        Angle {
            degrees_x: self.degrees_x.into(),
            degrees_y: self.degrees_y.into(),
            degrees_z: self.degrees_z.into(),
            x: self.x.into(),
            y: self.y.into(),
            z: self.z.into(),
        }
    }
}

impl IntoScalars for Perspective<f64> {
    type Scalars = Perspective<Scalar>;

    fn into_scalars(self) -> Perspective<Scalar> {
        Perspective {
            fov: self.fov.into(),
            aspect: self.aspect.into(),
            near: self.near.into(),
            far: self.far.into(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/value.rs"]
mod tests;
