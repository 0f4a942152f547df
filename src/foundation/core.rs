use serde::{Deserialize, Serialize};

/// Resolved `[start, end)` time window in seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start time in seconds.
    pub start: f64,
    /// Duration in seconds.
    pub duration: f64,
    /// End time in seconds (exclusive).
    pub end: f64,
}

impl TimeWindow {
    /// Build a window from start and duration, deriving `end`.
    pub fn new(start: f64, duration: f64) -> Self {
        Self {
            start,
            duration,
            end: start + duration,
        }
    }

    /// True when `time` lies in `[start, end)`.
    pub fn contains(self, time: f64) -> bool {
        time >= self.start && time < self.end
    }

    /// The running triple handed to the next entry: back-to-back with this one.
    pub fn following(self) -> Self {
        Self::new(self.end, self.duration)
    }

    /// The running triple handed to the next animation: starts at this end and carries the
    /// covered span `end - start`, which differs from `duration` when both were authored.
    pub fn following_span(self) -> Self {
        Self::new(self.end, self.end - self.start)
    }
}

/// Three-component coordinate (position, pivot, scale, dimension, camera vectors).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Xyz<T> {
    /// X component.
    pub x: T,
    /// Y component.
    pub y: T,
    /// Z component.
    pub z: T,
}

impl<T> Xyz<T> {
    /// Build a coordinate from its components.
    pub fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }
}

/// RGBA color in 0..=255 channel units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rgba<T> {
    /// Red channel.
    pub r: T,
    /// Green channel.
    pub g: T,
    /// Blue channel.
    pub b: T,
    /// Alpha channel.
    pub a: T,
}

impl<T> Rgba<T> {
    /// Build a color from its channels.
    pub fn new(r: T, g: T, b: T, a: T) -> Self {
        Self { r, g, b, a }
    }
}

impl Rgba<f64> {
    /// Channels scaled into `[0, 1]` floats, as consumed by lighting and object tinting.
    pub fn normalized(self) -> [f64; 4] {
        [self.r / 255.0, self.g / 255.0, self.b / 255.0, self.a / 255.0]
    }
}

/// Rotation in degrees per axis, plus the rotation axis weights.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Angle<T> {
    /// Degrees around X.
    pub degrees_x: T,
    /// Degrees around Y.
    pub degrees_y: T,
    /// Degrees around Z.
    pub degrees_z: T,
    /// Axis X weight.
    pub x: T,
    /// Axis Y weight.
    pub y: T,
    /// Axis Z weight.
    pub z: T,
}

/// Camera projection parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Perspective<T> {
    /// Vertical field of view in degrees.
    pub fov: T,
    /// Viewport aspect ratio.
    pub aspect: T,
    /// Near clip plane.
    pub near: T,
    /// Far clip plane.
    pub far: T,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
