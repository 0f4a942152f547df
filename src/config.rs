use crate::animation::track::TimeValue;
use crate::foundation::core::TimeWindow;
use crate::foundation::error::{SceneError, SceneResult};
use crate::host::Clock;
use serde::{Deserialize, Serialize};

/// Host settings the timeline core reads. Every field has a default, so `{}` is a valid file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerSettings {
    /// Screen width in pixels.
    pub width: u32,
    /// Screen height in pixels.
    pub height: u32,
    /// Aspect ratio override; `width / height` when unset.
    pub aspect_ratio: Option<f64>,
    /// Scene start.
    pub scene_start: TimeValue,
    /// Scene end.
    pub scene_end: TimeValue,
    /// Older scene scripts: y grows downwards for 2-D positions and objects default to
    /// unlit flat colors.
    pub legacy_coordinates: bool,
    /// Loading-bar progress at which the bar starts fading out.
    pub loading_fade_threshold: f64,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            aspect_ratio: None,
            scene_start: TimeValue::Seconds(0.0),
            scene_end: TimeValue::Seconds(60.0),
            legacy_coordinates: false,
            loading_fade_threshold: 0.85,
        }
    }
}

impl PlayerSettings {
    /// Aspect ratio used for default camera projections.
    pub fn aspect_ratio(&self) -> f64 {
        match self.aspect_ratio {
            Some(a) => a,
            None if self.height == 0 => 1.0,
            None => f64::from(self.width) / f64::from(self.height),
        }
    }

    /// Reject settings that cannot drive a scene.
    pub fn validate(&self) -> SceneResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SceneError::validation("screen width/height must be non-zero"));
        }
        if let Some(a) = self.aspect_ratio
            && !(a.is_finite() && a > 0.0)
        {
            return Err(SceneError::validation("aspect ratio must be finite and > 0"));
        }
        if !(self.loading_fade_threshold >= 0.0 && self.loading_fade_threshold < 1.0) {
            return Err(SceneError::validation(
                "loading fade threshold must be in [0, 1)",
            ));
        }
        Ok(())
    }

    /// Scene window that seeds the animation window chain.
    pub fn scene_window(&self, clock: &dyn Clock) -> SceneResult<TimeWindow> {
        let seconds = |v: &TimeValue| match v {
            TimeValue::Seconds(s) => Ok(*s),
            TimeValue::Clock(text) => clock.convert_textual_time(text),
        };
        let start = seconds(&self.scene_start)?;
        let end = seconds(&self.scene_end)?;
        Ok(TimeWindow {
            start,
            duration: end - start,
            end,
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
