use crate::foundation::core::TimeWindow;
use crate::foundation::error::SceneResult;
use crate::host::Clock;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A time field as written in a scene: seconds, or clock text such as `"1:02.5"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeValue {
    /// Offset in seconds.
    Seconds(f64),
    /// `[#]minutes:seconds[.fraction]`, converted by the clock.
    Clock(String),
}

impl TimeValue {
    fn seconds(&self, clock: &dyn Clock) -> SceneResult<f64> {
        match self {
            Self::Seconds(s) => Ok(*s),
            Self::Clock(text) => clock.convert_textual_time(text),
        }
    }
}

/// The optional `start`/`duration`/`end` triple of a keyframe or animation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeFields {
    /// Start time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<TimeValue>,
    /// Duration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<TimeValue>,
    /// End time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<TimeValue>,
}

impl TimeFields {
    /// Resolve against the running triple carried from the previous entry.
    pub fn resolve(&self, running: TimeWindow, clock: &dyn Clock) -> SceneResult<TimeWindow> {
        let start = match &self.start {
            Some(v) => v.seconds(clock)?,
            None => running.start,
        };
        let end = self.end.as_ref().map(|v| v.seconds(clock)).transpose()?;
        let duration = match &self.duration {
            Some(v) => v.seconds(clock)?,
            None => match end {
                Some(end) => end - start,
                None => running.duration,
            },
        };
        Ok(TimeWindow {
            start,
            duration,
            end: end.unwrap_or(start + duration),
        })
    }
}

/// Resolve every entry in order. Unset fields chain from the previous entry so that
/// consecutive entries are back-to-back; `inherited` seeds the first one.
pub fn resolve_time_defaults(
    entries: &[TimeFields],
    inherited: TimeWindow,
    clock: &dyn Clock,
) -> SceneResult<Vec<TimeWindow>> {
    let mut running = inherited;
    let mut out = Vec::with_capacity(entries.len());
    for fields in entries {
        let window = fields.resolve(running, clock)?;
        running = window.following();
        out.push(window);
    }
    Ok(out)
}

/// One resolved keyframe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe<T> {
    /// Resolved time window.
    pub window: TimeWindow,
    /// Target value reached at `window.end`.
    pub value: T,
}

/// Ordered keyframes for one property.
pub type Track<T> = SmallVec<[Keyframe<T>; 2]>;

#[cfg(test)]
#[path = "../../tests/unit/animation/track.rs"]
mod tests;
