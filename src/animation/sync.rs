use serde::{Deserialize, Serialize};

/// Properties that can follow external sync progress instead of wall time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncProperty {
    /// Color tracks, light colors included.
    Color,
    /// Rotation.
    Angle,
    /// Scale.
    Scale,
    /// Position.
    Position,
    /// Pivot.
    Pivot,
    /// Camera projection.
    Perspective,
    /// FBO render dimension.
    Dimension,
    /// Camera target.
    Target,
    /// Camera up vector.
    Up,
}

impl SyncProperty {
    /// Every property, in resolution order.
    pub const ALL: [Self; 9] = [
        Self::Color,
        Self::Angle,
        Self::Scale,
        Self::Position,
        Self::Pivot,
        Self::Perspective,
        Self::Dimension,
        Self::Target,
        Self::Up,
    ];
}

/// The `sync` block as written in a scene.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncDef {
    /// Default for every unset property flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all: Option<bool>,
    /// Color flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,
    /// Angle flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<bool>,
    /// Scale flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<bool>,
    /// Position flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<bool>,
    /// Pivot flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot: Option<bool>,
    /// Perspective flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perspective: Option<bool>,
    /// Dimension flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<bool>,
    /// Camera target flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<bool>,
    /// Camera up flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up: Option<bool>,
}

impl SyncDef {
    /// Mutable access to one property flag.
    pub fn flag_mut(&mut self, property: SyncProperty) -> &mut Option<bool> {
        match property {
            SyncProperty::Color => &mut self.color,
            SyncProperty::Angle => &mut self.angle,
            SyncProperty::Scale => &mut self.scale,
            SyncProperty::Position => &mut self.position,
            SyncProperty::Pivot => &mut self.pivot,
            SyncProperty::Perspective => &mut self.perspective,
            SyncProperty::Dimension => &mut self.dimension,
            SyncProperty::Target => &mut self.target,
            SyncProperty::Up => &mut self.up,
        }
    }

    /// Resolve every property flag, then fill `all` with `true` when it was left unset.
    pub fn resolve(mut self) -> SyncState {
        for property in SyncProperty::ALL {
            set_sync_default(Some(&mut self), property);
        }
        let flag = |v: Option<bool>| v.unwrap_or(false);
        SyncState {
            all: self.all.unwrap_or(true),
            color: flag(self.color),
            angle: flag(self.angle),
            scale: flag(self.scale),
            position: flag(self.position),
            pivot: flag(self.pivot),
            perspective: flag(self.perspective),
            dimension: flag(self.dimension),
            target: flag(self.target),
            up: flag(self.up),
            progress: 0.0,
        }
    }
}

/// Give an unset property flag its default: `true` only when `all` is explicitly `true`.
/// Does nothing when the animation has no sync block.
pub fn set_sync_default(sync: Option<&mut SyncDef>, property: SyncProperty) {
    let Some(sync) = sync else {
        return;
    };
    let all = sync.all == Some(true);
    let flag = sync.flag_mut(property);
    if flag.is_none() {
        *flag = Some(all);
    }
}

/// Resolved sync flags plus the progress most recently supplied by the sync provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncState {
    /// Resolved `all` flag.
    pub all: bool,
    /// Color flag.
    pub color: bool,
    /// Angle flag.
    pub angle: bool,
    /// Scale flag.
    pub scale: bool,
    /// Position flag.
    pub position: bool,
    /// Pivot flag.
    pub pivot: bool,
    /// Perspective flag.
    pub perspective: bool,
    /// Dimension flag.
    pub dimension: bool,
    /// Camera target flag.
    pub target: bool,
    /// Camera up flag.
    pub up: bool,
    /// Progress in `[0, 1]`.
    pub progress: f64,
}

impl SyncState {
    /// Whether `property` follows sync progress.
    pub fn flag(&self, property: SyncProperty) -> bool {
        match property {
            SyncProperty::Color => self.color,
            SyncProperty::Angle => self.angle,
            SyncProperty::Scale => self.scale,
            SyncProperty::Position => self.position,
            SyncProperty::Pivot => self.pivot,
            SyncProperty::Perspective => self.perspective,
            SyncProperty::Dimension => self.dimension,
            SyncProperty::Target => self.target,
            SyncProperty::Up => self.up,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/sync.rs"]
mod tests;
