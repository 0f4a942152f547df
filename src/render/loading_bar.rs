use crate::config::PlayerSettings;
use crate::foundation::core::Rgba;
use crate::host::ProgressReporter;
use crate::render::backend::{Blend, Renderer};
use kurbo::Rect;
use serde::Serialize;

const BAR_WIDTH: f64 = 0.6;
const BAR_HEIGHT: f64 = 0.2;
const SPACING: f64 = 0.01;
const BACKGROUND_GRAY: f64 = 0.2;
const FILL_GRAY: f64 = 0.4;

/// Resource counters behind the loading bar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LoadingProgress {
    /// Resources announced so far.
    pub total: u32,
    /// Resources finished so far.
    pub loaded: u32,
}

impl ProgressReporter for LoadingProgress {
    fn add_resource_count(&mut self, n: u32) {
        self.total = self.total.saturating_add(n);
    }

    fn notify_resource_loaded(&mut self) {
        self.loaded = self.loaded.saturating_add(1);
    }
}

/// One filled rectangle of the bar, color in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BarQuad {
    /// Screen-space rectangle.
    pub rect: Rect,
    /// Fill color.
    pub color: [f64; 4],
}

impl LoadingProgress {
    /// Loaded fraction in `[0, 1]`; nothing to load counts as done.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (f64::from(self.loaded) / f64::from(self.total)).clamp(0.0, 1.0)
    }

    /// Bar opacity: opaque until `threshold`, then a linear fade reaching zero at 100 %.
    pub fn fade(&self, threshold: f64) -> f64 {
        let p = self.percent();
        if p > threshold {
            (1.0 - (p - threshold) / (1.0 - threshold)).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    /// Background and fill quads for a screen described by `settings`.
    pub fn quads(&self, settings: &PlayerSettings) -> [BarQuad; 2] {
        let w = f64::from(settings.width);
        let h = f64::from(settings.height);
        let bar_w = w * BAR_WIDTH;
        let bar_h = h * BAR_HEIGHT;
        let sx = w * SPACING;
        let sy = h * SPACING * settings.aspect_ratio();

        let x1 = w / 2.0 - bar_w / 2.0;
        let x2 = w / 2.0 + bar_w / 2.0;
        let y1 = h / 2.0 - bar_h / 2.0;
        let y2 = h / 2.0 + bar_h / 2.0;
        let alpha = self.fade(settings.loading_fade_threshold);

        [
            BarQuad {
                rect: Rect::new(x1 - sx, y1 - sy, x2 + sx, y2 + sy),
                color: [BACKGROUND_GRAY, BACKGROUND_GRAY, BACKGROUND_GRAY, alpha],
            },
            BarQuad {
                rect: Rect::new(x1, y1, x1 + bar_w * self.percent(), y2),
                color: [FILL_GRAY, FILL_GRAY, FILL_GRAY, alpha],
            },
        ]
    }

    /// Draw the bar in a screen-space overlay and leave the color white.
    pub fn draw(&self, renderer: &mut dyn Renderer, settings: &PlayerSettings) {
        renderer.begin_overlay(f64::from(settings.width), f64::from(settings.height));
        renderer.set_blend(Blend::ALPHA);
        for quad in self.quads(settings) {
            renderer.draw_screen_quad(quad.rect, quad.color);
        }
        renderer.set_color(Rgba::new(255.0, 255.0, 255.0, 255.0));
        renderer.end_overlay();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/loading_bar.rs"]
mod tests;
