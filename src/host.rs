use crate::foundation::core::TimeWindow;
use crate::foundation::error::{SceneError, SceneResult};
use crate::render::backend::Renderer;
use crate::resources::loader::ResourceLoader;

/// Test doubles for every collaborator.
pub mod recording;

/// Scene time source.
pub trait Clock {
    /// Current scene time in seconds.
    fn now(&self) -> f64;

    /// Convert clock text such as `"1:02.5"` to seconds.
    fn convert_textual_time(&self, text: &str) -> SceneResult<f64> {
        parse_clock_time(text)
    }
}

/// Supplies externally driven progress for synced animations.
pub trait SyncProvider {
    /// Progress in `[0, 1]` for an animation spanning `window` at `time`.
    fn progress(&mut self, time: f64, window: TimeWindow) -> f64;
}

/// Aggregate counters behind the loading bar.
pub trait ProgressReporter {
    /// `n` more resources will be loaded.
    fn add_resource_count(&mut self, n: u32);

    /// One resource finished loading.
    fn notify_resource_loaded(&mut self);
}

/// Window title or equivalent status line.
pub trait StatusReporter {
    /// Replace the status text.
    fn set_title(&mut self, title: &str);
}

/// Every collaborator the preprocessor and dispatcher talk to, borrowed for one call.
pub struct Host<'a> {
    /// Time source.
    pub clock: &'a dyn Clock,
    /// Resource loader.
    pub loader: &'a mut dyn ResourceLoader,
    /// Draw backend.
    pub renderer: &'a mut dyn Renderer,
    /// Sync progress source.
    pub sync: &'a mut dyn SyncProvider,
    /// Loading progress sink.
    pub progress: &'a mut dyn ProgressReporter,
    /// Status line.
    pub status: &'a mut dyn StatusReporter,
}

/// Parse `[#]minutes:seconds[.fraction]` into seconds.
pub fn parse_clock_time(text: &str) -> SceneResult<f64> {
    let bad = || SceneError::parse(format!("time \"{text}\" is not in format [#]m:ss[.fff]"));

    let body = text.trim();
    let body = body.strip_prefix('#').unwrap_or(body);
    let (minutes, rest) = body.split_once(':').ok_or_else(bad)?;
    if minutes.is_empty() || !minutes.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || digits > 2 {
        return Err(bad());
    }
    let (seconds, fraction) = rest.split_at(digits);
    let fraction = match fraction {
        "" => 0.0,
        f if f.starts_with('.') && f[1..].bytes().all(|b| b.is_ascii_digit()) => {
            if f.len() == 1 {
                0.0
            } else {
                f.parse::<f64>().map_err(|_| bad())?
            }
        }
        _ => return Err(bad()),
    };

    let minutes: f64 = minutes.parse().map_err(|_| bad())?;
    let seconds: f64 = seconds.parse().map_err(|_| bad())?;
    Ok(minutes * 60.0 + seconds + fraction)
}

#[cfg(test)]
#[path = "../tests/unit/host.rs"]
mod tests;
