use crate::scene::model::LayerValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Render-order key. Layers draw in ascending lexicographic order of this string.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerKey(String);

impl LayerKey {
    /// Key given to animations before any explicit layer has been seen.
    pub fn first() -> Self {
        Self("00001".to_owned())
    }

    /// Normalize a layer value: numbers become the last five characters of
    /// `"00000" + n`, strings pass through unchanged.
    pub fn from_value(value: &LayerValue) -> Self {
        match value {
            LayerValue::Text(s) => Self(s.clone()),
            LayerValue::Number(n) => {
                let padded: Vec<char> = format!("00000{}", number_text(*n)).chars().collect();
                Self(padded[padded.len() - 5..].iter().collect())
            }
        }
    }

    /// Key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Shortest round-trip text of `n` in script-number notation: plain digits for decimal
/// exponents in `(-7, 21]`, otherwise `d.ddde±x`.
fn number_text(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_owned();
    }
    if n == 0.0 {
        return "0".to_owned();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    if n < 0.0 {
        return format!("-{}", number_text(-n));
    }

    // `{:e}` yields the shortest round-trip mantissa, e.g. `1.25e-7`.
    let sci = format!("{n:e}");
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let k = digits.len() as i32;
    let point = exp.parse::<i32>().unwrap_or(0) + 1;

    if k <= point && point <= 21 {
        format!("{digits}{}", "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{int}.{frac}")
    } else if -6 < point && point <= 0 {
        format!("0.{}{digits}", "0".repeat((-point) as usize))
    } else {
        let e = point - 1;
        let sign = if e < 0 { '-' } else { '+' };
        let (lead, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{lead}e{sign}{}", e.abs())
        } else {
            format!("{lead}.{rest}e{sign}{}", e.abs())
        }
    }
}

impl fmt::Display for LayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Entries grouped by layer, iterated in key order and insertion order within a layer.
#[derive(Clone, Debug, Serialize)]
pub struct LayerMap<T> {
    layers: BTreeMap<LayerKey, Vec<T>>,
}

impl<T> Default for LayerMap<T> {
    fn default() -> Self {
        Self {
            layers: BTreeMap::new(),
        }
    }
}

impl<T> LayerMap<T> {
    /// Append to the end of `key`'s layer.
    pub fn push(&mut self, key: LayerKey, item: T) {
        self.layers.entry(key).or_default().push(item);
    }

    /// Layer keys in render order.
    pub fn keys(&self) -> impl Iterator<Item = &LayerKey> {
        self.layers.keys()
    }

    /// Layers in render order.
    pub fn iter(&self) -> impl Iterator<Item = (&LayerKey, &[T])> {
        self.layers.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Mutable layers in render order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&LayerKey, &mut Vec<T>)> {
        self.layers.iter_mut()
    }

    /// Every entry in render order.
    pub fn entries(&self) -> impl Iterator<Item = &T> {
        self.layers.values().flatten()
    }

    /// Total entry count.
    pub fn len(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }

    /// True when no entry was added.
    pub fn is_empty(&self) -> bool {
        self.layers.values().all(Vec::is_empty)
    }

    /// Move every entry out, in render order.
    pub fn drain(&mut self) -> impl Iterator<Item = (LayerKey, T)> + use<T> {
        std::mem::take(&mut self.layers)
            .into_iter()
            .flat_map(|(k, v)| v.into_iter().map(move |item| (k.clone(), item)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/layers.rs"]
mod tests;
