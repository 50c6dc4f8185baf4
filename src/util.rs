//! Small helpers called by generated code
//!
//! Strings are counted in characters, not bytes.

use rand::Rng;

/// Random integer in `min..=max`. Swapped bounds are accepted.
pub fn random(min: i64, max: i64) -> i64 {
    let (low, high) = if min <= max { (min, max) } else { (max, min) };
    rand::thread_rng().gen_range(low..=high)
}

pub fn length(text: &str) -> usize {
    text.chars().count()
}

/// The character at `index` as a string, or an empty string when out of range.
pub fn char_at(text: &str, index: i64) -> String {
    usize::try_from(index)
        .ok()
        .and_then(|i| text.chars().nth(i))
        .map(String::from)
        .unwrap_or_default()
}

pub fn uppercase(text: &str) -> String {
    text.to_uppercase()
}
