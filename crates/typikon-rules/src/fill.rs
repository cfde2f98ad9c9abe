//! Repetition/fill of hymn sequences
//!
//! When a distribution asks for more hymns than a source provides, the
//! available ones are repeated:
//!
//! - exactly twice as many requested: each hymn is doubled in place
//!   (`A, A, B, B`);
//! - otherwise: the first hymn is repeated in front until the count is
//!   reached (`A, A, B, C`).
//!
//! More hymns than requested are truncated to the first `target`.

/// Pad or truncate `items` to exactly `target` entries
///
/// Total: an empty input or a zero target yields an empty sequence.
///
/// # Example
///
/// ```rust,ignore
/// assert_eq!(fill_to_count(&["A", "B"], 4), vec!["A", "A", "B", "B"]);
/// assert_eq!(fill_to_count(&["A", "B", "C"], 4), vec!["A", "A", "B", "C"]);
/// ```
#[must_use]
pub fn fill_to_count<T: Clone>(items: &[T], target: usize) -> Vec<T> {
    let Some(first) = items.first() else {
        return Vec::new();
    };
    if items.len() >= target {
        return items[..target].to_vec();
    }

    if target == items.len() * 2 {
        return items
            .iter()
            .flat_map(|item| [item.clone(), item.clone()])
            .collect();
    }

    let mut filled = Vec::with_capacity(target);
    filled.extend(std::iter::repeat(first).take(target - items.len()).cloned());
    filled.extend_from_slice(items);
    filled
}
