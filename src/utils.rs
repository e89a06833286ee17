//! Small numeric helpers shared across modules.

pub mod safe_cast;

/// Median of a slice of values
///
/// Returns `None` for an empty slice. Even-length input averages the two
/// middle values. NaN sorts after every other value, so callers should
/// filter non-finite input first.
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let len = sorted.len();
    if len % 2 == 0 {
        Some((sorted[len / 2 - 1] + sorted[len / 2]) / 2.0)
    } else {
        Some(sorted[len / 2])
    }
}

/// Integer square root when `n` is a perfect square
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn exact_sqrt(n: usize) -> Option<usize> {
    // The float root is within one of the integer root for any usize
    let guess = (n as f64).sqrt().round() as usize;
    [guess.saturating_sub(1), guess, guess.saturating_add(1)]
        .into_iter()
        .find(|side| side.checked_mul(*side) == Some(n))
}
