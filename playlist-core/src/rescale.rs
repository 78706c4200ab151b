//! Linear min-max rescaling

use crate::error::{Error, Result};

/// Remap `values` so their minimum lands on `new_min` and maximum on `new_max`
///
/// Undefined for an empty or constant series; both return [`Error::Rescale`]
/// and the caller decides how to place such points.
pub fn rescale(values: &[f64], new_min: f64, new_max: f64) -> Result<Vec<f64>> {
    let (old_min, old_max) = values
        .iter()
        .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .ok_or_else(|| Error::Rescale("empty series".into()))?;

    let span = old_max - old_min;
    if span == 0.0 || !span.is_finite() {
        return Err(Error::Rescale(format!(
            "undefined for constant series (all values {})",
            old_min
        )));
    }

    Ok(values
        .iter()
        .map(|v| (new_max - new_min) * (v - old_min) / span + new_min)
        .collect())
}
