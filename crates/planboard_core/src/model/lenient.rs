//! Field readers for backend records that send `null` or floats where a plain value is expected.

use serde::{Deserialize, Deserializer};

/// A string field where `null` reads as empty.
pub(crate) fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A day or extension count sent as an integer or a float such as `2.0`. Fractions are rounded.
pub(crate) fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw
        .filter(|value| value.is_finite())
        .map(|value| value.round().clamp(i64::MIN as f64, i64::MAX as f64) as i64))
}
