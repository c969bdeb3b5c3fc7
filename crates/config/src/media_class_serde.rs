use std::str::FromStr;

use frame::MediaClass;
use serde::{Deserialize, Deserializer};

/// Deserializes a `class = "Text"` / `class = "Media"` TOML field into a
/// [`MediaClass`], which does not itself derive `serde::Deserialize` (the
/// wire-format crate stays free of a serde dependency).
pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<MediaClass, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    MediaClass::from_str(&raw).map_err(serde::de::Error::custom)
}
