use std::fmt;
use std::str::FromStr;

/// The media category a worker is specialized for, and the category a
/// client derives from a file's extension before requesting distortion.
///
/// Wire values are exactly `Text` and `Media` (case-sensitive) — this is
/// the canonical protocol spelling; any cosmetic nicknames used in log
/// output belong to the crates that do logging, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaClass {
    /// Plain text files (`.txt`).
    Text,
    /// Binary media files (`.wav`, `.jpg`, `.png`, ...).
    Media,
}

impl MediaClass {
    /// The exact wire spelling for this class.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            MediaClass::Text => "Text",
            MediaClass::Media => "Media",
        }
    }
}

impl fmt::Display for MediaClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The class spelling on the wire did not match `Text` or `Media`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown media class {0:?}")]
pub struct UnknownMediaClass(pub String);

impl FromStr for MediaClass {
    type Err = UnknownMediaClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Text" => Ok(MediaClass::Text),
            "Media" => Ok(MediaClass::Media),
            other => Err(UnknownMediaClass(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_display_and_from_str() {
        for class in [MediaClass::Text, MediaClass::Media] {
            assert_eq!(class.to_string().parse::<MediaClass>().unwrap(), class);
        }
    }

    #[test]
    fn rejects_lowercase_and_unknown_spellings() {
        assert!("text".parse::<MediaClass>().is_err());
        assert!("Audio".parse::<MediaClass>().is_err());
    }
}
