use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use crate::{Result, TypeError};

/// Target size for output images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ResolutionSpec {
    /// Keep each source image's own dimensions.
    #[default]
    Original,
    Custom {
        width: NonZeroU32,
        height: NonZeroU32,
    },
}

/// The choices offered by the resolution picker, in display order.
pub const PRESETS: [ResolutionSpec; 4] = [
    ResolutionSpec::Original,
    preset(1920, 1080),
    preset(1280, 720),
    preset(800, 600),
];

const fn preset(width: u32, height: u32) -> ResolutionSpec {
    match (NonZeroU32::new(width), NonZeroU32::new(height)) {
        (Some(width), Some(height)) => ResolutionSpec::Custom { width, height },
        _ => ResolutionSpec::Original,
    }
}

impl ResolutionSpec {
    pub fn custom(width: u32, height: u32) -> Result<Self> {
        match (NonZeroU32::new(width), NonZeroU32::new(height)) {
            (Some(width), Some(height)) => Ok(Self::Custom { width, height }),
            _ => Err(TypeError::InvalidResolution {
                width: width.into(),
                height: height.into(),
            }),
        }
    }

    /// Dimensions an image of the given native size ends up with.
    pub fn resolve(self, native_width: u32, native_height: u32) -> (u32, u32) {
        match self {
            Self::Original => (native_width, native_height),
            Self::Custom { width, height } => (width.get(), height.get()),
        }
    }

    pub fn is_original(self) -> bool {
        matches!(self, Self::Original)
    }
}

impl fmt::Display for ResolutionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Original => f.write_str("Original"),
            Self::Custom { width, height } => write!(f, "{width}x{height}"),
        }
    }
}

impl FromStr for ResolutionSpec {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s.trim();
        if raw.eq_ignore_ascii_case("original") {
            return Ok(Self::Original);
        }

        let syntax = || TypeError::ResolutionSyntax(s.to_string());
        let (w, h) = raw
            .split_once(['x', 'X'])
            .ok_or_else(syntax)?;
        let width: i64 = w.trim().parse().map_err(|_| syntax())?;
        let height: i64 = h.trim().parse().map_err(|_| syntax())?;

        match (u32::try_from(width), u32::try_from(height)) {
            (Ok(w), Ok(h)) => Self::custom(w, h),
            _ => Err(TypeError::InvalidResolution { width, height }),
        }
    }
}

impl TryFrom<String> for ResolutionSpec {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ResolutionSpec> for String {
    fn from(spec: ResolutionSpec) -> Self {
        spec.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_match_picker_labels() {
        let labels: Vec<String> = PRESETS.iter().map(ToString::to_string).collect();
        assert_eq!(labels, ["Original", "1920x1080", "1280x720", "800x600"]);
    }

    #[test]
    fn parses_original_and_custom() {
        assert_eq!("original".parse::<ResolutionSpec>().unwrap(), ResolutionSpec::Original);
        assert_eq!(
            " 640X480 ".parse::<ResolutionSpec>().unwrap(),
            ResolutionSpec::custom(640, 480).unwrap()
        );
    }

    #[test]
    fn rejects_non_positive_dimensions() {
        assert_eq!(
            ResolutionSpec::custom(0, 10).unwrap_err(),
            TypeError::InvalidResolution {
                width: 0,
                height: 10
            }
        );
        assert!(matches!(
            "-5x10".parse::<ResolutionSpec>(),
            Err(TypeError::InvalidResolution { width: -5, .. })
        ));
        assert!(matches!(
            "10by10".parse::<ResolutionSpec>(),
            Err(TypeError::ResolutionSyntax(_))
        ));
    }

    #[test]
    fn resolve_uses_native_size_only_for_original() {
        assert_eq!(ResolutionSpec::Original.resolve(31, 7), (31, 7));
        assert_eq!(PRESETS[1].resolve(31, 7), (1920, 1080));
    }

    #[test]
    fn serializes_as_label() {
        let json = serde_json::to_string(&PRESETS[3]).unwrap();
        assert_eq!(json, "\"800x600\"");
        let back: ResolutionSpec = serde_json::from_str("\"Original\"").unwrap();
        assert!(back.is_original());
        assert!(serde_json::from_str::<ResolutionSpec>("\"0x600\"").is_err());
    }
}
