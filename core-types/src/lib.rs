use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub mod resolution;

pub use resolution::{ResolutionSpec, PRESETS};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("Color channel {channel} out of range: {value} (expected 0-255)")]
    ColorOutOfRange { channel: &'static str, value: i64 },

    #[error("Invalid color '{0}': expected R,G,B or #RRGGBB")]
    ColorSyntax(String),

    #[error("Invalid resolution {width}x{height}: both dimensions must be positive")]
    InvalidResolution { width: i64, height: i64 },

    #[error("Invalid resolution '{0}': expected Original or WIDTHxHEIGHT")]
    ResolutionSyntax(String),
}

pub type Result<T> = std::result::Result<T, TypeError>;

/// An sRGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const RED: Color = Color::new(255, 0, 0);
    pub const BLUE: Color = Color::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from untyped integers, rejecting anything outside 0-255.
    pub fn from_components(r: i64, g: i64, b: i64) -> Result<Self> {
        Ok(Self {
            r: channel("r", r)?,
            g: channel("g", g)?,
            b: channel("b", b)?,
        })
    }

    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

fn channel(name: &'static str, value: i64) -> Result<u8> {
    u8::try_from(value).map_err(|_| TypeError::ColorOutOfRange {
        channel: name,
        value,
    })
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s.trim();
        if let Some(hex) = raw.strip_prefix('#') {
            if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(TypeError::ColorSyntax(s.to_string()));
            }
            let byte = |idx: usize| {
                u8::from_str_radix(&hex[idx..idx + 2], 16)
                    .map_err(|_| TypeError::ColorSyntax(s.to_string()))
            };
            return Ok(Self::new(byte(0)?, byte(2)?, byte(4)?));
        }

        let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(TypeError::ColorSyntax(s.to_string()));
        }
        let mut values = [0i64; 3];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| TypeError::ColorSyntax(s.to_string()))?;
        }
        Self::from_components(values[0], values[1], values[2])
    }
}

/// Everything needed for one batch run. Built once, never mutated while running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradientJob {
    /// Processing order is also progress order.
    pub images: Vec<PathBuf>,
    pub top: Color,
    pub bottom: Color,
    pub output_dir: PathBuf,
    pub resolution: ResolutionSpec,
}

impl GradientJob {
    pub fn new(
        images: Vec<PathBuf>,
        top: Color,
        bottom: Color,
        output_dir: impl Into<PathBuf>,
        resolution: ResolutionSpec,
    ) -> Self {
        Self {
            images,
            top,
            bottom,
            output_dir: output_dir.into(),
            resolution,
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Emitted once per finished image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
}

impl ProgressEvent {
    /// Progress after `completed` of `total` images, rounded half up.
    /// Returns `None` for an empty batch.
    pub fn for_completed(completed: usize, total: usize) -> Option<Self> {
        if total == 0 {
            return None;
        }
        let completed = completed.min(total);
        let percent = (completed as u64 * 200 + total as u64) / (total as u64 * 2);
        Some(Self {
            completed,
            total,
            percent: percent as u8,
        })
    }
}
