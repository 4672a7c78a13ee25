use core_types::{Color, ResolutionSpec};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppSettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings path unavailable")]
    MissingSettingsPath,

    #[error("Unknown resample filter '{0}' (expected nearest, triangle, catmull-rom, gaussian or lanczos3)")]
    UnknownFilter(String),
}

pub type Result<T> = std::result::Result<T, AppSettingsError>;

/// Resampling used when an image has to change size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    #[default]
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl ResampleFilter {
    pub const ALL: [ResampleFilter; 5] = [
        Self::Nearest,
        Self::Triangle,
        Self::CatmullRom,
        Self::Gaussian,
        Self::Lanczos3,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Triangle => "triangle",
            Self::CatmullRom => "catmull-rom",
            Self::Gaussian => "gaussian",
            Self::Lanczos3 => "lanczos3",
        }
    }
}

impl fmt::Display for ResampleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResampleFilter {
    type Err = AppSettingsError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|filter| filter.as_str() == wanted)
            .ok_or_else(|| AppSettingsError::UnknownFilter(s.to_string()))
    }
}

/// Choices remembered between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub last_output_dir: Option<PathBuf>,
    pub top: Color,
    pub bottom: Color,
    pub resolution: ResolutionSpec,
    pub resample: ResampleFilter,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            last_output_dir: None,
            top: Color::RED,
            bottom: Color::BLUE,
            resolution: ResolutionSpec::Original,
            resample: ResampleFilter::default(),
        }
    }
}

impl AppSettings {
    pub fn load() -> Result<Self> {
        load_impl()
    }

    pub fn save(&self) -> Result<()> {
        save_impl(self)
    }

    /// Read settings from an explicit file; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(self)?;
        std::fs::write(path, payload)?;
        Ok(())
    }

    pub fn get_last_output_dir(&self) -> Option<PathBuf> {
        self.last_output_dir.clone()
    }

    pub fn set_last_output_dir(&mut self, path: PathBuf) {
        self.last_output_dir = Some(path);
    }

    pub fn set_colors(&mut self, top: Color, bottom: Color) {
        self.top = top;
        self.bottom = bottom;
    }
}

#[cfg(target_os = "windows")]
fn load_impl() -> Result<AppSettings> {
    use winreg::enums::{HKEY_CURRENT_USER, KEY_READ};
    use winreg::RegKey;

    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    let key = hkcu
        .open_subkey_with_flags("Software\\MiniGradient", KEY_READ)
        .ok();

    if let Some(key) = key {
        if let Ok(payload) = key.get_value::<String, _>("Settings") {
            return Ok(serde_json::from_str(&payload)?);
        }
    }

    Ok(AppSettings::default())
}

#[cfg(target_os = "windows")]
fn save_impl(settings: &AppSettings) -> Result<()> {
    use winreg::enums::{HKEY_CURRENT_USER, KEY_WRITE};
    use winreg::RegKey;

    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    let (key, _) = hkcu.create_subkey_with_flags("Software\\MiniGradient", KEY_WRITE)?;
    let payload = serde_json::to_string(settings)?;
    key.set_value("Settings", &payload)?;
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn load_impl() -> Result<AppSettings> {
    AppSettings::load_from(&settings_file_path()?)
}

#[cfg(not(target_os = "windows"))]
fn save_impl(settings: &AppSettings) -> Result<()> {
    settings.save_to(&settings_file_path()?)
}

#[cfg(not(target_os = "windows"))]
fn settings_file_path() -> Result<PathBuf> {
    use directories::ProjectDirs;

    let dirs = ProjectDirs::from("com", "MiniGradient", "MiniGradient")
        .ok_or(AppSettingsError::MissingSettingsPath)?;
    let mut path = dirs.config_dir().to_path_buf();
    path.push("settings.json");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_are_red_to_blue_at_original_size() {
        let settings = AppSettings::default();
        assert_eq!(settings.top, Color::new(255, 0, 0));
        assert_eq!(settings.bottom, Color::new(0, 0, 255));
        assert!(settings.resolution.is_original());
        assert_eq!(settings.resample, ResampleFilter::CatmullRom);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let loaded = AppSettings::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, AppSettings::default());
    }

    #[test]
    fn save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = AppSettings::default();
        settings.set_last_output_dir(PathBuf::from("/tmp/gradients"));
        settings.set_colors(Color::new(1, 2, 3), Color::new(4, 5, 6));
        settings.resolution = ResolutionSpec::custom(1280, 720).unwrap();
        settings.resample = ResampleFilter::Lanczos3;
        settings.save_to(&path).unwrap();

        let loaded = AppSettings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(
            loaded.get_last_output_dir(),
            Some(PathBuf::from("/tmp/gradients"))
        );
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "resolution": "800x600", "resample": "nearest" }"#).unwrap();

        let loaded = AppSettings::load_from(&path).unwrap();
        assert_eq!(loaded.resolution, ResolutionSpec::custom(800, 600).unwrap());
        assert_eq!(loaded.resample, ResampleFilter::Nearest);
        assert_eq!(loaded.top, Color::RED);
    }

    #[test]
    fn invalid_resolution_in_file_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "resolution": "0x600" }"#).unwrap();

        assert!(matches!(
            AppSettings::load_from(&path),
            Err(AppSettingsError::Json(_))
        ));
    }

    #[test]
    fn filter_names_parse() {
        for filter in ResampleFilter::ALL {
            assert_eq!(filter.to_string().parse::<ResampleFilter>().unwrap(), filter);
        }
        assert!(" Lanczos3 ".parse::<ResampleFilter>().is_ok());
        assert!(matches!(
            "bilinear".parse::<ResampleFilter>(),
            Err(AppSettingsError::UnknownFilter(_))
        ));
    }
}
