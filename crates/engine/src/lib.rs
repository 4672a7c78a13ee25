use image::imageops::FilterType;
use image::RgbaImage;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub mod batch;
mod compositor;

pub use batch::{
    spawn_batch, BatchCallbacks, BatchError, BatchHandle, BatchReport, BatchRunner,
    CancellationFlag, CompletionCallback, ProgressCallback,
};
pub use compositor::gradient_row_color;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Decode error for {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    #[error("Invalid resolution {width}x{height}: dimensions must be positive")]
    InvalidResolution { width: u32, height: u32 },

    #[error("Write error for {}: {message}", path.display())]
    Write { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Loads, overlays and saves single images. Holds only the resampling filter,
/// so it is cheap to clone into worker threads.
#[derive(Debug, Clone, Copy)]
pub struct ImageEngine {
    filter: FilterType,
}

impl Default for ImageEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageEngine {
    pub fn new() -> Self {
        Self::with_filter(FilterType::CatmullRom)
    }

    pub fn with_filter(filter: FilterType) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> FilterType {
        self.filter
    }

    /// Decode a file into RGBA8. Sources without alpha come back fully opaque.
    pub fn load_rgba<P: AsRef<Path>>(&self, path: P) -> Result<RgbaImage> {
        let path = path.as_ref();
        let dyn_img = image::open(path).map_err(|e| EngineError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!(
            "decoded {} ({}x{}, {:?})",
            path.display(),
            dyn_img.width(),
            dyn_img.height(),
            dyn_img.color()
        );
        Ok(dyn_img.to_rgba8())
    }

    /// Encode `image` to `path`; the format follows the file extension.
    pub fn save<P: AsRef<Path>>(&self, image: &RgbaImage, path: P) -> Result<()> {
        let path = path.as_ref();
        image.save(path).map_err(|e| EngineError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn prepare_output_dir<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| EngineError::Write {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Where the overlay of `source` lands: `output_dir` plus the source's base name.
/// Sources sharing a base name map to the same output file.
pub fn output_path_for(output_dir: &Path, source: &Path) -> Result<PathBuf> {
    let filename = source.file_name().ok_or_else(|| EngineError::Write {
        path: source.to_path_buf(),
        message: "source path has no file name".to_string(),
    })?;
    Ok(output_dir.join(filename))
}
