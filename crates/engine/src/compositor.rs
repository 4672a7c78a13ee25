use core_types::{Color, ResolutionSpec};
use image::imageops;
use image::RgbaImage;

use crate::{EngineError, ImageEngine, Result};

impl ImageEngine {
    /// Overlay a top-to-bottom gradient on every pixel that is not fully transparent.
    ///
    /// The source is first resized to the resolved dimensions. Visible pixels get
    /// their RGB replaced by the row's gradient color and keep their alpha;
    /// pixels with alpha 0 are copied through untouched.
    pub fn composite(
        &self,
        source: &RgbaImage,
        top: Color,
        bottom: Color,
        resolution: ResolutionSpec,
    ) -> Result<RgbaImage> {
        let (native_width, native_height) = source.dimensions();
        if native_width == 0 || native_height == 0 {
            return Err(EngineError::InvalidResolution {
                width: native_width,
                height: native_height,
            });
        }

        let (width, height) = resolution.resolve(native_width, native_height);
        if width == 0 || height == 0 || !fits_allocation_limit(native_width, width, height) {
            return Err(EngineError::InvalidResolution { width, height });
        }

        let mut out = if (width, height) == (native_width, native_height) {
            source.clone()
        } else {
            imageops::resize(source, width, height, self.filter)
        };

        for (row, pixels) in out.rows_mut().enumerate() {
            let [r, g, b] = gradient_row_color(top, bottom, row as u32, height).channels();
            for pixel in pixels {
                if pixel[3] > 0 {
                    pixel[0] = r;
                    pixel[1] = g;
                    pixel[2] = b;
                }
            }
        }

        Ok(out)
    }
}

/// Resizing needs the RGBA8 output plus an f32 RGBA buffer of
/// `native_width x height`; both must stay under the decoder's default allocation cap.
fn fits_allocation_limit(native_width: u32, width: u32, height: u32) -> bool {
    let cap = image::Limits::default().max_alloc.unwrap_or(u64::MAX);
    let output = u64::from(width) * u64::from(height) * 4;
    let intermediate = u64::from(native_width) * u64::from(height) * 16;
    output <= cap && intermediate <= cap
}

/// Gradient color of `row` in an image `height` rows tall.
///
/// Row 0 is exactly `top`; the ratio `row / height` never reaches 1, so the last
/// row stops one step short of `bottom`. Channels are truncated, not rounded.
pub fn gradient_row_color(top: Color, bottom: Color, row: u32, height: u32) -> Color {
    let t = if height == 0 {
        0.0
    } else {
        f64::from(row) / f64::from(height)
    };
    let mix = |a: u8, b: u8| (f64::from(a) * (1.0 - t) + f64::from(b) * t) as u8;
    Color::new(mix(top.r, bottom.r), mix(top.g, bottom.g), mix(top.b, bottom.b))
}
