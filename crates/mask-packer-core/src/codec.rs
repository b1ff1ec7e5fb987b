//! Load/save boundary with the `image` codecs.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageReader, RgbaImage};

use crate::config::OutputFormat;
use crate::error::Result;

/// Decodes any supported image file into RGBA8.
pub fn load_rgba(path: &Path) -> Result<RgbaImage> {
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    Ok(img.to_rgba8())
}

/// Encodes `canvas` to `path`: PNG stored uncompressed and unfiltered, JPEG at quality 100
/// (alpha dropped).
pub fn save_page(path: &Path, canvas: &RgbaImage, format: OutputFormat) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        OutputFormat::Png => {
            let encoder = PngEncoder::new_with_quality(
                &mut writer,
                CompressionType::Uncompressed,
                FilterType::NoFilter,
            );
            canvas.write_with_encoder(encoder)?;
        }
        OutputFormat::Jpg => {
            let rgb = DynamicImage::ImageRgba8(canvas.clone()).to_rgb8();
            let encoder = JpegEncoder::new_with_quality(&mut writer, 100);
            rgb.write_with_encoder(encoder)?;
        }
    }
    writer.flush()?;
    Ok(())
}
