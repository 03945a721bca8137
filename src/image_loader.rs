//! PNG decoding into the quantizer's RGBA input.
//!
//! Palette, low-bit-depth and 16-bit images are normalized by the decoder
//! to 8 bits per channel; grey and RGB layouts are widened to RGBA here.

use std::io::Cursor;
use std::path::Path;

use stitch_quant::NormalizedImage;

use crate::error::ImageLoadError;

/// Read and decode a PNG file
pub fn load_png(path: &Path) -> Result<NormalizedImage, ImageLoadError> {
    let bytes = std::fs::read(path)?;
    let image = decode_png(&bytes)?;
    tracing::debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "Decoded PNG"
    );
    Ok(image)
}

/// Decode PNG bytes into straight (non-premultiplied) RGBA
pub fn decode_png(bytes: &[u8]) -> Result<NormalizedImage, ImageLoadError> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    let data = &buf[..info.buffer_size()];

    if info.bit_depth != png::BitDepth::Eight {
        return Err(ImageLoadError::Unsupported {
            color_type: info.color_type,
            bit_depth: info.bit_depth,
        });
    }

    let rgba: Vec<u8> = match info.color_type {
        png::ColorType::Rgba => data.to_vec(),
        png::ColorType::Rgb => data
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        png::ColorType::Grayscale => data.iter().flat_map(|&g| [g, g, g, 255]).collect(),
        png::ColorType::GrayscaleAlpha => data
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        other => {
            return Err(ImageLoadError::Unsupported {
                color_type: other,
                bit_depth: info.bit_depth,
            })
        }
    };

    Ok(NormalizedImage::new(info.width, info.height, rgba)?)
}
