//! Decoding inputs into premultiplied 8-bit RGBA grids and encoding diff images as PNG.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ColorType, ImageError, ImageFormat, RgbaImage};
use tracing::{debug, warn};

use crate::DiffError;
use crate::channel;

/// Decode an image file into a premultiplied 8-bit RGBA grid.
///
/// The format is sniffed from the content, so any format the `image` crate
/// was built with works (PNG and JPEG at least).
pub fn load(path: &Path) -> Result<RgbaImage, DiffError> {
    load_with_color(path).map(|(grid, _)| grid)
}

/// Decode both inputs of a comparison.
///
/// Inputs with different color models are normalized to 8-bit RGBA and
/// compared anyway.
pub fn load_pair(first: &Path, second: &Path) -> Result<(RgbaImage, RgbaImage), DiffError> {
    let (left, left_color) = load_with_color(first)?;
    let (right, right_color) = load_with_color(second)?;
    if left_color != right_color {
        warn!(
            first = ?left_color,
            second = ?right_color,
            "color models differ; comparing as 8-bit RGBA"
        );
    }
    Ok((left, right))
}

fn load_with_color(path: &Path) -> Result<(RgbaImage, ColorType), DiffError> {
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            DiffError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            DiffError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let decoded = image::load_from_memory(&bytes).map_err(|source| DiffError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let color = decoded.color();
    debug!(
        path = %path.display(),
        width = decoded.width(),
        height = decoded.height(),
        ?color,
        "decoded image"
    );
    Ok((channel::normalize(decoded), color))
}

/// Decode in-memory image bytes into an 8-bit RGBA grid.
pub fn decode(bytes: &[u8]) -> Result<RgbaImage, DiffError> {
    let decoded = image::load_from_memory(bytes).map_err(DiffError::DecodeBuffer)?;
    Ok(channel::normalize(decoded))
}

/// Encode a grid as PNG bytes.
pub fn encode_png(grid: &RgbaImage) -> Result<Vec<u8>, DiffError> {
    let mut png = Vec::new();
    grid.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(DiffError::EncodeBuffer)?;
    Ok(png)
}

/// Write a grid to `path` as PNG, creating parent directories as needed.
pub fn save_png(path: &Path, grid: &RgbaImage) -> Result<(), DiffError> {
    let encode_err = |source: ImageError| DiffError::Encode {
        path: PathBuf::from(path),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| encode_err(ImageError::IoError(e)))?;
    }
    grid.save_with_format(path, ImageFormat::Png).map_err(encode_err)?;
    debug!(path = %path.display(), "wrote diff image");
    Ok(())
}
