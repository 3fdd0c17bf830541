use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use image::{ImageFormat, RgbaImage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScreenshotError {
    #[error("frame buffer of {len} bytes does not match {width}x{height} RGBA")]
    BufferSize { width: u32, height: u32, len: usize },
    #[error("failed to encode screenshot: {0}")]
    Encode(#[from] image::ImageError),
    #[error("failed to write screenshot {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// `Screenshot_<unix millis>.png`.
pub(crate) fn screenshot_file_name(now: SystemTime) -> String {
    let millis = now
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or(0);
    format!("Screenshot_{millis}.png")
}

/// Encodes an RGBA8 frame as PNG under `dir`. The file only appears once it
/// is complete.
pub(crate) fn save_png(
    dir: &Path,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> Result<PathBuf, ScreenshotError> {
    let image = RgbaImage::from_raw(width, height, rgba.to_vec()).ok_or(
        ScreenshotError::BufferSize {
            width,
            height,
            len: rgba.len(),
        },
    )?;
    let mut encoded = Vec::new();
    image.write_to(&mut io::Cursor::new(&mut encoded), ImageFormat::Png)?;

    let path = dir.join(screenshot_file_name(SystemTime::now()));
    write_bytes_atomic(&path, &encoded).map_err(|source| ScreenshotError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn write_bytes_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("png.tmp");
    fs::write(&tmp_path, bytes)?;
    if let Err(error) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }
    Ok(())
}
