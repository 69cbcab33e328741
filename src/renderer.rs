// ============================================================================
// renderer.rs — Icon rendering and PNG output
// ============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, ImageError, ImageReader, RgbaImage};
use sha2::{Digest, Sha256};

use crate::config::IconSpec;
use crate::error::{IconError, IconResult};
use crate::utils::ensure_directory_exists;

/// Produces the pixels of one icon. Implementations must return an image
/// of exactly `spec.width` x `spec.height`.
pub trait IconRenderer: Sync {
    fn render(&self, spec: &IconSpec) -> IconResult<RgbaImage>;

    /// Short label for console output.
    fn describe(&self) -> String;
}

/// Resizes a source image from disk.
pub struct ResizeRenderer {
    source: PathBuf,
}

impl ResizeRenderer {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Decodes the source and normalizes it to RGBA8 so transparency survives.
    fn load(&self) -> IconResult<RgbaImage> {
        let decode_err = |source: ImageError| IconError::DecodeFailure {
            path: self.source.clone(),
            source,
        };
        let image = ImageReader::open(&self.source)
            .map_err(|e| decode_err(ImageError::IoError(e)))?
            .with_guessed_format()
            .map_err(|e| decode_err(ImageError::IoError(e)))?
            .decode()
            .map_err(decode_err)?;
        Ok(image.to_rgba8())
    }
}

impl IconRenderer for ResizeRenderer {
    fn render(&self, spec: &IconSpec) -> IconResult<RgbaImage> {
        let rgba = self.load()?;
        if rgba.dimensions() == (spec.width, spec.height) {
            return Ok(rgba);
        }
        // Exact target size: no aspect-ratio preservation, no padding.
        Ok(imageops::resize(&rgba, spec.width, spec.height, FilterType::Lanczos3))
    }

    fn describe(&self) -> String {
        format!("resize {}", self.source.display())
    }
}

/// What ended up on disk for one icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconOutput {
    pub path: PathBuf,
    pub bytes: u64,
    /// Hex SHA-256 of the written file.
    pub sha256: String,
}

/// Encodes `image` as a maximally compressed PNG (lossless) and writes it
/// to `dest`, replacing any existing file. The bytes go to a sibling temp
/// file first and are renamed over `dest`, so a failed write never leaves a
/// truncated icon behind.
pub fn write_png(image: &RgbaImage, dest: &Path) -> IconResult<IconOutput> {
    let mut buf = Vec::new();
    PngEncoder::new_with_quality(&mut buf, CompressionType::Best, PngFilter::Adaptive)
        .write_image(image.as_raw(), image.width(), image.height(), ExtendedColorType::Rgba8)
        .map_err(|source| IconError::Encode {
            path: dest.to_path_buf(),
            source,
        })?;

    let write_err = |source: std::io::Error| IconError::WriteFailure {
        path: dest.to_path_buf(),
        source,
    };
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_directory_exists(parent).map_err(write_err)?;
    }
    let staging = staging_path(dest);
    if let Err(e) = fs::write(&staging, &buf).and_then(|_| fs::rename(&staging, dest)) {
        let _ = fs::remove_file(&staging);
        return Err(write_err(e));
    }

    Ok(IconOutput {
        path: dest.to_path_buf(),
        bytes: buf.len() as u64,
        sha256: hex::encode(Sha256::digest(&buf)),
    })
}

/// `dir/.name.tmp` next to `dest`, on the same filesystem so the rename is atomic.
fn staging_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.with_file_name(format!(".{}.tmp", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba};

    fn save_source(dir: &Path, name: &str, image: &RgbaImage) -> PathBuf {
        let path = dir.join(name);
        image.save(&path).unwrap();
        path
    }

    #[test]
    fn test_resize_hits_exact_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let source = save_source(dir.path(), "wide.png", &RgbaImage::from_pixel(300, 120, Rgba([10, 20, 30, 255])));
        let renderer = ResizeRenderer::new(source);

        for (w, h) in [(192, 192), (512, 512), (180, 180), (64, 32)] {
            let icon = renderer.render(&IconSpec::new("x.png", w, h)).unwrap();
            assert_eq!(icon.dimensions(), (w, h));
        }
    }

    #[test]
    fn test_transparency_survives_resize() {
        let dir = tempfile::tempdir().unwrap();
        // Left half fully transparent, right half opaque.
        let source = RgbaImage::from_fn(64, 64, |x, _| {
            if x < 32 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([200, 50, 50, 255])
            }
        });
        let path = save_source(dir.path(), "half.png", &source);
        let icon = ResizeRenderer::new(path).render(&IconSpec::square("x.png", 32)).unwrap();

        let out = dir.path().join("out.png");
        write_png(&icon, &out).unwrap();
        let decoded = image::open(&out).unwrap();
        assert_eq!(decoded.dimensions(), (32, 32));
        assert!(decoded.get_pixel(2, 16)[3] < 255);
        assert_eq!(decoded.get_pixel(29, 16)[3], 255);
    }

    #[test]
    fn test_rgb_source_gets_alpha_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgb.png");
        image::RgbImage::from_pixel(40, 40, image::Rgb([1, 2, 3])).save(&path).unwrap();

        let icon = ResizeRenderer::new(path).render(&IconSpec::square("x.png", 20)).unwrap();
        let out = dir.path().join("out.png");
        write_png(&icon, &out).unwrap();
        assert_eq!(image::open(&out).unwrap().color(), image::ColorType::Rgba8);
    }

    #[test]
    fn test_corrupt_source_is_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        fs::write(&path, b"definitely not an image").unwrap();

        let err = ResizeRenderer::new(&path).render(&IconSpec::square("x.png", 16)).unwrap_err();
        assert!(matches!(err, IconError::DecodeFailure { .. }));
    }

    #[test]
    fn test_missing_source_is_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = ResizeRenderer::new(dir.path().join("gone.png"))
            .render(&IconSpec::square("x.png", 16))
            .unwrap_err();
        assert!(matches!(err, IconError::DecodeFailure { .. }));
    }

    #[test]
    fn test_write_png_reports_size_and_digest() {
        let dir = tempfile::tempdir().unwrap();
        let image = RgbaImage::from_pixel(16, 16, Rgba([255, 0, 0, 128]));
        let out = dir.path().join("nested").join("icon.png");

        let first = write_png(&image, &out).unwrap();
        assert_eq!(first.bytes, fs::metadata(&out).unwrap().len());
        assert_eq!(first.sha256.len(), 64);

        let second = write_png(&image, &out).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unwritable_destination_is_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("icon.png");
        fs::create_dir(&out).unwrap();

        let err = write_png(&RgbaImage::new(4, 4), &out).unwrap_err();
        assert!(matches!(err, IconError::WriteFailure { .. }));
        assert!(!staging_path(&out).exists());
    }

    #[test]
    fn test_write_png_replaces_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("icon.png");
        fs::write(&out, b"stale bytes from an older run").unwrap();

        let written = write_png(&RgbaImage::from_pixel(8, 8, Rgba([0, 128, 255, 255])), &out).unwrap();
        assert_eq!(fs::read(&out).unwrap().len() as u64, written.bytes);
        assert_eq!(image::image_dimensions(&out).unwrap(), (8, 8));

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["icon.png".to_string()]);
    }

    #[test]
    fn test_failed_rename_keeps_existing_target() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("icon.png");
        // Occupy the target with a non-empty directory so the rename fails.
        fs::create_dir(&out).unwrap();
        fs::write(out.join("keep.txt"), b"keep").unwrap();

        assert!(write_png(&RgbaImage::new(4, 4), &out).is_err());
        assert_eq!(fs::read(out.join("keep.txt")).unwrap(), b"keep");
        assert!(!staging_path(&out).exists());
    }
}
