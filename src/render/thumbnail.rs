use std::fs;
use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};

use super::IconRenderer;
use crate::error::{CacheError, Result};
use crate::models::RenderedIcon;

const FOLDER_COLOR: [u8; 3] = [0xE8, 0xB0, 0x3C];

/// Default renderer: real previews for image files, drawn glyphs for everything else
///
/// Output is premultiplied BGRA with rows stored top-down (negative height).
#[derive(Debug, Clone)]
pub struct ThumbnailRenderer {
    size: u32,
}

impl ThumbnailRenderer {
    pub fn new(size: u32) -> Self {
        Self { size: size.max(1) }
    }

    fn preview(&self, path: &Path) -> Option<RgbaImage> {
        ImageFormat::from_path(path).ok()?;
        match image::open(path) {
            Ok(img) => Some(img.thumbnail(self.size, self.size).to_rgba8()),
            Err(e) => {
                log::debug!("No preview for {}: {}", path.display(), e);
                None
            }
        }
    }

    fn glyph(&self, is_dir: bool, path: &Path) -> RgbaImage {
        let size = self.size;
        let margin = size / 8;
        let tab_height = (size / 8).max(1);
        let fill = if is_dir { FOLDER_COLOR } else { extension_color(path) };
        let edge = fill.map(|c| c / 2);

        RgbaImage::from_fn(size, size, |x, y| {
            let inside = x >= margin && x < size - margin && y >= margin && y < size - margin;
            if !inside {
                return Rgba([0, 0, 0, 0]);
            }
            if is_dir && y < margin + tab_height && x > size / 2 {
                return Rgba([0, 0, 0, 0]);
            }
            let border = x == margin || x == size - margin - 1 || y == margin || y == size - margin - 1;
            let [r, g, b] = if border { edge } else { fill };
            Rgba([r, g, b, 0xFF])
        })
    }
}

impl Default for ThumbnailRenderer {
    fn default() -> Self {
        Self::new(16)
    }
}

impl IconRenderer for ThumbnailRenderer {
    fn render(&self, path: &Path) -> Result<RenderedIcon> {
        // a dangling link still gets a glyph of its own
        let metadata = fs::metadata(path)
            .or_else(|_| fs::symlink_metadata(path))
            .map_err(|e| CacheError::render_failure(path, e))?;

        let image = match metadata.is_file().then(|| self.preview(path)).flatten() {
            Some(preview) => preview,
            None => self.glyph(metadata.is_dir(), path),
        };

        Ok(to_premultiplied_bgra(&image))
    }
}

/// Stable tint per lowercase extension
fn extension_color(path: &Path) -> [u8; 3] {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    // FNV-1a
    let hash = ext.bytes().fold(0x811c_9dc5u32, |h, b| (h ^ u32::from(b)).wrapping_mul(0x0100_0193));
    let [a, b, c, _] = hash.to_le_bytes();
    [0x40 | (a & 0x7F), 0x40 | (b & 0x7F), 0x40 | (c & 0x7F)]
}

fn to_premultiplied_bgra(image: &RgbaImage) -> RenderedIcon {
    let mut pixels = Vec::with_capacity(image.as_raw().len());
    for Rgba([r, g, b, a]) in image.pixels() {
        let premultiply = |c: u8| ((u16::from(c) * u16::from(*a) + 127) / 255) as u8;
        pixels.extend_from_slice(&[premultiply(*b), premultiply(*g), premultiply(*r), *a]);
    }

    RenderedIcon {
        pixels,
        width: image.width() as i32,
        height: -(image.height() as i32),
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::storage::bitmap::pixel_byte_count_for;

    #[test]
    fn test_missing_path_is_render_failure() {
        let temp_dir = TempDir::new().unwrap();
        let result = ThumbnailRenderer::default().render(&temp_dir.path().join("gone.lnk"));
        assert!(matches!(result, Err(CacheError::IconRenderFailure { .. })));
    }

    #[test]
    #[cfg(unix)]
    fn test_dangling_symlink_gets_glyph() {
        let temp_dir = TempDir::new().unwrap();
        let link = temp_dir.path().join("link.lnk");
        std::os::unix::fs::symlink(temp_dir.path().join("nowhere"), &link).unwrap();

        let icon = ThumbnailRenderer::new(8).render(&link).unwrap();
        assert_eq!(icon.width, 8);
        assert_eq!(icon.height, -8);
    }

    #[test]
    fn test_plain_file_gets_glyph_of_configured_size() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tool.lnk");
        fs::write(&path, b"shortcut").unwrap();

        let icon = ThumbnailRenderer::new(24).render(&path).unwrap();
        assert_eq!(icon.width, 24);
        assert_eq!(icon.height, -24);
        assert_eq!(Some(icon.pixels.len()), pixel_byte_count_for(24, -24));
    }

    #[test]
    fn test_directory_glyph_differs_from_file_glyph() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("sub");
        fs::create_dir(&dir).unwrap();
        let file = temp_dir.path().join("sub.txt");
        fs::write(&file, b"x").unwrap();

        let renderer = ThumbnailRenderer::default();
        assert_ne!(renderer.render(&dir).unwrap(), renderer.render(&file).unwrap());
    }

    #[test]
    fn test_image_file_is_scaled_down() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("photo.png");
        RgbaImage::from_pixel(64, 32, Rgba([255, 0, 0, 255])).save(&path).unwrap();

        let icon = ThumbnailRenderer::new(16).render(&path).unwrap();
        assert_eq!(icon.width, 16);
        assert_eq!(icon.height, -8);
        // opaque red in BGRA order
        assert_eq!(&icon.pixels[..4], &[0, 0, 255, 255]);
    }

    #[test]
    fn test_undecodable_image_falls_back_to_glyph() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.png");
        fs::write(&path, b"not a png").unwrap();

        let icon = ThumbnailRenderer::new(8).render(&path).unwrap();
        assert_eq!(icon.width, 8);
    }

    #[test]
    fn test_premultiplied_alpha() {
        let image = RgbaImage::from_pixel(1, 1, Rgba([200, 100, 50, 0]));
        let icon = to_premultiplied_bgra(&image);
        assert_eq!(icon.pixels, vec![0, 0, 0, 0]);
    }
}
