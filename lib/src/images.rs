//! Flattens transparency out of images and recompresses them as PNG.
//!
//! Files keep their names, so a `.jpg` may hold PNG data afterwards. Formats
//! are sniffed from file contents, not extensions, which keeps reruns working.

use std::path::Path;

use image::{DynamicImage, ImageReader, Rgb, RgbImage, Rgba, ImageBuffer};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};

use crate::error::{Result, Chainable};
use crate::listing::Listing;
use crate::settings::Settings;
use crate::value::Sink;

#[derive(Debug, Clone)]
pub struct Normalizer {
    background: [u8; 3],
    extensions: Vec<String>,
}

/// Counts from one [`Normalizer::normalize_dir()`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Batch {
    pub processed: usize,
    pub failed: usize,
}

impl Normalizer {
    pub fn new(settings: &Settings) -> Self {
        Normalizer {
            background: settings.background,
            extensions: settings.extensions.iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// Whether `path` has one of the configured extensions, ignoring case.
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .map_or(false, |ext| self.extensions.contains(&ext))
    }

    /// Normalizes every matching file in `dir` in file name order. A file that
    /// fails is reported to `progress` and the batch moves on.
    pub fn normalize_dir<F>(&self, dir: &Path, mut progress: F) -> Result<Batch>
        where F: FnMut(&Path, &Result<()>)
    {
        let listing = Listing::read(dir)?;
        let mut batch = Batch::default();
        for entry in listing.iter().filter(|e| self.matches(&e.path)) {
            let result = self.normalize_file(&entry.path);
            if let Err(e) = &result {
                tracing::debug!(file = %entry.file_name, "normalization failed: {}", e.message());
                batch.failed += 1;
            }

            progress(&entry.path, &result);
            batch.processed += 1;
        }

        Ok(batch)
    }

    /// Rewrites `path` as an opaque, maximally compressed PNG. The original
    /// is only replaced once the new file is completely written.
    pub fn normalize_file(&self, path: &Path) -> Result<()> {
        let image = ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(image::ImageError::IoError)
            .and_then(|reader| reader.decode())
            .chain_with(|| error! {
                "failed to decode image",
                "file path" => path.display(),
            })?;

        let flat = flatten(image, self.background);
        path.write_with(|out| {
            let encoder = PngEncoder::new_with_quality(out, CompressionType::Best, FilterType::Adaptive);
            Ok(flat.write_with_encoder(encoder)?)
        }).chain_with(|| error! {
            "failed to write image",
            "file path" => path.display(),
        })
    }
}

/// Removes the alpha channel of `image` by compositing it over `background`.
/// Images without alpha are only converted to RGB. Sources wider than 8 bits
/// per channel come out as 16-bit RGB, everything else as 8-bit RGB.
pub fn flatten(image: DynamicImage, background: [u8; 3]) -> DynamicImage {
    let color = image.color();
    let wide = color.bytes_per_pixel() / color.channel_count() > 1;
    match (color.has_alpha(), wide) {
        (false, false) => match image {
            DynamicImage::ImageRgb8(_) => image,
            image => DynamicImage::ImageRgb8(image.into_rgb8()),
        },
        (false, true) => match image {
            DynamicImage::ImageRgb16(_) => image,
            image => DynamicImage::ImageRgb16(image.into_rgb16()),
        },
        (true, false) => {
            let rgba = image.into_rgba8();
            let mut out = RgbImage::new(rgba.width(), rgba.height());
            for (Rgba([r, g, b, a]), Rgb(dst)) in rgba.pixels().zip(out.pixels_mut()) {
                let blend = |c: u8, bg: u8| {
                    let (c, bg, a) = (c as u32, bg as u32, *a as u32);
                    ((c * a + bg * (255 - a) + 127) / 255) as u8
                };

                *dst = [blend(*r, background[0]), blend(*g, background[1]), blend(*b, background[2])];
            }

            DynamicImage::ImageRgb8(out)
        }
        (true, true) => {
            let rgba = image.into_rgba16();
            let mut out = ImageBuffer::<Rgb<u16>, Vec<u16>>::new(rgba.width(), rgba.height());
            for (Rgba([r, g, b, a]), Rgb(dst)) in rgba.pixels().zip(out.pixels_mut()) {
                let blend = |c: u16, bg: u8| {
                    let (c, bg, a) = (c as u64, bg as u64 * 257, *a as u64);
                    ((c * a + bg * (65535 - a) + 32767) / 65535) as u16
                };

                *dst = [blend(*r, background[0]), blend(*g, background[1]), blend(*b, background[2])];
            }

            DynamicImage::ImageRgb16(out)
        }
    }
}

#[cfg(test)]
mod images_tests {
    use std::fs;

    use image::{ColorType, GrayImage, Luma, RgbaImage, ImageFormat};

    use super::*;

    const WHITE: [u8; 3] = [255, 255, 255];

    fn normalizer() -> Normalizer {
        Normalizer::new(&Settings::default())
    }

    fn transparent_png(path: &Path) {
        let mut image = RgbaImage::from_pixel(4, 3, Rgba([200, 10, 10, 255]));
        image.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        image.put_pixel(1, 0, Rgba([0, 0, 0, 128]));
        image.save(path).unwrap();
    }

    #[test]
    fn flatten_composites_onto_background() {
        let mut image = RgbaImage::from_pixel(3, 1, Rgba([0, 0, 0, 0]));
        image.put_pixel(1, 0, Rgba([0, 0, 0, 128]));
        image.put_pixel(2, 0, Rgba([12, 34, 56, 255]));

        let flat = flatten(DynamicImage::ImageRgba8(image), WHITE);
        assert_eq!(flat.color(), ColorType::Rgb8);
        let rgb = flat.into_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(rgb.get_pixel(1, 0).0, [127, 127, 127]);
        assert_eq!(rgb.get_pixel(2, 0).0, [12, 34, 56]);

        let black = flatten(DynamicImage::ImageRgba8(RgbaImage::new(1, 1)), [0, 0, 0]);
        assert_eq!(black.into_rgb8().get_pixel(0, 0).0, [0, 0, 0]);
    }

    #[test]
    fn flatten_converts_opaque_modes_and_keeps_depth() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(1, 1, Luma([7])));
        let flat = flatten(gray, WHITE);
        assert_eq!(flat.color(), ColorType::Rgb8);
        assert_eq!(flat.into_rgb8().get_pixel(0, 0).0, [7, 7, 7]);

        let deep = ImageBuffer::<Rgba<u16>, Vec<u16>>::from_pixel(1, 1, Rgba([1000, 0, 65535, 0]));
        let flat = flatten(DynamicImage::ImageRgba16(deep), [0, 0, 0]);
        assert_eq!(flat.color(), ColorType::Rgb16);
        assert_eq!(flat.into_rgb16().get_pixel(0, 0).0, [0, 0, 0]);
    }

    #[test]
    fn normalized_png_is_opaque_and_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.png");
        transparent_png(&path);

        normalizer().normalize_file(&path).unwrap();
        let first = fs::read(&path).unwrap();
        let decoded = image::load_from_memory_with_format(&first, ImageFormat::Png).unwrap();
        assert!(!decoded.color().has_alpha());
        assert_eq!(decoded.into_rgb8().get_pixel(0, 0).0, WHITE);

        normalizer().normalize_file(&path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), first);
    }

    #[test]
    fn other_extensions_are_rewritten_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.JPG");
        RgbImage::from_pixel(8, 8, Rgb([90, 120, 150])).save_with_format(&path, ImageFormat::Jpeg).unwrap();

        normalizer().normalize_file(&path).unwrap();
        let bytes = fs::read(&path).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Png);

        normalizer().normalize_file(&path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), bytes);
    }

    #[test]
    fn corrupt_files_are_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"definitely not a png").unwrap();

        let error = normalizer().normalize_file(&path).unwrap_err();
        assert_eq!(error.message(), "failed to decode image");
        assert_eq!(fs::read(&path).unwrap(), b"definitely not a png");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn directory_batches_continue_past_failures() {
        let dir = tempfile::tempdir().unwrap();
        transparent_png(&dir.path().join("b.png"));
        fs::write(dir.path().join("a.webp"), b"garbage").unwrap();
        fs::write(dir.path().join("notes.txt"), b"not an image").unwrap();

        let mut seen = vec![];
        let batch = normalizer().normalize_dir(dir.path(), |path, result| {
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            seen.push((name, result.is_ok()));
        }).unwrap();

        assert_eq!(batch, Batch { processed: 2, failed: 1 });
        assert_eq!(seen, [("a.webp".to_string(), false), ("b.png".to_string(), true)]);
        assert_eq!(fs::read(dir.path().join("notes.txt")).unwrap(), b"not an image");
    }

    #[test]
    fn empty_directories_process_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let batch = normalizer().normalize_dir(dir.path(), |_, _| unreachable!()).unwrap();
        assert_eq!(batch.processed, 0);
    }

    #[test]
    fn extension_matching_ignores_case() {
        let normalizer = Normalizer::new(&Settings {
            extensions: vec![".PNG".into(), "tiff".into()],
            ..Settings::default()
        });

        assert!(normalizer.matches(Path::new("a.png")));
        assert!(normalizer.matches(Path::new("b.TIFF")));
        assert!(!normalizer.matches(Path::new("c.jpg")));
        assert!(!normalizer.matches(Path::new("png")));
        assert!(!normalizer.matches(Path::new("d.png.tmp")));
    }
}
