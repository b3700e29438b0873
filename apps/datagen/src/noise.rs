//! Noisy-variant augmentation for clean page images.
//!
//! Each variant gets its own seeded generator, derived from the base noise seed
//! and the record's sequence index, so a variant is the same no matter which
//! order images are processed in.

use std::path::Path;

use image::{imageops, Rgb, RgbImage};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::errors::PipelineError;
use crate::identity;

const MAX_ROTATION_DEG: f32 = 2.0;
const BLUR_PROBABILITY: f64 = 0.5;
const BLUR_SIGMA: f32 = 1.0;
const NOISE_STDDEV: f64 = 10.0;
const MAX_JITTER: f32 = 0.1;
const FILL: Rgb<u8> = Rgb([255, 255, 255]);

/// Seed for one image's variant. Names without a full identity share the base
/// seed.
pub fn variant_seed(noise_seed: u64, image_path: &Path) -> u64 {
    match identity::parse(image_path).identity() {
        Some(identity) => noise_seed ^ u64::from(identity.sequence_index()),
        None => {
            warn!(
                image = %image_path.display(),
                "No artifact identity in image name; using the base noise seed"
            );
            noise_seed
        }
    }
}

/// Applies rotation, optional blur, additive Gaussian noise and contrast and
/// brightness jitter. Output has the same dimensions as the input.
pub fn augment(image: &RgbImage, seed: u64) -> RgbImage {
    let mut rng = StdRng::seed_from_u64(seed);

    let angle = rng.gen_range(-MAX_ROTATION_DEG..=MAX_ROTATION_DEG);
    let mut out = rotate_about_center(image, angle.to_radians(), Interpolation::Bilinear, FILL);

    if rng.gen_bool(BLUR_PROBABILITY) {
        out = imageops::blur(&out, BLUR_SIGMA);
    }

    out = imageproc::noise::gaussian_noise(&out, 0.0, NOISE_STDDEV, rng.gen());

    // imageops::contrast takes a percentage whose square scales the spread.
    let contrast_factor = rng.gen_range(1.0 - MAX_JITTER..=1.0 + MAX_JITTER);
    out = imageops::contrast(&out, (contrast_factor.sqrt() - 1.0) * 100.0);

    let brightness = rng.gen_range(1.0 - MAX_JITTER..=1.0 + MAX_JITTER);
    for pixel in out.pixels_mut() {
        for channel in pixel.0.iter_mut() {
            *channel = (f32::from(*channel) * brightness).round().clamp(0.0, 255.0) as u8;
        }
    }

    out
}

/// Reads `clean`, writes its augmented variant to `noisy`. Blocking.
pub fn write_noisy_variant(clean: &Path, noisy: &Path, seed: u64) -> Result<(), PipelineError> {
    let image = image::open(clean)?.to_rgb8();
    if image.width() == 0 || image.height() == 0 {
        return Err(PipelineError::UnusableImage {
            width: image.width(),
            height: image.height(),
        });
    }
    augment(&image, seed).save(noisy)?;
    debug!(clean = %clean.display(), noisy = %noisy.display(), seed, "Wrote noisy variant");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> RgbImage {
        RgbImage::from_fn(64, 48, |x, y| {
            if (x / 8 + y / 8) % 2 == 0 {
                Rgb([20, 20, 20])
            } else {
                Rgb([240, 240, 240])
            }
        })
    }

    #[test]
    fn test_augment_keeps_dimensions() {
        let out = augment(&page(), 7);
        assert_eq!(out.dimensions(), (64, 48));
    }

    #[test]
    fn test_augment_is_reproducible_per_seed() {
        let a = augment(&page(), 11);
        let b = augment(&page(), 11);
        assert_eq!(a.as_raw(), b.as_raw());
        assert_ne!(augment(&page(), 12).as_raw(), a.as_raw());
    }

    #[test]
    fn test_variant_seed_depends_on_sequence_index() {
        let a = variant_seed(7, Path::new("resume_0001_t03.png"));
        let b = variant_seed(7, Path::new("resume_0002_t03.png"));
        assert_ne!(a, b);
        assert_eq!(a, 7 ^ 1);
    }

    #[test]
    fn test_variant_seed_without_identity_uses_base_seed() {
        assert_eq!(variant_seed(7, Path::new("scan.png")), 7);
        assert_eq!(variant_seed(7, Path::new("scan_t05.png")), 7);
        assert_eq!(variant_seed(7, Path::new("resume_0003_t00.png")), 7);
    }

    #[test]
    fn test_write_noisy_variant_same_name_other_dir() {
        let dir = tempfile::tempdir().unwrap();
        let clean = dir.path().join("clean");
        let noisy = dir.path().join("noisy");
        std::fs::create_dir_all(&clean).unwrap();
        std::fs::create_dir_all(&noisy).unwrap();

        let src = clean.join("resume_0003_t02.png");
        page().save(&src).unwrap();
        let dst = noisy.join("resume_0003_t02.png");
        write_noisy_variant(&src, &dst, 5).unwrap();

        assert_eq!(image::image_dimensions(&dst).unwrap(), (64, 48));
    }

    #[test]
    fn test_write_noisy_variant_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("resume_0004_t02.png");
        std::fs::write(&src, b"nope").unwrap();
        let err = write_noisy_variant(&src, &dir.path().join("out.png"), 5).unwrap_err();
        assert!(err.is_recoverable());
    }
}
