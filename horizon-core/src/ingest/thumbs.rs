//! Thumbnail generation: the second pipeline step.

use std::path::Path;

use anyhow::Context;
use image::imageops::FilterType;
use tracing::debug;

use super::{DiscoveredImage, IngestFailure};

const THUMB_WIDTH: u32 = 100;
const THUMB_HEIGHT: u32 = 100;

/// Ensure every discovered image outside the no-thumbnail family has a
/// thumbnail file on disk, generating missing ones. Images whose
/// thumbnail cannot be produced are dropped from the upsert set and
/// recorded as failures.
pub fn ensure_thumbnails(
    discovered: Vec<DiscoveredImage>,
    failures: &mut Vec<IngestFailure>,
) -> Vec<DiscoveredImage> {
    let mut ready = Vec::with_capacity(discovered.len());

    for image in discovered {
        if !image.has_distinct_thumbnail() {
            ready.push(image);
            continue;
        }

        let thumb = image.thumb_source_path();
        if thumb.exists() {
            ready.push(image);
            continue;
        }

        match generate_thumbnail(&image.source_path, &thumb) {
            Ok(()) => {
                debug!(source = %image.source_path.display(), "generated thumbnail");
                ready.push(image);
            }
            Err(e) => failures.push(IngestFailure {
                path: image.source_path.clone(),
                reason: format!("thumbnail generation failed: {e:#}"),
            }),
        }
    }

    ready
}

/// Decode the source image, resize to the fixed thumbnail dimensions
/// and re-encode in the format implied by the output extension.
/// Unsupported or corrupt inputs fail here.
pub fn generate_thumbnail(input: &Path, output: &Path) -> anyhow::Result<()> {
    let source = image::open(input)
        .with_context(|| format!("unsupported or unreadable image {}", input.display()))?;

    source
        .resize_exact(THUMB_WIDTH, THUMB_HEIGHT, FilterType::Lanczos3)
        .save(output)
        .with_context(|| format!("failed to write thumbnail {}", output.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::fs;

    fn discovered(source: &Path, family: &str) -> DiscoveredImage {
        let file_name = source.file_name().unwrap().to_str().unwrap().to_string();
        DiscoveredImage {
            family: family.to_string(),
            group: "G".to_string(),
            subgroup: "S".to_string(),
            name: file_name.rsplit_once('.').unwrap().0.to_string(),
            source_path: source.to_path_buf(),
            file_path: format!("static/images/{family}/G/S/{file_name}"),
            thumb_path: format!(
                "static/images/{family}/G/S/{}",
                super::super::walk::thumb_file_name(&file_name)
            ),
        }
    }

    #[test]
    fn generates_a_fixed_size_thumbnail() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("img.png");
        RgbImage::from_pixel(8, 12, Rgb([180, 40, 40]))
            .save(&source)
            .unwrap();

        let image = discovered(&source, "Fabrics");
        let mut failures = Vec::new();
        let ready = ensure_thumbnails(vec![image.clone()], &mut failures);

        assert!(failures.is_empty(), "{failures:?}");
        assert_eq!(ready.len(), 1);
        let thumb = image.thumb_source_path();
        assert!(thumb.exists());
        let decoded = image::open(&thumb).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (100, 100));
    }

    #[test]
    fn existing_thumbnails_are_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("img.png");
        RgbImage::from_pixel(4, 4, Rgb([0, 0, 0])).save(&source).unwrap();

        let image = discovered(&source, "Fabrics");
        fs::write(image.thumb_source_path(), b"sentinel").unwrap();

        let mut failures = Vec::new();
        let ready = ensure_thumbnails(vec![image.clone()], &mut failures);
        assert_eq!(ready.len(), 1);
        assert_eq!(fs::read(image.thumb_source_path()).unwrap(), b"sentinel");
    }

    #[test]
    fn no_thumbnail_family_skips_generation() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("frame.png");
        fs::write(&source, b"not an image at all").unwrap();

        let image = discovered(&source, "Frames");
        let mut failures = Vec::new();
        let ready = ensure_thumbnails(vec![image], &mut failures);

        // Never decoded, so the garbage content is irrelevant.
        assert!(failures.is_empty());
        assert_eq!(ready.len(), 1);
    }

    #[test]
    fn undecodable_source_becomes_a_failure_not_an_abort() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.png");
        RgbImage::from_pixel(4, 4, Rgb([9, 9, 9])).save(&good).unwrap();
        let bad = dir.path().join("bad.png");
        fs::write(&bad, b"garbage bytes").unwrap();

        let mut failures = Vec::new();
        let ready = ensure_thumbnails(
            vec![discovered(&bad, "Fabrics"), discovered(&good, "Fabrics")],
            &mut failures,
        );

        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].source_path, good);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].path, bad);
        assert!(failures[0].reason.contains("thumbnail generation failed"));
    }
}
