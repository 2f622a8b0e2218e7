use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView};
use std::collections::BTreeMap;

use crate::errors::EncodeError;
use crate::models::SizeTier;

/// Scale the bitmap to fit each tier's bounding box and encode it as JPEG at
/// the tier's quality.
///
/// The fit is thumbnail-style: aspect ratio is preserved and nothing is
/// cropped, so the output is at most `width` x `height`. JPEG carries no
/// alpha channel, so alpha-carrying bitmaps are flattened at encode time.
pub fn encode_tiers(
    bitmap: &DynamicImage,
    tiers: &[SizeTier],
) -> Result<BTreeMap<String, Vec<u8>>, EncodeError> {
    let (width, height) = bitmap.dimensions();
    if width == 0 || height == 0 {
        return Err(EncodeError::EmptyBitmap { width, height });
    }

    let mut encoded = BTreeMap::new();
    for tier in tiers {
        if tier.width == 0 || tier.height == 0 {
            return Err(EncodeError::InvalidTier {
                tier: tier.name.clone(),
                width: tier.width,
                height: tier.height,
            });
        }

        let resized = bitmap.thumbnail(tier.width, tier.height).to_rgb8();
        let mut bytes = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut bytes, tier.quality);
        encoder.encode_image(&resized)?;
        encoded.insert(tier.name.clone(), bytes);
    }

    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn tier(name: &str, width: u32, height: u32) -> SizeTier {
        SizeTier {
            name: name.to_string(),
            width,
            height,
            quality: 80,
        }
    }

    fn test_bitmap(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        }))
    }

    #[test]
    fn test_output_fits_tier_bounds_and_keeps_aspect() {
        let bitmap = test_bitmap(200, 100);
        let tiers = vec![tier("small", 64, 64), tier("medium", 128, 128)];

        let encoded = encode_tiers(&bitmap, &tiers).unwrap();
        assert_eq!(encoded.len(), 2);

        for tier in &tiers {
            let decoded = image::load_from_memory(&encoded[&tier.name]).unwrap();
            let (w, h) = decoded.dimensions();
            assert!(w <= tier.width);
            assert!(h <= tier.height);

            let source_ratio = 200.0 / 100.0;
            let ratio = w as f64 / h as f64;
            assert!((ratio - source_ratio).abs() < 0.1, "aspect drifted: {ratio}");
        }
    }

    #[test]
    fn test_empty_bitmap_rejected() {
        let bitmap = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        let result = encode_tiers(&bitmap, &[tier("small", 64, 64)]);
        assert!(matches!(result, Err(EncodeError::EmptyBitmap { .. })));
    }

    #[test]
    fn test_zero_dimension_tier_rejected() {
        let bitmap = test_bitmap(32, 32);
        let result = encode_tiers(&bitmap, &[tier("broken", 0, 64)]);
        assert!(matches!(result, Err(EncodeError::InvalidTier { .. })));
    }

    #[test]
    fn test_alpha_bitmap_is_flattened() {
        let bitmap = DynamicImage::ImageRgba8(image::RgbaImage::new(32, 32));
        let encoded = encode_tiers(&bitmap, &[tier("small", 16, 16)]).unwrap();
        assert!(image::load_from_memory(&encoded["small"]).is_ok());
    }
}
