use image::{imageops, DynamicImage, GenericImageView, ImageBuffer, Limits, Pixel};
use thiserror::Error;

use crate::geometry::CropBox;

/// Why a crop box could not be applied to an image.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CropError {
    #[error("right/bottom edge lies before left/top edge")]
    Inverted,

    #[error("{width}x{height} output exceeds the image size limits")]
    TooLarge { width: i128, height: i128 },
}

/// Largest output buffer `crop` will allocate, matching the decoder's default.
pub fn default_max_alloc() -> u64 {
    Limits::default().max_alloc.unwrap_or(u64::MAX)
}

/// Crops `image` to `crop_box` under the default allocation limit.
pub fn crop(image: &DynamicImage, crop_box: &CropBox) -> Result<DynamicImage, CropError> {
    crop_with_limit(image, crop_box, default_max_alloc())
}

/// Crops `image` to `crop_box`, refusing outputs larger than `max_alloc` bytes.
///
/// The result is always `width() x height()` of the box. The part of the box
/// that overlaps the source is copied at full precision; anything outside it
/// stays zeroed in the source pixel type (black, or transparent with alpha).
pub fn crop_with_limit(
    image: &DynamicImage,
    crop_box: &CropBox,
    max_alloc: u64,
) -> Result<DynamicImage, CropError> {
    if crop_box.is_inverted() {
        return Err(CropError::Inverted);
    }

    let too_large = || CropError::TooLarge {
        width: crop_box.width(),
        height: crop_box.height(),
    };
    let out_width = u32::try_from(crop_box.width()).map_err(|_| too_large())?;
    let out_height = u32::try_from(crop_box.height()).map_err(|_| too_large())?;
    let bytes = u64::from(out_width)
        .checked_mul(u64::from(out_height))
        .and_then(|n| n.checked_mul(u64::from(image.color().bytes_per_pixel())))
        .filter(|&n| n <= max_alloc)
        .ok_or_else(too_large)?;
    if usize::try_from(bytes).is_err() {
        return Err(too_large());
    }

    let (width, height) = image.dimensions();
    if crop_box.left >= 0
        && crop_box.top >= 0
        && crop_box.right <= i128::from(width)
        && crop_box.bottom <= i128::from(height)
    {
        return Ok(image.crop_imm(
            crop_box.left as u32,
            crop_box.top as u32,
            out_width,
            out_height,
        ));
    }

    // Offset of the source inside the output; `None` when nothing overlaps.
    let overlaps = crop_box.left < i128::from(width)
        && crop_box.top < i128::from(height)
        && crop_box.right > 0
        && crop_box.bottom > 0;
    let offset = overlaps.then(|| (-crop_box.left as i64, -crop_box.top as i64));

    Ok(match image {
        DynamicImage::ImageLuma8(buf) => {
            DynamicImage::ImageLuma8(pad(buf, out_width, out_height, offset))
        }
        DynamicImage::ImageLumaA8(buf) => {
            DynamicImage::ImageLumaA8(pad(buf, out_width, out_height, offset))
        }
        DynamicImage::ImageRgb8(buf) => {
            DynamicImage::ImageRgb8(pad(buf, out_width, out_height, offset))
        }
        DynamicImage::ImageRgba8(buf) => {
            DynamicImage::ImageRgba8(pad(buf, out_width, out_height, offset))
        }
        DynamicImage::ImageLuma16(buf) => {
            DynamicImage::ImageLuma16(pad(buf, out_width, out_height, offset))
        }
        DynamicImage::ImageLumaA16(buf) => {
            DynamicImage::ImageLumaA16(pad(buf, out_width, out_height, offset))
        }
        DynamicImage::ImageRgb16(buf) => {
            DynamicImage::ImageRgb16(pad(buf, out_width, out_height, offset))
        }
        DynamicImage::ImageRgba16(buf) => {
            DynamicImage::ImageRgba16(pad(buf, out_width, out_height, offset))
        }
        DynamicImage::ImageRgb32F(buf) => {
            DynamicImage::ImageRgb32F(pad(buf, out_width, out_height, offset))
        }
        DynamicImage::ImageRgba32F(buf) => {
            DynamicImage::ImageRgba32F(pad(buf, out_width, out_height, offset))
        }
        other => DynamicImage::ImageRgba8(pad(&other.to_rgba8(), out_width, out_height, offset)),
    })
}

fn pad<P>(
    image: &ImageBuffer<P, Vec<P::Subpixel>>,
    width: u32,
    height: u32,
    offset: Option<(i64, i64)>,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel,
{
    let mut canvas = ImageBuffer::new(width, height);
    if let Some((x, y)) = offset {
        imageops::replace(&mut canvas, image, x, y);
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage, Rgba, RgbaImage};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([x as u8, y as u8, 200])
        }))
    }

    #[test]
    fn test_crop_inside_bounds() {
        let image = gradient(200, 100);
        let cropped = crop(&image, &CropBox::new(10, 10, 190, 90)).unwrap();
        assert_eq!(cropped.dimensions(), (180, 80));
        assert_eq!(cropped.to_rgb8().get_pixel(0, 0), &Rgb([10, 10, 200]));
        assert_eq!(cropped.to_rgb8().get_pixel(179, 79), &Rgb([189, 89, 200]));
    }

    #[test]
    fn test_crop_dimensions_follow_box() {
        let image = gradient(64, 48);
        let boxes = [
            CropBox::new(0, 0, 64, 48),
            CropBox::new(0, 0, 1, 1),
            CropBox::new(5, 6, 30, 47),
            CropBox::new(63, 47, 64, 48),
        ];
        for crop_box in boxes {
            let cropped = crop(&image, &crop_box).unwrap();
            assert_eq!(
                cropped.dimensions(),
                (crop_box.width() as u32, crop_box.height() as u32),
                "box {}",
                crop_box
            );
        }
    }

    #[test]
    fn test_crop_outside_bounds_is_zero_filled() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 255])));
        let cropped = crop(&image, &CropBox::new(-2, -2, 6, 3)).unwrap();
        let rgba = cropped.to_rgba8();

        assert_eq!(cropped.dimensions(), (8, 5));
        assert_eq!(rgba.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
        assert_eq!(rgba.get_pixel(2, 2), &Rgba([9, 9, 9, 255]));
        assert_eq!(rgba.get_pixel(5, 4), &Rgba([9, 9, 9, 255]));
        assert_eq!(rgba.get_pixel(6, 4), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_crop_keeps_color_type() {
        let image = gradient(10, 10);
        let cropped = crop(&image, &CropBox::new(-1, -1, 5, 5)).unwrap();
        assert_eq!(cropped.color(), image.color());
    }

    #[test]
    fn test_padded_crop_keeps_16_bit_precision() {
        let image = DynamicImage::ImageLuma16(ImageBuffer::from_pixel(4, 4, Luma([0x1234u16])));

        let inside = crop(&image, &CropBox::new(0, 0, 2, 2)).unwrap();
        let padded = crop(&image, &CropBox::new(-1, -1, 3, 3)).unwrap();

        assert_eq!(padded.color(), image.color());
        let inside = inside.as_luma16().unwrap();
        let padded = padded.as_luma16().unwrap();
        assert_eq!(inside.get_pixel(0, 0), &Luma([0x1234]));
        assert_eq!(padded.get_pixel(1, 1), inside.get_pixel(0, 0));
        assert_eq!(padded.get_pixel(0, 0), &Luma([0]));
    }

    #[test]
    fn test_box_without_overlap_is_blank() {
        let image = gradient(10, 10);
        let cropped = crop(&image, &CropBox::new(-100, -100, -90, -95)).unwrap();
        assert_eq!(cropped.dimensions(), (10, 5));
        assert!(cropped.to_rgb8().pixels().all(|p| p == &Rgb([0, 0, 0])));

        let far = CropBox::new(i64::MIN.into(), 0, i128::from(i64::MIN) + 3, 2);
        let cropped = crop(&image, &far).unwrap();
        assert_eq!(cropped.dimensions(), (3, 2));
    }

    #[test]
    fn test_inverted_box_is_rejected() {
        let image = gradient(10, 10);
        assert_eq!(
            crop(&image, &CropBox::new(6, 0, 5, 10)).unwrap_err(),
            CropError::Inverted
        );
        assert_eq!(
            crop(&image, &CropBox::new(0, 6, 10, 5)).unwrap_err(),
            CropError::Inverted
        );
    }

    #[test]
    fn test_oversized_box_is_rejected() {
        let image = gradient(10, 10);
        let boxes = [
            CropBox::new(0, 0, 4_000_000_000, 4_000_000_000),
            CropBox::new(0, 0, 100_000, 100_000),
            CropBox::new(0, 0, i128::from(u32::MAX) + 1, 1),
            CropBox::new(0, 0, 10 + (1i128 << 63), 10),
        ];
        for crop_box in boxes {
            assert!(
                matches!(crop(&image, &crop_box), Err(CropError::TooLarge { .. })),
                "box {}",
                crop_box
            );
        }
    }

    #[test]
    fn test_limit_counts_bytes_per_pixel() {
        let gray = DynamicImage::ImageLuma8(ImageBuffer::new(4, 4));
        let rgba16 = DynamicImage::ImageRgba16(ImageBuffer::new(4, 4));
        let crop_box = CropBox::new(-10, -10, 10, 10);

        assert!(crop_with_limit(&gray, &crop_box, 400).is_ok());
        assert!(matches!(
            crop_with_limit(&rgba16, &crop_box, 400),
            Err(CropError::TooLarge { width: 20, height: 20 })
        ));
    }

    #[test]
    fn test_empty_box() {
        let image = gradient(10, 10);
        let cropped = crop(&image, &CropBox::new(3, 3, 3, 8)).unwrap();
        assert_eq!(cropped.dimensions(), (0, 5));
    }
}
