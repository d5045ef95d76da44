//! Redaction compositing.
//!
//! Draws an opaque rectangle over every sensitive box on a copy of the
//! image, with the category placeholder centered inside wide boxes.

use crate::category::RedactionSettings;
use crate::error::{Error, Result};
use crate::text_box::TextBox;
use ab_glyph::{FontVec, PxScale};
use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{DynamicImage, ImageBuffer, Luma, LumaA, Pixel, Rgb, Rgba};
use imageproc::definitions::Clamp;
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Padding added on every side of a box, in pixels.
pub const PADDING: f64 = 2.0;

/// Boxes at most this wide get no label.
pub const LABEL_MIN_WIDTH: f64 = 40.0;

/// Label size for TrueType fonts, in pixels.
const LABEL_SCALE: f32 = 14.0;

/// Label used for a box with no category.
const FALLBACK_LABEL: &str = "[REDACTED]";

/// Fonts tried, in order, when no font path is configured.
const FONT_CANDIDATES: &[&str] = &[
    "arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// A box grown by [`PADDING`] and clamped to the image.
///
/// Bounds are inclusive pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaddedRect {
    /// Leftmost covered column.
    pub left: u32,
    /// Topmost covered row.
    pub top: u32,
    /// Rightmost covered column.
    pub right: u32,
    /// Bottommost covered row.
    pub bottom: u32,
}

impl PaddedRect {
    /// Computes the covered area of a box on an image of the given size.
    ///
    /// Returns `None` when the box lies entirely outside the image.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn around(text_box: &TextBox, image_width: u32, image_height: u32) -> Option<Self> {
        if image_width == 0 || image_height == 0 {
            return None;
        }
        let max_x = f64::from(image_width - 1);
        let max_y = f64::from(image_height - 1);

        let left = (text_box.x - PADDING).floor().max(0.0);
        let top = (text_box.y - PADDING).floor().max(0.0);
        let right = (text_box.right() + PADDING).ceil().min(max_x);
        let bottom = (text_box.bottom() + PADDING).ceil().min(max_y);

        if left > max_x || top > max_y || right < left || bottom < top {
            return None;
        }

        Some(Self {
            left: left as u32,
            top: top as u32,
            right: right as u32,
            bottom: bottom as u32,
        })
    }

    /// Covered width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.right - self.left + 1
    }

    /// Covered height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.bottom - self.top + 1
    }

    #[allow(clippy::cast_possible_wrap)]
    fn to_rect(self) -> Rect {
        Rect::at(self.left as i32, self.top as i32).of_size(self.width(), self.height())
    }
}

/// Font used for placeholder labels.
pub enum LabelFont {
    /// A TrueType/OpenType font loaded from disk.
    TrueType(FontVec),
    /// Built-in 8×8 bitmap glyphs, always available.
    Bitmap,
}

impl std::fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TrueType(_) => f.write_str("LabelFont::TrueType"),
            Self::Bitmap => f.write_str("LabelFont::Bitmap"),
        }
    }
}

impl LabelFont {
    /// Loads the preferred font, then the platform candidates, then falls
    /// back to the bitmap font. Never fails.
    #[must_use]
    pub fn load(preferred: Option<&Path>) -> Self {
        let candidates = preferred
            .map(Path::to_path_buf)
            .into_iter()
            .chain(FONT_CANDIDATES.iter().map(PathBuf::from));

        for path in candidates {
            let Ok(bytes) = std::fs::read(&path) else {
                continue;
            };
            if let Some(font) = Self::from_bytes(bytes) {
                debug!("Using label font {}", path.display());
                return font;
            }
            debug!("Skipping unreadable font {}", path.display());
        }

        debug!("No TrueType font found, using bitmap labels");
        Self::Bitmap
    }

    /// Parses a font file. Returns `None` if the bytes are not a font.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Option<Self> {
        FontVec::try_from_vec(bytes).ok().map(Self::TrueType)
    }

    /// Size of the rendered label in pixels.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn measure(&self, text: &str, bitmap_scale: u32) -> (u32, u32) {
        match self {
            Self::TrueType(font) => text_size(PxScale::from(LABEL_SCALE), font, text),
            Self::Bitmap => {
                let chars = text.chars().count() as u32;
                (chars * 8 * bitmap_scale, 8 * bitmap_scale)
            }
        }
    }

    fn draw_centered<P>(&self, canvas: &mut Canvas<P>, rect: PaddedRect, text: &str, ink: P)
    where
        P: Pixel,
        P::Subpixel: Into<f32> + Clamp<f32>,
    {
        // Bitmap glyphs are doubled when the label still fits
        let bitmap_scale = if self.measure(text, 2).0 <= rect.width() { 2 } else { 1 };
        let (text_width, text_height) = self.measure(text, bitmap_scale);

        let x = centered(rect.left, rect.width(), text_width);
        let y = centered(rect.top, rect.height(), text_height);

        match self {
            Self::TrueType(font) => {
                draw_text_mut(canvas, ink, x, y, PxScale::from(LABEL_SCALE), font, text);
            }
            Self::Bitmap => draw_bitmap_text(canvas, x, y, text, ink, bitmap_scale),
        }
    }
}

#[allow(clippy::cast_possible_wrap)]
fn centered(start: u32, extent: u32, size: u32) -> i32 {
    start as i32 + (extent as i32 - size as i32) / 2
}

#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn draw_bitmap_text<P: Pixel>(canvas: &mut Canvas<P>, x: i32, y: i32, text: &str, ink: P, scale: u32) {
    let scale = scale.max(1) as i32;
    let (width, height) = (canvas.width() as i32, canvas.height() as i32);
    let mut cursor_x = x;

    for ch in text.chars() {
        if let Some(glyph) = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?')) {
            for (row, bits) in (0i32..).zip(glyph) {
                for col in 0..8 {
                    if (bits >> col) & 1 == 0 {
                        continue;
                    }
                    for dy in 0..scale {
                        for dx in 0..scale {
                            let px = cursor_x + col * scale + dx;
                            let py = y + row * scale + dy;
                            if (0..width).contains(&px) && (0..height).contains(&py) {
                                canvas.put_pixel(px as u32, py as u32, ink);
                            }
                        }
                    }
                }
            }
        }
        cursor_x += 8 * scale;
    }
}

/// Owned pixel buffer in any of the supported color types.
type Canvas<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;

/// Paints on a copy of `image`, in its own pixel type.
fn painted<P>(
    image: &Canvas<P>,
    boxes: &[TextBox],
    settings: &RedactionSettings,
    font: &LabelFont,
    fill: P,
    ink: P,
) -> Canvas<P>
where
    P: Pixel,
    P::Subpixel: Into<f32> + Clamp<f32>,
{
    let mut canvas = image.clone();
    let (width, height) = canvas.dimensions();

    for text_box in boxes {
        let Some(rect) = PaddedRect::around(text_box, width, height) else {
            debug!("Box '{}' lies outside the image, skipping", text_box.text);
            continue;
        };

        draw_filled_rect_mut(&mut canvas, rect.to_rect(), fill);

        if text_box.width > LABEL_MIN_WIDTH {
            let label = text_box
                .category
                .map_or(FALLBACK_LABEL, |category| settings.placeholder(category));
            font.draw_centered(&mut canvas, rect, label, ink);
        }
    }
    canvas
}

/// Draws redaction boxes over a copy of `image`.
///
/// The input is never modified and the result keeps its color type.
/// Float images are painted at 16 bits per channel and converted back.
#[must_use]
pub fn composite(
    image: &DynamicImage,
    boxes: &[TextBox],
    settings: &RedactionSettings,
    font: &LabelFont,
) -> DynamicImage {
    const MAX16: u16 = u16::MAX;
    match image {
        DynamicImage::ImageLuma8(buf) => {
            DynamicImage::ImageLuma8(painted(buf, boxes, settings, font, Luma([0]), Luma([255])))
        }
        DynamicImage::ImageLumaA8(buf) => DynamicImage::ImageLumaA8(painted(
            buf,
            boxes,
            settings,
            font,
            LumaA([0, 255]),
            LumaA([255, 255]),
        )),
        DynamicImage::ImageRgb8(buf) => DynamicImage::ImageRgb8(painted(
            buf,
            boxes,
            settings,
            font,
            Rgb([0, 0, 0]),
            Rgb([255, 255, 255]),
        )),
        DynamicImage::ImageLuma16(buf) => {
            DynamicImage::ImageLuma16(painted(buf, boxes, settings, font, Luma([0]), Luma([MAX16])))
        }
        DynamicImage::ImageLumaA16(buf) => DynamicImage::ImageLumaA16(painted(
            buf,
            boxes,
            settings,
            font,
            LumaA([0, MAX16]),
            LumaA([MAX16, MAX16]),
        )),
        DynamicImage::ImageRgb16(buf) => DynamicImage::ImageRgb16(painted(
            buf,
            boxes,
            settings,
            font,
            Rgb([0, 0, 0]),
            Rgb([MAX16; 3]),
        )),
        DynamicImage::ImageRgba16(buf) => DynamicImage::ImageRgba16(painted(
            buf,
            boxes,
            settings,
            font,
            Rgba([0, 0, 0, MAX16]),
            Rgba([MAX16; 4]),
        )),
        DynamicImage::ImageRgb32F(_) => {
            let canvas = painted(&image.to_rgb16(), boxes, settings, font, Rgb([0, 0, 0]), Rgb([MAX16; 3]));
            DynamicImage::ImageRgb32F(DynamicImage::ImageRgb16(canvas).to_rgb32f())
        }
        DynamicImage::ImageRgba32F(_) => {
            let canvas = painted(
                &image.to_rgba16(),
                boxes,
                settings,
                font,
                Rgba([0, 0, 0, MAX16]),
                Rgba([MAX16; 4]),
            );
            DynamicImage::ImageRgba32F(DynamicImage::ImageRgba16(canvas).to_rgba32f())
        }
        _ => DynamicImage::ImageRgba8(painted(
            &image.to_rgba8(),
            boxes,
            settings,
            font,
            Rgba([0, 0, 0, 255]),
            Rgba([255, 255, 255, 255]),
        )),
    }
}

/// Redacts an encoded image and re-encodes it in the same format.
///
/// With no boxes the input bytes are returned unchanged.
///
/// # Errors
///
/// Returns an error if the bytes are not a supported image or re-encoding fails.
pub fn redact_image_bytes(
    bytes: &[u8],
    boxes: &[TextBox],
    settings: &RedactionSettings,
    font: &LabelFont,
) -> Result<Vec<u8>> {
    if boxes.is_empty() {
        return Ok(bytes.to_vec());
    }

    let format = image::guess_format(bytes).map_err(|_| Error::UnknownFormat)?;
    let image = image::load_from_memory_with_format(bytes, format)?;
    let redacted = composite(&image, boxes, settings, font);

    let mut out = Cursor::new(Vec::new());
    redacted.write_to(&mut out, format)?;
    Ok(out.into_inner())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_possible_truncation)]
mod tests {
    use super::*;
    use crate::category::RedactionCategory;
    use image::{ColorType, GenericImageView, ImageFormat, RgbImage};

    fn white(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([255, 255, 255])))
    }

    fn png_bytes(image: &DynamicImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_padded_rect_clamps_at_origin() {
        let b = TextBox::new("x", 0.0, 0.0, 10.0, 10.0);
        let rect = PaddedRect::around(&b, 100, 100).unwrap();
        assert_eq!((rect.left, rect.top), (0, 0));
        assert_eq!((rect.right, rect.bottom), (12, 12));
    }

    #[test]
    fn test_padded_rect_clamps_at_far_edge() {
        let b = TextBox::new("x", 90.0, 95.0, 20.0, 20.0);
        let rect = PaddedRect::around(&b, 100, 100).unwrap();
        assert_eq!((rect.left, rect.top), (88, 93));
        assert_eq!((rect.right, rect.bottom), (99, 99));
    }

    #[test]
    fn test_padded_rect_outside_image() {
        let b = TextBox::new("x", 200.0, 10.0, 20.0, 20.0);
        assert!(PaddedRect::around(&b, 100, 100).is_none());
        assert!(PaddedRect::around(&b, 0, 0).is_none());
    }

    #[test]
    fn test_composite_fills_box_and_leaves_rest() {
        let image = white(100, 50);
        let boxes = vec![TextBox::new("555", 10.0, 10.0, 20.0, 10.0).with_category(RedactionCategory::Phone)];
        let out = composite(&image, &boxes, &RedactionSettings::default(), &LabelFont::Bitmap);

        assert_eq!(out.dimensions(), (100, 50));
        assert_eq!(out.get_pixel(8, 8), Rgba([0, 0, 0, 255]));
        assert_eq!(out.get_pixel(32, 22), Rgba([0, 0, 0, 255]));
        assert_eq!(out.get_pixel(33, 23), Rgba([255, 255, 255, 255]));
        assert_eq!(out.get_pixel(7, 7), Rgba([255, 255, 255, 255]));
        // Original untouched
        assert_eq!(image.get_pixel(15, 15), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_wide_box_gets_label_ink() {
        let image = white(200, 40);
        let boxes = vec![TextBox::new("Jane Doe", 10.0, 10.0, 150.0, 16.0).with_category(RedactionCategory::Name)];
        let out = composite(&image, &boxes, &RedactionSettings::default(), &LabelFont::Bitmap).to_rgb8();

        let inked = (8..=162)
            .flat_map(|x| (8..=28).map(move |y| (x, y)))
            .filter(|&(x, y)| *out.get_pixel(x, y) == Rgb([255, 255, 255]))
            .count();
        assert!(inked > 0);
    }

    #[test]
    fn test_narrow_box_has_no_label() {
        let image = white(100, 40);
        let boxes = vec![TextBox::new("42", 10.0, 10.0, 40.0, 16.0).with_category(RedactionCategory::Dollar)];
        let out = composite(&image, &boxes, &RedactionSettings::default(), &LabelFont::Bitmap).to_rgb8();

        for x in 8..=52 {
            for y in 8..=28 {
                assert_eq!(*out.get_pixel(x, y), Rgb([0, 0, 0]));
            }
        }
    }

    #[test]
    fn test_alpha_images_stay_rgba() {
        let image = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(20, 20, Rgba([9, 9, 9, 0])));
        let boxes = vec![TextBox::new("x", 5.0, 5.0, 4.0, 4.0)];
        let out = composite(&image, &boxes, &RedactionSettings::default(), &LabelFont::Bitmap);
        assert!(out.color().has_alpha());
        assert_eq!(out.get_pixel(6, 6), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_grayscale_images_stay_grayscale() {
        let image = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(60, 30, Luma([200])));
        let boxes = vec![TextBox::new("x", 5.0, 5.0, 4.0, 4.0)];
        let out = composite(&image, &boxes, &RedactionSettings::default(), &LabelFont::Bitmap);
        assert_eq!(out.color(), ColorType::L8);
        assert_eq!(out.as_luma8().unwrap().get_pixel(6, 6), &Luma([0]));
        assert_eq!(out.as_luma8().unwrap().get_pixel(40, 20), &Luma([200]));
    }

    #[test]
    fn test_sixteen_bit_images_keep_depth() {
        let image = DynamicImage::ImageRgb16(ImageBuffer::from_pixel(60, 30, Rgb([1234u16, 40000, 65535])));
        let boxes = vec![TextBox::new("x", 5.0, 5.0, 4.0, 4.0)];
        let out = composite(&image, &boxes, &RedactionSettings::default(), &LabelFont::Bitmap);
        assert_eq!(out.color(), ColorType::Rgb16);
        let buf = out.as_rgb16().unwrap();
        assert_eq!(buf.get_pixel(6, 6), &Rgb([0, 0, 0]));
        // Untouched pixels keep full precision
        assert_eq!(buf.get_pixel(40, 20), &Rgb([1234, 40000, 65535]));
    }

    #[test]
    fn test_redact_bytes_keeps_grayscale_png() {
        let image = DynamicImage::ImageLuma16(ImageBuffer::from_pixel(32, 32, Luma([777u16])));
        let boxes = vec![TextBox::new("x", 1.0, 1.0, 10.0, 10.0)];
        let out = redact_image_bytes(&png_bytes(&image), &boxes, &RedactionSettings::default(), &LabelFont::Bitmap)
            .unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!(decoded.color(), ColorType::L16);
        assert_eq!(decoded.as_luma16().unwrap().get_pixel(20, 20), &Luma([777]));
    }

    #[test]
    fn test_empty_boxes_return_identical_bytes() {
        let bytes = png_bytes(&white(30, 30));
        let out = redact_image_bytes(&bytes, &[], &RedactionSettings::default(), &LabelFont::Bitmap).unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn test_empty_composite_is_pixel_identical() {
        let image = white(30, 30);
        let out = composite(&image, &[], &RedactionSettings::default(), &LabelFont::Bitmap);
        assert_eq!(out.to_rgb8().as_raw(), image.to_rgb8().as_raw());
    }

    #[test]
    fn test_redact_bytes_keeps_format_and_size() {
        let bytes = png_bytes(&white(64, 32));
        let boxes = vec![TextBox::new("x", 1.0, 1.0, 10.0, 10.0)];
        let out = redact_image_bytes(&bytes, &boxes, &RedactionSettings::default(), &LabelFont::Bitmap).unwrap();

        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Png);
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!(decoded.dimensions(), (64, 32));
        assert_eq!(decoded.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_redact_bytes_rejects_garbage() {
        let boxes = vec![TextBox::new("x", 1.0, 1.0, 10.0, 10.0)];
        let err = redact_image_bytes(b"not an image", &boxes, &RedactionSettings::default(), &LabelFont::Bitmap)
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Malformed);
    }

    #[test]
    fn test_bitmap_measure() {
        assert_eq!(LabelFont::Bitmap.measure("[ID]", 1), (32, 8));
        assert_eq!(LabelFont::Bitmap.measure("[ID]", 2), (64, 16));
    }

    #[test]
    fn test_load_falls_back_without_fonts() {
        let font = LabelFont::load(Some(Path::new("/nonexistent/font.ttf")));
        // Either a system font or the bitmap fallback, never a panic
        let (w, _) = font.measure("[NAME]", 1);
        assert!(w > 0);
    }

    #[test]
    fn test_from_bytes_rejects_non_font() {
        assert!(LabelFont::from_bytes(b"nope".to_vec()).is_none());
    }
}
