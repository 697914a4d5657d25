//! Text measurement and drawing for label regions.
//!
//! Two kinds of typeface are supported:
//!
//! - **Outline**: any TrueType/OpenType face, rasterized anti-aliased with
//!   ab_glyph.
//! - **Bitmap**: the built-in Spleen 12×24 font, integer-scaled. Always
//!   available, so it is the fallback when a preferred face cannot be loaded.
//!
//! Coordinates follow one convention for both: the drawing origin `(x, y)`
//! is the top-left of the line box, with the ascender line at `y`. Measured
//! [`TextBounds`] are the ink box relative to that origin, so centering code
//! can use them without knowing which kind of font is active.

use std::fmt;

use ab_glyph::{Font, FontArc, Glyph, GlyphId, PxScale, ScaleFont, point};
use image::{Rgba, RgbaImage};
use spleen_font::{FONT_12X24, PSF2Font};

/// Cell width of the built-in bitmap font at scale 1.
pub const BITMAP_CELL_WIDTH: u32 = 12;

/// Cell height of the built-in bitmap font at scale 1.
pub const BITMAP_CELL_HEIGHT: u32 = 24;

/// Ink bounding box of a string, relative to the drawing origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextBounds {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl TextBounds {
    pub fn width(&self) -> i64 {
        self.right - self.left
    }

    pub fn height(&self) -> i64 {
        self.bottom - self.top
    }

    fn union(self, other: TextBounds) -> TextBounds {
        TextBounds {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}

/// A typeface at a fixed pixel size.
#[derive(Clone)]
pub enum LabelFont {
    /// Vector face rasterized with anti-aliasing
    Outline { font: FontArc, scale: PxScale },
    /// Built-in Spleen 12×24, each font pixel drawn as `scale × scale`
    Bitmap { scale: u32 },
}

impl fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelFont::Outline { scale, .. } => f
                .debug_struct("Outline")
                .field("scale", &scale.y)
                .finish(),
            LabelFont::Bitmap { scale } => f.debug_struct("Bitmap").field("scale", scale).finish(),
        }
    }
}

impl LabelFont {
    /// Wrap an outline face so that one em spans `em_px` pixels.
    ///
    /// ab_glyph scales by line height (ascent − descent), so the em size is
    /// converted through the face's units-per-em.
    pub fn outline(font: FontArc, em_px: f32) -> Self {
        let height = match font.units_per_em() {
            Some(units_per_em) if units_per_em > 0.0 => {
                em_px * font.height_unscaled() / units_per_em
            }
            _ => em_px,
        };
        LabelFont::Outline {
            font,
            scale: PxScale::from(height),
        }
    }

    /// The built-in bitmap font, scaled to the nearest whole multiple of its
    /// 24 px cell height.
    pub fn bitmap(em_px: f32) -> Self {
        let scale = (em_px / BITMAP_CELL_HEIGHT as f32).round().max(1.0) as u32;
        LabelFont::Bitmap { scale }
    }

    pub fn is_bitmap(&self) -> bool {
        matches!(self, LabelFont::Bitmap { .. })
    }

    /// Measure the ink box of `text`. Empty text measures as all zeros.
    pub fn bbox(&self, text: &str) -> TextBounds {
        if text.is_empty() {
            return TextBounds::default();
        }

        match self {
            LabelFont::Outline { font, scale } => {
                let mut bounds: Option<TextBounds> = None;
                for glyph in layout_glyphs(font, *scale, text) {
                    if let Some(outlined) = font.outline_glyph(glyph) {
                        let px = outlined.px_bounds();
                        let glyph_bounds = TextBounds {
                            left: px.min.x.floor() as i64,
                            top: px.min.y.floor() as i64,
                            right: px.max.x.ceil() as i64,
                            bottom: px.max.y.ceil() as i64,
                        };
                        bounds = Some(match bounds {
                            Some(b) => b.union(glyph_bounds),
                            None => glyph_bounds,
                        });
                    }
                }
                bounds.unwrap_or_default()
            }
            LabelFont::Bitmap { scale } => {
                let count = text.chars().count() as i64;
                TextBounds {
                    left: 0,
                    top: 0,
                    right: count * (BITMAP_CELL_WIDTH * scale) as i64,
                    bottom: (BITMAP_CELL_HEIGHT * scale) as i64,
                }
            }
        }
    }

    /// Draw `text` with its origin at `(x, y)`. Pixels outside the image are
    /// clipped.
    pub fn draw(&self, img: &mut RgbaImage, x: i64, y: i64, text: &str, color: Rgba<u8>) {
        match self {
            LabelFont::Outline { font, scale } => {
                for glyph in layout_glyphs(font, *scale, text) {
                    if let Some(outlined) = font.outline_glyph(glyph) {
                        let bounds = outlined.px_bounds();
                        let origin_x = x + bounds.min.x.floor() as i64;
                        let origin_y = y + bounds.min.y.floor() as i64;
                        outlined.draw(|gx, gy, coverage| {
                            blend_pixel(
                                img,
                                origin_x + gx as i64,
                                origin_y + gy as i64,
                                color,
                                coverage,
                            );
                        });
                    }
                }
            }
            LabelFont::Bitmap { scale } => {
                let scale = *scale as i64;
                let cell_w = BITMAP_CELL_WIDTH as usize;
                let mut cursor_x = x;
                for ch in text.chars() {
                    let cell = bitmap_glyph(ch);
                    for (idx, on) in cell.iter().enumerate() {
                        if !on {
                            continue;
                        }
                        let col = (idx % cell_w) as i64;
                        let row = (idx / cell_w) as i64;
                        for dy in 0..scale {
                            for dx in 0..scale {
                                blend_pixel(
                                    img,
                                    cursor_x + col * scale + dx,
                                    y + row * scale + dy,
                                    color,
                                    1.0,
                                );
                            }
                        }
                    }
                    cursor_x += BITMAP_CELL_WIDTH as i64 * scale;
                }
            }
        }
    }
}

/// Position glyphs along a single baseline, applying pair kerning.
fn layout_glyphs(font: &FontArc, scale: PxScale, text: &str) -> Vec<Glyph> {
    let scaled = font.as_scaled(scale);
    let baseline_y = scaled.ascent();

    let mut glyphs = Vec::with_capacity(text.len());
    let mut caret_x = 0.0f32;
    let mut previous: Option<GlyphId> = None;

    for ch in text.chars() {
        let glyph_id = font.glyph_id(ch);
        if let Some(prev) = previous {
            caret_x += scaled.kern(prev, glyph_id);
        }
        glyphs.push(glyph_id.with_scale_and_position(scale, point(caret_x, baseline_y)));
        caret_x += scaled.h_advance(glyph_id);
        previous = Some(glyph_id);
    }

    glyphs
}

/// Rasterize one character of the built-in font into a 12×24 on/off cell.
/// Characters the font lacks become a box outline; whitespace stays blank.
fn bitmap_glyph(ch: char) -> Vec<bool> {
    let width = BITMAP_CELL_WIDTH as usize;
    let height = BITMAP_CELL_HEIGHT as usize;
    let mut cell = vec![false; width * height];

    let mut spleen = PSF2Font::new(FONT_12X24).expect("embedded Spleen font is valid");
    let utf8 = ch.to_string();

    if let Some(glyph) = spleen.glyph_for_utf8(utf8.as_bytes()) {
        for (row_y, row) in glyph.enumerate() {
            for (col_x, on) in row.enumerate() {
                if row_y < height && col_x < width {
                    cell[row_y * width + col_x] = on;
                }
            }
        }
    } else if !ch.is_whitespace() {
        for x in 0..width {
            cell[x] = true;
            cell[(height - 1) * width + x] = true;
        }
        for y in 0..height {
            cell[y * width] = true;
            cell[y * width + width - 1] = true;
        }
    }

    cell
}

/// Source-over composite `color` at `coverage` onto one pixel.
pub(crate) fn blend_pixel(img: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
        return;
    }
    let src_a = coverage.clamp(0.0, 1.0) * (color[3] as f32 / 255.0);
    if src_a <= 0.0 {
        return;
    }

    let dst = img.get_pixel_mut(x as u32, y as u32);
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);

    for c in 0..3 {
        let src_c = color[c] as f32;
        let dst_c = dst[c] as f32;
        let out_c = (src_c * src_a + dst_c * dst_a * (1.0 - src_a)) / out_a;
        dst[c] = out_c.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn dejavu_sans() -> FontArc {
        FontArc::try_from_slice(include_bytes!("../../tests/fonts/DejaVuSans.ttf"))
            .expect("Failed to load DejaVu Sans")
    }

    #[test]
    fn test_outline_scale_from_em_size() {
        let face = dejavu_sans();
        assert_eq!(face.units_per_em(), Some(2048.0));

        let LabelFont::Outline { scale, .. } = LabelFont::outline(face.clone(), 46.0) else {
            panic!("outline face should stay an outline font");
        };
        let expected = 46.0 * face.height_unscaled() / 2048.0;
        assert!((scale.y - expected).abs() < 1e-3);
        assert!(scale.y > 46.0, "line height exceeds the em size");

        // Cap height is 1493 units: ~33.5 px at a 46 px em
        let cap = LabelFont::outline(face, 46.0).bbox("H").height();
        assert!((33..=35).contains(&cap), "cap height {}", cap);
    }

    #[test]
    fn test_outline_ink_inside_bbox() {
        let font = LabelFont::outline(dejavu_sans(), 46.0);
        assert!(!font.is_bitmap());

        let text = "Centrifuge Tubes";
        let bounds = font.bbox(text);
        assert!(bounds.width() > 0 && bounds.height() > 0);

        let (ox, oy) = (20i64, 15i64);
        let mut img = RgbaImage::from_pixel(700, 100, WHITE);
        font.draw(&mut img, ox, oy, text, BLACK);

        let mut inked = 0;
        for (x, y, px) in img.enumerate_pixels() {
            if px[0] < 255 {
                inked += 1;
                let (x, y) = (x as i64, y as i64);
                assert!(
                    (ox + bounds.left..ox + bounds.right).contains(&x),
                    "x={} outside ink box",
                    x
                );
                assert!(
                    (oy + bounds.top..oy + bounds.bottom).contains(&y),
                    "y={} outside ink box",
                    y
                );
            }
        }
        assert!(inked > 0);
    }

    #[test]
    fn test_outline_descender_extends_bbox() {
        let font = LabelFont::outline(dejavu_sans(), 46.0);
        assert_eq!(font.bbox("Hg").top, font.bbox("H").top);
        assert!(font.bbox("Hg").bottom > font.bbox("H").bottom);
    }

    #[test]
    fn test_bitmap_scale_from_em_size() {
        assert!(matches!(LabelFont::bitmap(46.0), LabelFont::Bitmap { scale: 2 }));
        assert!(matches!(LabelFont::bitmap(56.0), LabelFont::Bitmap { scale: 2 }));
        assert!(matches!(LabelFont::bitmap(5.0), LabelFont::Bitmap { scale: 1 }));
        assert!(matches!(LabelFont::bitmap(300.0), LabelFont::Bitmap { scale: 13 }));
    }

    #[test]
    fn test_bitmap_bbox() {
        let font = LabelFont::bitmap(48.0);
        assert_eq!(
            font.bbox("Hg"),
            TextBounds {
                left: 0,
                top: 0,
                right: 48,
                bottom: 48
            }
        );
        assert_eq!(font.bbox("Hg").height(), 48);
    }

    #[test]
    fn test_empty_text_bbox() {
        assert_eq!(LabelFont::bitmap(24.0).bbox(""), TextBounds::default());
        assert_eq!(TextBounds::default().width(), 0);
    }

    #[test]
    fn test_bitmap_draw_inside_bbox() {
        let font = LabelFont::bitmap(24.0);
        let mut img = RgbaImage::from_pixel(100, 40, Rgba([255, 255, 255, 255]));
        font.draw(&mut img, 10, 5, "AB", BLACK);

        let mut dark = 0;
        for (x, y, px) in img.enumerate_pixels() {
            if px[0] < 128 {
                dark += 1;
                assert!((10..34).contains(&x), "x={} outside ink box", x);
                assert!((5..29).contains(&y), "y={} outside ink box", y);
            }
        }
        assert!(dark > 0);
    }

    #[test]
    fn test_draw_clips_outside_image() {
        let font = LabelFont::bitmap(48.0);
        let mut img = RgbaImage::from_pixel(20, 20, Rgba([255, 255, 255, 255]));
        font.draw(&mut img, -30, -10, "WIDE TEXT", BLACK);
        font.draw(&mut img, 15, 15, "X", BLACK);
        assert_eq!(img.dimensions(), (20, 20));
    }

    #[test]
    fn test_unknown_glyph_draws_box() {
        let cell = bitmap_glyph('\u{10FFFD}');
        assert!(cell[0]);
        assert!(cell[cell.len() - 1]);
    }

    #[test]
    fn test_space_is_blank() {
        assert!(bitmap_glyph(' ').iter().all(|&on| !on));
    }

    #[test]
    fn test_blend_onto_transparent() {
        let mut img = RgbaImage::new(1, 1);
        blend_pixel(&mut img, 0, 0, BLACK, 1.0);
        assert_eq!(*img.get_pixel(0, 0), BLACK);

        let mut img = RgbaImage::new(1, 1);
        blend_pixel(&mut img, 0, 0, BLACK, 0.5);
        let px = img.get_pixel(0, 0);
        assert_eq!(px[0], 0);
        assert!((126..=129).contains(&px[3]));
    }

    #[test]
    fn test_blend_onto_white() {
        let mut img = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255]));
        blend_pixel(&mut img, 0, 0, BLACK, 0.5);
        let px = img.get_pixel(0, 0);
        assert!((126..=129).contains(&px[0]));
        assert_eq!(px[3], 255);
    }
}
