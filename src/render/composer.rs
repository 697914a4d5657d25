//! Label composition.
//!
//! Turns one [`ResolvedRecord`] into one opaque square raster. Geometry comes
//! from [`LabelLayout`]; this module only paints it:
//!
//! 1. White RGBA canvas
//! 2. QR bitmap pasted at its rect
//! 3. Header and name drawn directly (each only if its layout is visible)
//! 4. Location drawn into its own transparent overlay, then alpha-composited
//! 5. Alpha dropped
//!
//! Composition is a pure function of record, config and fonts: nothing is
//! cached between labels.

use image::{DynamicImage, Rgba, RgbImage, RgbaImage, imageops};

use super::fonts::LabelFonts;
use super::layout::LabelLayout;
use super::qr;
use crate::error::LabelError;
use crate::label::LabelConfig;
use crate::record::ResolvedRecord;

/// A finished label: opaque RGB, `canvas_size × canvas_size`.
pub type LabelCanvas = RgbImage;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Renders labels with one configuration and one set of loaded fonts.
#[derive(Debug, Clone)]
pub struct Composer {
    config: LabelConfig,
    fonts: LabelFonts,
}

impl Composer {
    /// Load fonts for `config` and build a composer.
    pub fn new(config: LabelConfig) -> Self {
        let fonts = LabelFonts::load(&config);
        Self { config, fonts }
    }

    /// Build a composer with fonts that are already loaded.
    pub fn with_fonts(config: LabelConfig, fonts: LabelFonts) -> Self {
        Self { config, fonts }
    }

    pub fn config(&self) -> &LabelConfig {
        &self.config
    }

    pub fn fonts(&self) -> &LabelFonts {
        &self.fonts
    }

    /// Geometry `compose` would use for `record`.
    pub fn layout(&self, record: &ResolvedRecord) -> LabelLayout {
        LabelLayout::compute(&self.config, &self.fonts, record)
    }

    /// Render one label.
    ///
    /// The only failure is the QR encoder rejecting the permalink.
    pub fn compose(&self, record: &ResolvedRecord) -> Result<LabelCanvas, LabelError> {
        let layout = self.layout(record);
        let size = layout.canvas_size;

        let qr_rgb = qr::qr_bitmap(&record.permalink_url, layout.qr.width)?;
        let qr_rgba = DynamicImage::ImageRgb8(qr_rgb).to_rgba8();

        let mut canvas = RgbaImage::from_pixel(size, size, WHITE);
        imageops::replace(&mut canvas, &qr_rgba, layout.qr.x, layout.qr.y);

        if layout.header.visible {
            self.fonts.header.draw(
                &mut canvas,
                layout.header.x,
                layout.header.y,
                &self.config.header_text,
                BLACK,
            );
        }

        if layout.name.visible {
            self.fonts.name.draw(
                &mut canvas,
                layout.name.x,
                layout.name.y,
                &record.display_name,
                BLACK,
            );
        }

        let overlay_rect = layout.location_overlay;
        let mut overlay = RgbaImage::new(overlay_rect.width, overlay_rect.height);
        self.fonts
            .location
            .draw(&mut overlay, 0, 0, &record.location_text, BLACK);
        imageops::overlay(&mut canvas, &overlay, overlay_rect.x, overlay_rect.y);

        tracing::debug!(
            name = %record.display_name,
            header = layout.header.visible,
            name_drawn = layout.name.visible,
            "Composed label"
        );

        Ok(DynamicImage::ImageRgba8(canvas).to_rgb8())
    }
}

/// Render one label with a fresh composer for `config`.
///
/// Loads fonts on every call; use [`Composer`] to render many labels.
pub fn compose_label(
    record: &ResolvedRecord,
    config: &LabelConfig,
) -> Result<LabelCanvas, LabelError> {
    Composer::new(config.clone()).compose(record)
}
