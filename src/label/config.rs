//! # Label Configuration
//!
//! Geometry and typography for the one label type this crate produces: a
//! square 2×2 inch label rasterized at a configurable resolution.
//!
//! ## Derived Geometry
//!
//! | Quantity | Formula | At 600 DPI |
//! |----------|---------|------------|
//! | Canvas edge | `2 * dpi` | 1200 px |
//! | QR edge | `round(1.3 * dpi)` | 780 px |
//! | Page edge | `2 * 72` | 144 pt |
//!
//! ## Usage
//!
//! ```
//! use labelsheet::label::LabelConfig;
//!
//! let config = LabelConfig::default();
//! assert_eq!(config.canvas_size(), 1200);
//! assert_eq!(config.qr_size(), 780);
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::LabelError;

/// Physical edge length of a label in inches.
pub const LABEL_INCHES: f32 = 2.0;

/// QR edge length in inches (1.3 of the 2 inch label edge).
pub const QR_INCHES: f64 = 1.3;

/// Highest accepted resolution. A 2 inch canvas at this dpi is already
/// 4800 px square.
pub const MAX_DPI: u32 = 2400;

/// PDF user-space units per inch.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Header printed above every QR code unless configured otherwise.
pub const DEFAULT_HEADER: &str = "SPORT PSYCHOLOGY LAB";

/// # Font Specification
///
/// Describes the preferred typeface for one text role on the label.
///
/// Lookup order when loading:
///
/// 1. `path`: a TrueType/OpenType file on disk
/// 2. `family`: a system font matched by family name and weight
/// 3. the built-in bitmap font, integer-scaled to `size`
///
/// Failure at every step is silent; the label still renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSpec {
    /// System font family name (e.g. "Arial")
    pub family: Option<String>,

    /// Explicit font file, tried before the family lookup
    pub path: Option<PathBuf>,

    /// Request the bold weight
    pub bold: bool,

    /// Em size in pixels
    pub size: f32,
}

impl FontSpec {
    /// A system font by family name.
    pub fn family(name: &str, bold: bool, size: f32) -> Self {
        Self {
            family: Some(name.to_string()),
            path: None,
            bold,
            size,
        }
    }

    /// The built-in bitmap font only. Rendering with it does not depend on
    /// which fonts are installed.
    pub fn builtin(size: f32) -> Self {
        Self {
            family: None,
            path: None,
            bold: false,
            size,
        }
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::family("Arial", false, 46.0)
    }
}

/// # Label Configuration
///
/// Every field has a default; together they fully determine label geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Raster resolution in dots per inch
    pub dpi: u32,

    /// Vertical gap between the QR bottom and the name line, in pixels
    pub padding: u32,

    /// Text drawn above the QR code
    pub header_text: String,

    /// Typeface for the header
    pub header_font: FontSpec,

    /// Typeface for the record name
    pub name_font: FontSpec,

    /// Typeface for the location line
    pub location_font: FontSpec,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            dpi: 600,
            padding: 40,
            header_text: DEFAULT_HEADER.to_string(),
            header_font: FontSpec::family("Arial", true, 46.0),
            name_font: FontSpec::family("Arial", true, 56.0),
            location_font: FontSpec::family("Arial", false, 46.0),
        }
    }
}

impl LabelConfig {
    /// Load a configuration from a JSON file. Missing fields take their
    /// defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, LabelError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
            .map_err(|e| LabelError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self, LabelError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| LabelError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot produce a label.
    pub fn validate(&self) -> Result<(), LabelError> {
        if self.dpi == 0 {
            return Err(LabelError::Config("dpi must be positive".to_string()));
        }
        if self.dpi > MAX_DPI {
            return Err(LabelError::Config(format!(
                "dpi must be at most {}, got {}",
                MAX_DPI, self.dpi
            )));
        }
        for (role, font) in [
            ("header", &self.header_font),
            ("name", &self.name_font),
            ("location", &self.location_font),
        ] {
            if !(font.size.is_finite() && font.size > 0.0) {
                return Err(LabelError::Config(format!(
                    "{} font size must be positive, got {}",
                    role, font.size
                )));
            }
        }
        Ok(())
    }

    /// Edge length of the square canvas in pixels.
    pub fn canvas_size(&self) -> u32 {
        (LABEL_INCHES as u32).saturating_mul(self.dpi)
    }

    /// Edge length of the QR symbol in pixels.
    pub fn qr_size(&self) -> u32 {
        (QR_INCHES * self.dpi as f64).round() as u32
    }

    /// Edge length of one PDF page in points.
    pub fn page_size_pt(&self) -> f32 {
        LABEL_INCHES * POINTS_PER_INCH
    }
}
