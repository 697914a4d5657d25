//! # Rendering Module
//!
//! This module turns resolved records into label rasters.
//!
//! ## Modules
//!
//! - [`qr`]: QR symbol bitmap, scaled to the label's QR size
//! - [`text`]: Text measurement and drawing (outline and bitmap fonts)
//! - [`fonts`]: Font loading with fallback to the built-in bitmap font
//! - [`layout`]: Label geometry and overflow rules
//! - [`composer`]: Painting one label
//!
//! ## Usage Example
//!
//! ```
//! use labelsheet::label::{FontSpec, LabelConfig};
//! use labelsheet::record::ResolvedRecord;
//! use labelsheet::render::composer::compose_label;
//!
//! let config = LabelConfig {
//!     header_font: FontSpec::builtin(46.0),
//!     name_font: FontSpec::builtin(56.0),
//!     location_font: FontSpec::builtin(46.0),
//!     ..Default::default()
//! };
//! let record = ResolvedRecord::new(
//!     "Centrifuge Tubes",
//!     "https://app.labstep.com/perma-link/abc123",
//!     "Fridge A; Shelf 2",
//! );
//!
//! let label = compose_label(&record, &config)?;
//! assert_eq!(label.dimensions(), (1200, 1200));
//! # Ok::<(), labelsheet::LabelError>(())
//! ```

pub mod composer;
pub mod fonts;
pub mod layout;
pub mod qr;
pub mod text;

pub use composer::{Composer, LabelCanvas, compose_label};
pub use fonts::{LabelFonts, load_font_or_default};
