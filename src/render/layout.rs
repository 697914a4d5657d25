//! Label geometry.
//!
//! Everything about *where* things go on a label is decided here, before any
//! pixel is touched. Regions stack top to bottom:
//!
//! ```text
//! +--------------------------+
//! |        HEADER TEXT       |  just above the QR, skipped if y <= 0
//! |        +--------+        |
//! |        |   QR   |        |  top at (canvas - qr) / 3
//! |        +--------+        |
//! |        location          |  midway between QR and name, raised 50 px
//! |        Name Line         |  qr bottom + padding, skipped if clipped
//! +--------------------------+
//! ```
//!
//! Centering uses measured ink widths, `(container - content) / 2` with
//! floor division, so content wider than the canvas gets a negative x.

use super::fonts::LabelFonts;
use super::text::TextBounds;
use crate::label::LabelConfig;
use crate::record::ResolvedRecord;

/// Header sits this many pixels lower than flush against the QR top.
pub const HEADER_DROP: i64 = 50;

/// Location line is raised this many pixels above the QR–name midpoint.
pub const LOCATION_RAISE: i64 = 50;

/// Extra rows below the measured location ink in its overlay.
pub const LOCATION_SLACK: u32 = 10;

/// Sample string whose ink height defines the name line height.
pub const LINE_HEIGHT_SAMPLE: &str = "Hg";

/// An axis-aligned pixel rectangle. `x`/`y` may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// Where one text region is drawn, and whether it is drawn at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPlacement {
    /// Drawing origin (top-left of the line box)
    pub x: i64,
    pub y: i64,
    /// Measured ink box relative to the origin
    pub bounds: TextBounds,
    /// False when the overflow rule suppresses this region
    pub visible: bool,
}

/// Resolved geometry for one label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelLayout {
    pub canvas_size: u32,
    pub qr: Rect,
    pub header: TextPlacement,
    pub name: TextPlacement,
    /// Height of one name line, from [`LINE_HEIGHT_SAMPLE`]
    pub name_line_height: i64,
    /// Placement of the location overlay on the canvas
    pub location: TextPlacement,
    /// The transparent overlay the location text is drawn into
    pub location_overlay: Rect,
}

/// Floor division for a positive divisor, matching how pixel offsets round
/// when content is wider than its container.
fn floor_div(value: i64, divisor: i64) -> i64 {
    value.div_euclid(divisor)
}

/// Offset that centers `content` within `container`.
pub fn center_offset(container: i64, content: i64) -> i64 {
    floor_div(container - content, 2)
}

impl LabelLayout {
    /// Compute the layout of `record` under `config` with `fonts`.
    pub fn compute(config: &LabelConfig, fonts: &LabelFonts, record: &ResolvedRecord) -> Self {
        let canvas = config.canvas_size() as i64;
        let qr_size = config.qr_size() as i64;

        let qr = Rect {
            x: center_offset(canvas, qr_size),
            y: floor_div(canvas - qr_size, 3),
            width: qr_size as u32,
            height: qr_size as u32,
        };
        let qr_bottom = qr.y + qr_size;

        // Header: flush above the QR, then dropped into its quiet zone.
        let header_bounds = fonts.header.bbox(&config.header_text);
        let header_y = qr.y - header_bounds.height() + HEADER_DROP;
        let header = TextPlacement {
            x: center_offset(canvas, header_bounds.width()),
            y: header_y,
            bounds: header_bounds,
            visible: header_y > 0,
        };

        // Name: a single line below the QR, dropped entirely rather than
        // drawn clipped at the bottom edge.
        let name_line_height = fonts.name.bbox(LINE_HEIGHT_SAMPLE).height();
        let name_bounds = fonts.name.bbox(&record.display_name);
        let name_y = qr_bottom + config.padding as i64;
        let name = TextPlacement {
            x: center_offset(canvas, name_bounds.width()),
            y: name_y,
            bounds: name_bounds,
            visible: name_y + name_line_height < canvas,
        };

        // Location: centered on the gap between QR and name, biased upward.
        // No overflow check.
        let location_bounds = fonts.location.bbox(&record.location_text);
        let location_height = location_bounds.height();
        let location_y = qr_bottom + floor_div(name_y - qr_bottom, 2)
            - floor_div(location_height, 2)
            - LOCATION_RAISE;
        let location_x = center_offset(canvas, location_bounds.width());
        let location = TextPlacement {
            x: location_x,
            y: location_y,
            bounds: location_bounds,
            visible: true,
        };
        let location_overlay = Rect {
            x: location_x,
            y: location_y,
            width: location_bounds.width().max(0) as u32,
            height: location_height.max(0) as u32 + LOCATION_SLACK,
        };

        if !header.visible {
            tracing::debug!(header_y, "Header would start above the canvas, skipping");
        }
        if !name.visible {
            tracing::debug!(
                name_y,
                name_line_height,
                canvas,
                "Name line would be clipped at the bottom, skipping"
            );
        }

        Self {
            canvas_size: canvas as u32,
            qr,
            header,
            name,
            name_line_height,
            location,
            location_overlay,
        }
    }
}
