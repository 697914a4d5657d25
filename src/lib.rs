//! # Labelsheet - QR Identification Labels
//!
//! Labelsheet turns a list of inventory record identifiers into a printable
//! PDF of 2×2 inch labels, one label per page. Each label carries:
//!
//! - **Header**: a fixed title line above the QR code
//! - **QR code**: the record's permanent link
//! - **Location**: where the record is stored
//! - **Name**: the record's human-readable title
//!
//! ## Quick Start
//!
//! ```no_run
//! use labelsheet::{
//!     label::LabelConfig,
//!     pipeline,
//!     render::Composer,
//!     resolve::LabstepClient,
//!     sheet::SheetWriter,
//! };
//!
//! # async fn run() -> Result<(), labelsheet::LabelError> {
//! let client = LabstepClient::authenticate(
//!     "https://api.labstep.com",
//!     "me@lab.org",
//!     "api-key",
//! )
//! .await?;
//!
//! let config = LabelConfig::default();
//! let composer = Composer::new(config.clone());
//! let mut sheet = SheetWriter::new(config.page_size_pt());
//!
//! let report = pipeline::generate_sheet(&[1, 2, 42], &client, &composer, &mut sheet).await?;
//! sheet.save("labels.pdf".as_ref())?;
//! println!("{} labels, unresolved: {:?}", report.pages_written, report.invalid_ids);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`label`] | Label geometry and typography configuration |
//! | [`record`] | Resolved records, permalinks, location aggregation |
//! | [`render`] | QR, text, layout and label composition |
//! | [`resolve`] | Identifier lookup (item, then group) |
//! | [`sheet`] | Multi-page PDF output |
//! | [`collect`] | Identifier parsing and interactive input |
//! | [`pipeline`] | Resolve → compose → write, per identifier |
//! | [`report`] | End-of-run summary |
//! | [`error`] | Error types |

pub mod collect;
pub mod error;
pub mod label;
pub mod pipeline;
pub mod record;
pub mod render;
pub mod report;
pub mod resolve;
pub mod sheet;

// Re-exports for convenience
pub use error::LabelError;
pub use label::LabelConfig;
pub use record::ResolvedRecord;
pub use render::{Composer, compose_label};
