//! # Label Module
//!
//! This module describes the one label type this crate renders.
//!
//! ## Modules
//!
//! - [`config`]: Label geometry and typography

pub mod config;

pub use config::{FontSpec, LabelConfig};
