//! # Error Types
//!
//! This module defines the error type used throughout the labelsheet library.
//!
//! Identifiers that cannot be resolved are not errors: the pipeline records
//! them in its run report and carries on with the next identifier.

use thiserror::Error;

/// Main error type for labelsheet operations
#[derive(Debug, Error)]
pub enum LabelError {
    /// Credentials were rejected by the record service
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Transport or decoding failure while looking up a record
    #[error("Lookup error: {0}")]
    Resolve(String),

    /// The QR encoder rejected the payload
    #[error("QR code error: {0}")]
    QrCode(String),

    /// Image processing error
    #[error("Image error: {0}")]
    Image(String),

    /// PDF assembly or serialization error
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Invalid or unreadable label configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Missing or malformed user input
    #[error("Invalid input: {0}")]
    Input(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
