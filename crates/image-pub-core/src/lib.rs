//! Core domain models and types for image-pub
//!
//! This crate contains the image record, its publication status and the
//! rules governing how a status may change, plus the file-name checks
//! shared by discovery and publication.

pub mod error;
pub mod image;
pub mod types;

// Re-exports for convenience
pub use error::{RegistryError, Result};
pub use image::{image_extension, is_supported_image, validate_image_name, ImageRecord, SUPPORTED_EXTENSIONS};
pub use types::ImageStatus;
