//! Image record and file-name rules
//!
//! This module defines the `ImageRecord` kept by the registry and the
//! extension matching used to decide which directory entries are images.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{RegistryError, Result};
use crate::types::ImageStatus;

/// File extensions accepted as images, compared case-insensitively
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Text after the last `.` of a file name, or `None` when there is no `.`
pub fn image_extension(file_name: &str) -> Option<&str> {
    file_name.rsplit_once('.').map(|(_, ext)| ext)
}

/// Whether a file name carries one of the supported image extensions
pub fn is_supported_image(file_name: &str) -> bool {
    image_extension(file_name)
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

/// Validate that a name is a bare file name.
///
/// Names are joined onto the images directory, so anything that could
/// escape it (a path separator, `.` or `..`) is refused. `\` is only a
/// separator on Windows; elsewhere it is an ordinary file-name character.
pub fn validate_image_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || (cfg!(windows) && name.contains('\\'))
        || name.contains('\0')
    {
        return Err(RegistryError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// A registered image file and its publication status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// File base name including extension; unique within the registry
    pub name: String,

    /// Current publication status
    pub status: ImageStatus,

    /// When the image was registered
    pub created_at: DateTime<Utc>,

    /// When the status last changed
    pub updated_at: DateTime<Utc>,
}

impl ImageRecord {
    /// Create a new pending record
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_image_name(&name)?;

        let now = Utc::now();
        Ok(Self {
            name,
            status: ImageStatus::NotPublished,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether the image is still waiting to be published
    pub fn is_pending(&self) -> bool {
        self.status == ImageStatus::NotPublished
    }

    /// Move the record to `next`, refusing anything that is not a lifecycle edge
    pub fn transition_to(&mut self, next: ImageStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(RegistryError::InvalidTransition {
                name: self.name.clone(),
                from: self.status,
                to: next,
            });
        }

        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Location of the image file inside `directory`
    pub fn path_in(&self, directory: &Path) -> PathBuf {
        directory.join(&self.name)
    }
}
