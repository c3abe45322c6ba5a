//! Report types returned by the workflows
//!
//! Each workflow returns a serializable report so the binary can log a
//! one-line JSON summary of what an invocation did.

use serde::{Deserialize, Serialize};

// ============================================================================
// Discovery
// ============================================================================

/// Result of scanning an image directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Names registered by this scan, in registration order
    pub registered: Vec<String>,

    /// Accepted images that were already registered
    pub duplicates: usize,

    /// Entries skipped because they are not supported image files
    pub ignored: usize,
}

impl ScanReport {
    /// Number of newly registered images
    pub fn count(&self) -> usize {
        self.registered.len()
    }
}

// ============================================================================
// Publication
// ============================================================================

/// An image that was delivered to the channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedImage {
    /// Image name
    pub name: String,

    /// Channel message identifier, when the channel reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<i64>,
}

/// Terminal result of one publish invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PublishOutcome {
    /// One image was delivered and marked published
    Published(PublishedImage),

    /// No pending image was left to try
    NoPendingImages,
}

impl PublishOutcome {
    /// Whether an image was published
    pub fn is_published(&self) -> bool {
        matches!(self, PublishOutcome::Published(_))
    }
}

/// Everything one publish invocation did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReport {
    /// How the invocation ended
    pub outcome: PublishOutcome,

    /// Candidates marked `NotFound` on the way
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub not_found: Vec<String>,

    /// Candidates marked `NotValid` on the way
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub not_valid: Vec<String>,
}

impl PublishReport {
    pub(crate) fn new() -> Self {
        Self {
            outcome: PublishOutcome::NoPendingImages,
            not_found: Vec::new(),
            not_valid: Vec::new(),
        }
    }

    /// Name of the published image, if any
    pub fn published_name(&self) -> Option<&str> {
        match &self.outcome {
            PublishOutcome::Published(image) => Some(&image.name),
            PublishOutcome::NoPendingImages => None,
        }
    }
}

// ============================================================================
// Cleanup
// ============================================================================

/// Result of sweeping published files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupReport {
    /// Files removed from disk
    pub deleted: Vec<String>,

    /// Published records whose file was already gone
    pub already_missing: Vec<String>,

    /// Registry rows removed after their file was handled
    pub pruned_rows: usize,
}

impl CleanupReport {
    /// Number of files deleted
    pub fn count(&self) -> usize {
        self.deleted.len()
    }
}
