//! Fixtures shared by the end-to-end tests under `tests/`

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::path::{Path, PathBuf};

/// Random lowercase alphanumeric stem
pub fn random_stem(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}

/// Random image name with the given extension
pub fn random_image_name(extension: &str) -> String {
    format!("{}.{}", random_stem(12), extension)
}

/// Write a placeholder image file
///
/// Contents are ASCII so request bodies stay matchable as text.
pub fn write_image(directory: &Path, name: &str) -> PathBuf {
    write_file(directory, name, format!("image fixture {}", name).as_bytes())
}

/// Write a non-image file
pub fn write_other(directory: &Path, name: &str) -> PathBuf {
    write_file(directory, name, b"not an image")
}

fn write_file(directory: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = directory.join(name);
    std::fs::write(&path, contents)
        .unwrap_or_else(|e| panic!("writing {}: {}", path.display(), e));
    path
}
