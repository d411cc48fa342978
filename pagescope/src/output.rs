//! Saving result text to disk.

use std::path::Path;
use tracing::{info, warn};

use crate::errors::PersistenceError;

/// Writes `text` verbatim to `path`, replacing any existing file.
///
/// # Errors
///
/// [`PersistenceError::WriteFailed`] when the file cannot be written.
pub fn save_report(path: impl AsRef<Path>, text: &str) -> Result<(), PersistenceError> {
    let path = path.as_ref();
    std::fs::write(path, text).map_err(|e| {
        warn!(path = %path.display(), error = %e, "Failed to save results");
        PersistenceError::write(path, e)
    })?;
    info!(path = %path.display(), bytes = text.len(), "Results saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");
        let text = "Found 1 elements matching 'p':\n\n--- Element 1 ---\nText: ünïcode\n\n";

        save_report(&path, text).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");
        save_report(&path, "first, longer text").unwrap();
        save_report(&path, "second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_save_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("results.txt");
        let err = save_report(&path, "x").unwrap_err();
        assert!(err.to_string().starts_with("Error saving"));
    }
}
