//! Utility functions for artifact path handling

use crate::config::FileCollisionAction;
use std::path::{Path, PathBuf};

/// Maximum number of rename attempts when resolving file collisions
const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// Get a unique path for an artifact, handling collisions according to the
/// specified action
///
/// # Arguments
///
/// * `path` - The desired artifact path
/// * `action` - How to handle an existing file at that path
///
/// # Returns
///
/// Returns the final path to use. For `Rename`, this may have a ` (n)`
/// suffix added. For `Skip`, returns an `AlreadyExists` error if the file
/// exists. For `Overwrite`, returns the original path unchanged.
///
/// # Examples
///
/// ```
/// use image_dl::utils::unique_artifact_path;
/// use image_dl::config::FileCollisionAction;
/// use std::path::Path;
///
/// let path = Path::new("/tmp/237.jpg");
/// let unique = unique_artifact_path(path, FileCollisionAction::Rename).unwrap();
/// // If /tmp/237.jpg exists, returns /tmp/237 (1).jpg
/// // If that exists too, returns /tmp/237 (2).jpg, etc.
/// ```
pub fn unique_artifact_path(
    path: &Path,
    action: FileCollisionAction,
) -> std::io::Result<PathBuf> {
    match action {
        FileCollisionAction::Overwrite => Ok(path.to_path_buf()),
        FileCollisionAction::Skip => {
            if path.exists() {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    format!(
                        "file '{}' already exists and collision action is skip",
                        path.display()
                    ),
                ));
            }
            Ok(path.to_path_buf())
        }
        FileCollisionAction::Rename => {
            if !path.exists() {
                return Ok(path.to_path_buf());
            }

            let stem = path.file_stem().and_then(|s| s.to_str()).ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("cannot extract file stem from '{}'", path.display()),
                )
            })?;

            let extension = path.extension().and_then(|e| e.to_str());

            let parent = path.parent().ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("cannot extract parent directory from '{}'", path.display()),
                )
            })?;

            // Try adding (1), (2), (3), ... until we find a unique name
            for i in 1..=MAX_RENAME_ATTEMPTS {
                let new_name = match extension {
                    Some(ext) => format!("{} ({}).{}", stem, i, ext),
                    None => format!("{} ({})", stem, i),
                };
                let new_path = parent.join(new_name);
                if !new_path.exists() {
                    return Ok(new_path);
                }
            }

            Err(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "could not find unique filename after 9999 attempts",
            ))
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn nonexistent_file_returns_original_path_for_all_actions() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("237.jpg");

        assert_eq!(
            unique_artifact_path(&path, FileCollisionAction::Rename).unwrap(),
            path
        );
        assert_eq!(
            unique_artifact_path(&path, FileCollisionAction::Overwrite).unwrap(),
            path
        );
        assert_eq!(
            unique_artifact_path(&path, FileCollisionAction::Skip).unwrap(),
            path
        );
    }

    #[test]
    fn rename_appends_numbered_suffix() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("237.jpg");

        fs::write(&path, "original").unwrap();

        let unique = unique_artifact_path(&path, FileCollisionAction::Rename).unwrap();
        assert_eq!(unique, temp_dir.path().join("237 (1).jpg"));

        fs::write(&unique, "first rename").unwrap();
        let unique2 = unique_artifact_path(&path, FileCollisionAction::Rename).unwrap();
        assert_eq!(unique2, temp_dir.path().join("237 (2).jpg"));
    }

    #[test]
    fn rename_without_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("artifact");

        fs::write(&path, "original").unwrap();

        let unique = unique_artifact_path(&path, FileCollisionAction::Rename).unwrap();
        assert_eq!(unique, temp_dir.path().join("artifact (1)"));
    }

    #[test]
    fn rename_finds_first_free_slot() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("237.jpg");

        fs::write(&path, "original").unwrap();
        fs::write(temp_dir.path().join("237 (1).jpg"), "first").unwrap();
        fs::write(temp_dir.path().join("237 (2).jpg"), "second").unwrap();

        let unique = unique_artifact_path(&path, FileCollisionAction::Rename).unwrap();
        assert_eq!(unique, temp_dir.path().join("237 (3).jpg"));
    }

    #[test]
    fn overwrite_returns_original_path_when_file_exists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("237.jpg");

        fs::write(&path, "original").unwrap();

        let result = unique_artifact_path(&path, FileCollisionAction::Overwrite).unwrap();
        assert_eq!(result, path);
    }

    #[test]
    fn skip_errors_when_file_exists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("237.jpg");

        fs::write(&path, "original").unwrap();

        let err = unique_artifact_path(&path, FileCollisionAction::Skip).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::AlreadyExists);
        assert!(err.to_string().contains("237.jpg"));
    }
}
