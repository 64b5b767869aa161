//! Shared key generation for storage backends.
//!
//! Key format: `{folder}/{filename}`, where the folder names the owning
//! record (e.g. `bookings/{id}`).

use crate::traits::{StorageError, StorageResult};

/// Generate a storage key for the given folder and filename.
///
/// All backends must use this format for consistency. Rejects components
/// that would escape the folder hierarchy.
pub fn generate_storage_key(folder: &str, filename: &str) -> StorageResult<String> {
    for part in [folder, filename] {
        if part.is_empty() || part.contains("..") || part.starts_with('/') {
            return Err(StorageError::InvalidKey(format!(
                "Invalid storage key component: {}",
                part
            )));
        }
    }
    Ok(format!(
        "{}/{}",
        folder.trim_end_matches('/'),
        filename.trim_start_matches('/')
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_folder_and_filename() {
        let key = generate_storage_key("bookings/abc", "passport.jpg").unwrap();
        assert_eq!(key, "bookings/abc/passport.jpg");
    }

    #[test]
    fn rejects_traversal_components() {
        assert!(generate_storage_key("../etc", "x").is_err());
        assert!(generate_storage_key("bookings", "../../secret").is_err());
        assert!(generate_storage_key("/absolute", "x").is_err());
        assert!(generate_storage_key("", "x").is_err());
    }
}
