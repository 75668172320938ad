use crate::Result;
use std::path::{Path, PathBuf};

/// Throwaway Chrome user-data directory, removed on drop.
///
/// Every launch gets its own so concurrent batches never share cookies,
/// cache or a profile lock.
#[derive(Debug)]
pub struct TempProfile {
    path: PathBuf,
}

impl TempProfile {
    pub fn create() -> Result<Self> {
        let path = tempfile::Builder::new()
            .prefix("rate-scout-profile-")
            .tempdir()?
            .keep();

        tracing::debug!("Created temporary Chrome profile at {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempProfile {
    fn drop(&mut self) {
        if self.path.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.path) {
                tracing::debug!(
                    "Could not remove temporary profile {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_created_and_cleaned_up() {
        let profile = TempProfile::create().unwrap();
        let path = profile.path().to_path_buf();

        assert!(path.is_dir());
        assert!(
            path.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("rate-scout-profile-")
        );

        std::fs::write(path.join("Local State"), "{}").unwrap();
        drop(profile);

        assert!(!path.exists());
    }

    #[test]
    fn test_profiles_do_not_collide() {
        let a = TempProfile::create().unwrap();
        let b = TempProfile::create().unwrap();

        assert_ne!(a.path(), b.path());
    }
}
