use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

/// Length of the hex digest prefix used as a version token.
const VERSION_LEN: usize = 16;

/// A js/css entry as handed to templates: `{ "file": ..., "version": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
    pub file: String,
    pub version: String,
}

/// Resolves asset paths under the public directory and computes their
/// cache-busting version tokens.
#[derive(Debug, Clone)]
pub struct AssetResolver {
    public_dir: PathBuf,
}

impl AssetResolver {
    pub fn new(public_dir: impl Into<PathBuf>) -> Self {
        Self {
            public_dir: public_dir.into(),
        }
    }

    #[must_use]
    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }

    // Reject anything that could climb out of the public directory.
    fn map_path(&self, asset_path: &str) -> Option<PathBuf> {
        let mut pb = self.public_dir.clone();
        for comp in Path::new(asset_path.trim_start_matches('/')).components() {
            match comp {
                Component::Normal(s) => pb.push(s),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(pb)
    }

    /// First 16 hex chars of the SHA-256 of the file's content.
    ///
    /// # Errors
    ///
    /// `NotFound` for paths outside the public directory or missing files,
    /// otherwise whatever reading the file reports.
    pub fn version_token(&self, asset_path: &str) -> io::Result<String> {
        let path = self
            .map_path(asset_path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "invalid path"))?;
        if !path.is_file() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        }
        let content = fs::read(&path)?;
        let mut hasher = Sha256::new();
        hasher.update(&content);
        let digest = hasher.finalize();
        Ok(digest
            .iter()
            .take(VERSION_LEN / 2)
            .map(|b| format!("{b:02x}"))
            .collect())
    }

    /// Build an [`Asset`] entry, or log and return `None` when the file
    /// cannot be hashed.
    pub fn resolve(&self, asset_path: &str) -> Option<Asset> {
        match self.version_token(asset_path) {
            Ok(version) => Some(Asset {
                file: asset_path.to_string(),
                version,
            }),
            Err(e) => {
                warn!(
                    asset = %asset_path,
                    public_dir = %self.public_dir.display(),
                    error = %e,
                    "Asset file not found; entry skipped"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_token_is_stable_content_digest() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("js")).unwrap();
        fs::write(dir.path().join("js/app.js"), "console.log(1);").unwrap();
        fs::write(dir.path().join("js/copy.js"), "console.log(1);").unwrap();
        fs::write(dir.path().join("js/other.js"), "console.log(2);").unwrap();

        let assets = AssetResolver::new(dir.path());
        let a = assets.version_token("js/app.js").unwrap();
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(a, assets.version_token("/js/copy.js").unwrap());
        assert_ne!(a, assets.version_token("js/other.js").unwrap());
    }

    #[test]
    fn test_version_token_is_sha256_prefix() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("abc.txt"), "abc").unwrap();
        let assets = AssetResolver::new(dir.path());
        assert_eq!(assets.version_token("abc.txt").unwrap(), "ba7816bf8f01cfea");
    }

    #[test]
    fn test_missing_file_resolves_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let assets = AssetResolver::new(dir.path());
        assert!(assets.resolve("css/missing.css").is_none());
    }

    #[test]
    fn test_parent_components_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let public = dir.path().join("public");
        fs::create_dir_all(&public).unwrap();
        fs::write(dir.path().join("secret.txt"), "x").unwrap();

        let assets = AssetResolver::new(&public);
        let err = assets.version_token("../secret.txt").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
