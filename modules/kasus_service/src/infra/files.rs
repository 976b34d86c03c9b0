//! Filesystem image store
//!
//! Images land flat under the configured root as `{category}_{uuid}.{ext}`; the file name is
//! the stored reference.

use crate::contract::SignatureRef;
use crate::domain::{ImageStore, SignatureImage};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub struct FsImageStore {
    root: PathBuf,
}

impl FsImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a stored reference; references never leave the root
    pub fn path_of(&self, reference: &SignatureRef) -> Result<PathBuf> {
        let name = reference.as_str();
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            bail!("invalid image reference: '{name}'");
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn store(&self, category: &str, image: &SignatureImage) -> Result<SignatureRef> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("failed to create image directory {}", self.root.display()))?;

        let name = format!("{category}_{}.{}", Uuid::new_v4(), image.format().extension());
        let path = self.root.join(&name);
        tokio::fs::write(&path, image.bytes())
            .await
            .with_context(|| format!("failed to write image {}", path.display()))?;

        tracing::debug!(path = %path.display(), bytes = image.bytes().len(), "image stored");
        Ok(SignatureRef::new(name))
    }

    async fn remove(&self, reference: &SignatureRef) -> Result<()> {
        let path = self.path_of(reference)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("failed to remove image {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

    #[tokio::test]
    async fn stores_and_removes_images_under_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsImageStore::new(dir.path().join("ttd"));
        let image = SignatureImage::from_data_uri(PNG, 1024).unwrap();

        let reference = store.store("penilaian", &image).await.unwrap();
        assert!(reference.as_str().starts_with("penilaian_"));
        assert!(reference.as_str().ends_with(".png"));

        let path = store.path_of(&reference).unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), image.bytes());

        store.remove(&reference).await.unwrap();
        assert!(!path.exists());
        // Already gone is fine
        store.remove(&reference).await.unwrap();
    }

    #[test]
    fn references_cannot_escape_the_root() {
        let store = FsImageStore::new("/var/kasus");
        assert!(store.path_of(&SignatureRef::new("../etc/passwd")).is_err());
        assert!(store.path_of(&SignatureRef::new("a/b.png")).is_err());
        assert!(store.path_of(&SignatureRef::new("")).is_err());
    }
}
