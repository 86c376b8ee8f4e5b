//! Attachment file storage
//!
//! Attachment bytes live as plain files in a single app-owned directory,
//! one file per attachment named by the attachment id plus the source
//! file's extension. The attachment record keeps the resulting path as
//! its `uri`, so the directory layout is an implementation detail of this
//! module only.

use crate::error::{AppError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Outcome of importing a file into the store.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Absolute path of the stored copy, recorded on the attachment.
    pub uri: String,
    /// Size of the stored copy in bytes.
    pub size: u64,
}

/// File store for project attachments
#[derive(Clone)]
pub struct AttachmentFileStore {
    root: PathBuf,
}

impl AttachmentFileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Create the store directory if needed
    pub async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        tracing::info!("Attachment store initialized at: {:?}", self.root);
        Ok(())
    }

    /// Copy a source file into the store under the attachment id, keeping
    /// the source's extension (lowercased). Returns the stored path and
    /// its size as reported by the filesystem.
    pub async fn import(&self, source: &Path, attachment_id: &str) -> Result<StoredFile> {
        let file_name = match source.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}.{}", attachment_id, ext.to_lowercase()),
            None => attachment_id.to_string(),
        };
        let dest = self.root.join(file_name);

        fs::copy(source, &dest).await?;
        let size = fs::metadata(&dest).await?.len();

        tracing::debug!("Imported attachment file: {:?} ({} bytes)", dest, size);

        Ok(StoredFile {
            uri: dest.to_string_lossy().to_string(),
            size,
        })
    }

    /// Delete a stored file by its recorded uri. Missing files are fine;
    /// paths outside the store directory are refused.
    pub async fn delete(&self, uri: &str) -> Result<()> {
        let path = PathBuf::from(uri);

        if path.parent() != Some(self.root.as_path()) {
            return Err(AppError::Generic(format!(
                "Refusing to delete file outside attachment store: {}",
                uri
            )));
        }

        if !path.exists() {
            return Ok(());
        }

        fs::remove_file(&path).await?;

        tracing::debug!("Deleted attachment file: {:?}", path);

        Ok(())
    }

    /// Remove every stored file and recreate the empty directory.
    pub async fn wipe(&self) -> Result<()> {
        if self.root.exists() {
            fs::remove_dir_all(&self.root).await?;
        }
        fs::create_dir_all(&self.root).await?;

        tracing::info!("Attachment store wiped: {:?}", self.root);

        Ok(())
    }

    /// Store root directory
    pub fn root(&self) -> &Path {
        &self.root
    }
}
