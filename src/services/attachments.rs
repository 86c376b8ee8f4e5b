//! Attachments service
//!
//! Attachment records live embedded on the owning project; the bytes live
//! in the attachment file store. This service keeps the two in step.

use crate::error::{AppError, Result};
use crate::models::{Attachment, Project};
use crate::store::{AttachmentFileStore, Collection, KvStore};
use std::path::Path;
use uuid::Uuid;

/// Service for managing project attachments
#[derive(Clone)]
pub struct AttachmentService {
    projects: Collection<Project>,
    files: AttachmentFileStore,
}

impl AttachmentService {
    pub fn new(kv: KvStore, files: AttachmentFileStore) -> Self {
        Self {
            projects: Collection::new(kv),
            files,
        }
    }

    /// Copy a file into the attachment store and record it on the project.
    /// The stored size comes from the copied file, not from the caller.
    pub async fn save_attachment(
        &self,
        project_id: &str,
        source: &Path,
        name: &str,
        mime_type: &str,
    ) -> Result<Attachment> {
        let Some(mut project) = self.projects.get_by_id(project_id).await? else {
            return Err(AppError::NotFound(format!(
                "Project not found: {}",
                project_id
            )));
        };

        tracing::info!("Adding attachment {} to project {}", name, project_id);

        let id = Uuid::new_v4().to_string();
        let stored = self.files.import(source, &id).await?;

        let attachment = Attachment {
            id,
            name: name.to_string(),
            mime: mime_type.to_string(),
            uri: stored.uri,
            size: stored.size,
        };

        project.attachments.push(attachment.clone());
        self.projects.save(project).await?;

        tracing::info!("Attachment created: {}", attachment.id);

        Ok(attachment)
    }

    /// Remove an attachment record and its backing file. Unknown project or
    /// attachment ids are a no-op; a failed file delete is logged and the
    /// record is removed anyway.
    pub async fn delete_attachment(&self, project_id: &str, attachment_id: &str) -> Result<()> {
        let Some(mut project) = self.projects.get_by_id(project_id).await? else {
            return Ok(());
        };

        let Some(attachment) = project
            .attachments
            .iter()
            .find(|a| a.id == attachment_id)
            .cloned()
        else {
            return Ok(());
        };

        if let Err(e) = self.files.delete(&attachment.uri).await {
            tracing::warn!(
                "Failed to delete attachment file {}: {}",
                attachment.uri,
                e
            );
        }

        project.attachments.retain(|a| a.id != attachment_id);
        self.projects.save(project).await?;

        tracing::debug!(
            "Removed attachment {} from project {}",
            attachment_id,
            project_id
        );

        Ok(())
    }

    /// List a project's attachments; empty for an unknown project.
    pub async fn list_attachments(&self, project_id: &str) -> Result<Vec<Attachment>> {
        Ok(self
            .projects
            .get_by_id(project_id)
            .await?
            .map(|p| p.attachments)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_service() -> (AttachmentService, Collection<Project>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let kv = KvStore::in_memory().await.unwrap();
        let files = AttachmentFileStore::new(temp_dir.path().join("attachments"));
        files.initialize().await.unwrap();
        (
            AttachmentService::new(kv.clone(), files),
            Collection::new(kv),
            temp_dir,
        )
    }

    #[tokio::test]
    async fn test_save_and_list_attachment() {
        let (service, projects, temp) = create_test_service().await;
        let project = projects.save(Project::new("u1", "Build")).await.unwrap();

        let source = temp.path().join("plan.PDF");
        std::fs::write(&source, b"blueprint").unwrap();

        let attachment = service
            .save_attachment(&project.id, &source, "plan.pdf", "application/pdf")
            .await
            .unwrap();

        assert_eq!(attachment.name, "plan.pdf");
        assert_eq!(attachment.size, 9);
        assert!(std::path::Path::new(&attachment.uri).exists());

        let listed = service.list_attachments(&project.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, attachment.id);
    }

    #[tokio::test]
    async fn test_save_attachment_to_missing_project() {
        let (service, _projects, temp) = create_test_service().await;

        let source = temp.path().join("photo.jpg");
        std::fs::write(&source, b"jpeg").unwrap();

        let result = service
            .save_attachment("missing", &source, "photo.jpg", "image/jpeg")
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_attachment() {
        let (service, projects, temp) = create_test_service().await;
        let project = projects.save(Project::new("u1", "Build")).await.unwrap();

        let source = temp.path().join("site.png");
        std::fs::write(&source, b"png").unwrap();
        let attachment = service
            .save_attachment(&project.id, &source, "site.png", "image/png")
            .await
            .unwrap();

        service
            .delete_attachment(&project.id, &attachment.id)
            .await
            .unwrap();

        assert!(!std::path::Path::new(&attachment.uri).exists());
        assert!(service.list_attachments(&project.id).await.unwrap().is_empty());

        // Unknown ids are silent no-ops
        service
            .delete_attachment(&project.id, &attachment.id)
            .await
            .unwrap();
        service.delete_attachment("missing", "whatever").await.unwrap();
    }
}
