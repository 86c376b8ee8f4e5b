//! Projects service
//!
//! Project lifecycle plus the one cascading rule in the system: deleting
//! a project removes its attachment files and every dependent record in
//! the child collections. Deleting a user cascades to nothing.

use crate::error::Result;
use crate::models::{Appointment, Note, Project, Purchase, Task, TimeLog};
use crate::store::{AttachmentFileStore, Collection, KvStore};

/// Service for managing projects
#[derive(Clone)]
pub struct ProjectService {
    projects: Collection<Project>,
    tasks: Collection<Task>,
    notes: Collection<Note>,
    appointments: Collection<Appointment>,
    time_logs: Collection<TimeLog>,
    purchases: Collection<Purchase>,
    files: AttachmentFileStore,
}

impl ProjectService {
    pub fn new(kv: KvStore, files: AttachmentFileStore) -> Self {
        Self {
            projects: Collection::new(kv.clone()),
            tasks: Collection::new(kv.clone()),
            notes: Collection::new(kv.clone()),
            appointments: Collection::new(kv.clone()),
            time_logs: Collection::new(kv.clone()),
            purchases: Collection::new(kv),
            files,
        }
    }

    /// Create or update a project
    pub async fn save_project(&self, project: Project) -> Result<Project> {
        self.projects.save(project).await
    }

    /// Get a project by id
    pub async fn get_project(&self, id: &str) -> Result<Option<Project>> {
        self.projects.get_by_id(id).await
    }

    /// List all projects
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        self.projects.get_all().await
    }

    /// List one user's projects
    pub async fn list_projects_for_user(&self, user_id: &str) -> Result<Vec<Project>> {
        self.projects.get_by_user(user_id).await
    }

    /// Delete a project and everything hanging off it: attachment files
    /// first (a failed file delete is logged and the cascade continues),
    /// then the project record, then dependent records in every child
    /// collection. Returns `false` for an unknown id.
    pub async fn delete_project(&self, id: &str) -> Result<bool> {
        let Some(project) = self.projects.get_by_id(id).await? else {
            return Ok(false);
        };

        tracing::info!("Deleting project {} ({})", project.id, project.name);

        for attachment in &project.attachments {
            if let Err(e) = self.files.delete(&attachment.uri).await {
                tracing::warn!(
                    "Failed to delete attachment file {}: {}",
                    attachment.uri,
                    e
                );
            }
        }

        self.projects.delete(id).await?;

        let tasks = self.tasks.delete_by_project(id).await?;
        let notes = self.notes.delete_by_project(id).await?;
        let appointments = self.appointments.delete_by_project(id).await?;
        let time_logs = self.time_logs.delete_by_project(id).await?;
        let purchases = self.purchases.delete_by_project(id).await?;

        tracing::info!(
            "Project {} deleted ({} tasks, {} notes, {} appointments, {} time logs, {} purchases)",
            id,
            tasks,
            notes,
            appointments,
            time_logs,
            purchases
        );

        Ok(true)
    }
}
