//! Tasks service
//!
//! Task lifecycle and the progress roll-up: every task mutation recomputes
//! the affected project's completed-task share and persists it on the
//! project record. A project with zero tasks keeps its last progress value.

use crate::error::Result;
use crate::models::{Project, Task};
use crate::store::{Collection, KvStore};

/// Service for managing tasks
#[derive(Clone)]
pub struct TaskService {
    tasks: Collection<Task>,
    projects: Collection<Project>,
}

impl TaskService {
    pub fn new(kv: KvStore) -> Self {
        Self {
            tasks: Collection::new(kv.clone()),
            projects: Collection::new(kv),
        }
    }

    /// Create or update a task, then refresh progress on the affected
    /// project. A save that moves the task to a different project refreshes
    /// both the old and the new one.
    pub async fn save_task(&self, task: Task) -> Result<Task> {
        let previous = if task.id.is_empty() {
            None
        } else {
            self.tasks.get_by_id(&task.id).await?
        };

        let task = self.tasks.save(task).await?;

        self.recompute_progress(&task.project_id).await?;
        if let Some(previous) = previous {
            if previous.project_id != task.project_id {
                self.recompute_progress(&previous.project_id).await?;
            }
        }

        Ok(task)
    }

    /// Get a task by id
    pub async fn get_task(&self, id: &str) -> Result<Option<Task>> {
        self.tasks.get_by_id(id).await
    }

    /// List a project's tasks
    pub async fn list_tasks_for_project(&self, project_id: &str) -> Result<Vec<Task>> {
        self.tasks.get_by_project(project_id).await
    }

    /// List one user's tasks
    pub async fn list_tasks_for_user(&self, user_id: &str) -> Result<Vec<Task>> {
        self.tasks.get_by_user(user_id).await
    }

    /// Flip a task's completed flag and refresh progress. Returns the
    /// updated task, or `None` for an unknown id.
    pub async fn toggle_task(&self, id: &str) -> Result<Option<Task>> {
        let Some(mut task) = self.tasks.get_by_id(id).await? else {
            return Ok(None);
        };

        task.completed = !task.completed;
        let task = self.tasks.save(task).await?;

        self.recompute_progress(&task.project_id).await?;

        Ok(Some(task))
    }

    /// Delete a task and refresh the owning project's progress. Unknown ids
    /// are a no-op returning `false`.
    pub async fn delete_task(&self, id: &str) -> Result<bool> {
        let Some(task) = self.tasks.get_by_id(id).await? else {
            return Ok(false);
        };

        self.tasks.delete(id).await?;
        self.recompute_progress(&task.project_id).await?;

        Ok(true)
    }

    /// Recompute `progress = round(100 * completed / total)` over the
    /// project's current task set and persist it. With no tasks the stored
    /// value stays as it is.
    pub async fn recompute_progress(&self, project_id: &str) -> Result<()> {
        let tasks = self.tasks.get_by_project(project_id).await?;

        if tasks.is_empty() {
            tracing::debug!("Project {} has no tasks, progress unchanged", project_id);
            return Ok(());
        }

        let completed = tasks.iter().filter(|t| t.completed).count();
        let progress = ((100.0 * completed as f64) / tasks.len() as f64).round() as u8;

        let Some(mut project) = self.projects.get_by_id(project_id).await? else {
            tracing::debug!("Project {} not found, skipping progress update", project_id);
            return Ok(());
        };

        if project.progress != progress {
            project.progress = progress;
            self.projects.save(project).await?;
            tracing::debug!("Project {} progress now {}%", project_id, progress);
        }

        Ok(())
    }
}
