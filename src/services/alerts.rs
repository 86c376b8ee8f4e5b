//! Alerts service
//!
//! Alert CRUD plus deadline scanning. A scan creates one warning per
//! overdue project per UTC calendar day; rescans within the same day are
//! no-ops for already-alerted projects. A background scanner can run the
//! scan on an interval for whichever user is signed in.

use crate::error::Result;
use crate::models::{Alert, AlertKind, Project};
use crate::services::session::SessionService;
use crate::store::{Collection, KvStore};
use chrono::Utc;
use std::time::Duration;

/// Service for managing alerts
#[derive(Clone)]
pub struct AlertService {
    alerts: Collection<Alert>,
    projects: Collection<Project>,
}

impl AlertService {
    pub fn new(kv: KvStore) -> Self {
        Self {
            alerts: Collection::new(kv.clone()),
            projects: Collection::new(kv),
        }
    }

    /// Create or update an alert
    pub async fn save_alert(&self, alert: Alert) -> Result<Alert> {
        self.alerts.save(alert).await
    }

    /// Get an alert by id
    pub async fn get_alert(&self, id: &str) -> Result<Option<Alert>> {
        self.alerts.get_by_id(id).await
    }

    /// List one user's alerts
    pub async fn list_alerts_for_user(&self, user_id: &str) -> Result<Vec<Alert>> {
        self.alerts.get_by_user(user_id).await
    }

    /// Delete an alert. Unknown ids are a no-op returning `false`.
    pub async fn delete_alert(&self, id: &str) -> Result<bool> {
        self.alerts.delete(id).await
    }

    /// Mark one alert read. Returns the updated alert, or `None` for an
    /// unknown id.
    pub async fn mark_read(&self, id: &str) -> Result<Option<Alert>> {
        let Some(mut alert) = self.alerts.get_by_id(id).await? else {
            return Ok(None);
        };

        if !alert.read {
            alert.read = true;
            alert = self.alerts.save(alert).await?;
        }

        Ok(Some(alert))
    }

    /// Mark all of a user's unread alerts read; returns how many changed.
    pub async fn mark_all_read(&self, user_id: &str) -> Result<usize> {
        let mut changed = 0;

        for mut alert in self.alerts.get_by_user(user_id).await? {
            if !alert.read {
                alert.read = true;
                self.alerts.save(alert).await?;
                changed += 1;
            }
        }

        Ok(changed)
    }

    /// Create warning alerts for the user's overdue projects (deadline
    /// strictly before today, UTC). A project that already has a warning
    /// alert created today is skipped. Returns the alerts this scan created.
    pub async fn scan_deadlines(&self, user_id: &str) -> Result<Vec<Alert>> {
        let today = Utc::now().date_naive();
        let projects = self.projects.get_by_user(user_id).await?;
        let existing = self.alerts.get_by_user(user_id).await?;

        let mut created = Vec::new();

        for project in projects {
            let Some(deadline) = project.deadline else {
                continue;
            };
            if deadline >= today {
                continue;
            }

            let already_alerted = existing.iter().any(|a| {
                a.kind == AlertKind::Warning
                    && a.project_id.as_deref() == Some(project.id.as_str())
                    && a.created_at.date_naive() == today
            });
            if already_alerted {
                continue;
            }

            let mut alert = Alert::new(
                user_id,
                format!(
                    "Project \"{}\" is past its deadline ({})",
                    project.name, deadline
                ),
                AlertKind::Warning,
            );
            alert.project_id = Some(project.id.clone());

            let alert = self.alerts.save(alert).await?;

            tracing::info!("Deadline alert created for project {}", project.id);

            created.push(alert);
        }

        Ok(created)
    }

    /// Start the background deadline scanner. Every tick it scans for the
    /// current session user; with nobody signed in the tick does nothing.
    pub fn spawn_scanner(self, session: SessionService, period: Duration) {
        tokio::spawn(async move {
            tracing::info!("Starting deadline scanner");

            let mut interval = tokio::time::interval(period);

            loop {
                interval.tick().await;

                let user = match session.current_user().await {
                    Ok(Some(user)) => user,
                    Ok(None) => continue,
                    Err(e) => {
                        tracing::error!("Deadline scan could not load session: {}", e);
                        continue;
                    }
                };

                match self.scan_deadlines(&user.id).await {
                    Ok(created) if !created.is_empty() => {
                        tracing::info!("Deadline scan created {} alerts", created.len());
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!("Deadline scan failed: {}", e);
                    }
                }
            }
        });
    }
}
