//! Reports service
//!
//! Derived read-only views over one user's data: the dashboard occupancy
//! heuristic and the activity report (hours, completion rate, status
//! histogram, hours by project).

use crate::config::{PROJECT_CAPACITY, REPORT_TOP_PROJECTS};
use crate::error::Result;
use crate::models::{Project, ProjectStatus, Task, TimeLog};
use crate::store::{Collection, KvStore};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Project counts per status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdown {
    pub planning: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub on_hold: usize,
}

/// Hours logged against one project, grouped by project name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectHours {
    pub name: String,
    pub hours: f64,
}

/// Aggregated view of one user's projects, tasks, and time logs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityReport {
    pub total_hours: f64,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// Completed-task share in percent, 0 when the user has no tasks.
    pub completion_rate: f64,
    pub status_breakdown: StatusBreakdown,
    /// Top projects by logged hours, descending (name breaks ties).
    pub hours_by_project: Vec<ProjectHours>,
}

/// Service computing derived aggregates
#[derive(Clone)]
pub struct ReportService {
    projects: Collection<Project>,
    tasks: Collection<Task>,
    time_logs: Collection<TimeLog>,
}

impl ReportService {
    pub fn new(kv: KvStore) -> Self {
        Self {
            projects: Collection::new(kv.clone()),
            tasks: Collection::new(kv.clone()),
            time_logs: Collection::new(kv),
        }
    }

    /// Occupancy estimate in percent: in-progress project count against the
    /// assumed capacity, clamped to 100. A heuristic, not a schedule.
    pub async fn occupancy(&self, user_id: &str) -> Result<u8> {
        let active = self
            .projects
            .get_by_user(user_id)
            .await?
            .iter()
            .filter(|p| p.status == ProjectStatus::InProgress)
            .count() as u32;

        Ok((100 * active / PROJECT_CAPACITY).min(100) as u8)
    }

    /// Build the activity report over one user's data. Logs whose project
    /// no longer resolves still count toward total hours but are left out
    /// of the per-project grouping.
    pub async fn build_report(&self, user_id: &str) -> Result<ActivityReport> {
        let projects = self.projects.get_by_user(user_id).await?;
        let tasks = self.tasks.get_by_user(user_id).await?;
        let logs = self.time_logs.get_by_user(user_id).await?;

        let total_secs: u64 = logs.iter().map(|l| l.duration_secs).sum();
        let total_hours = total_secs as f64 / 3600.0;

        let total_tasks = tasks.len();
        let completed_tasks = tasks.iter().filter(|t| t.completed).count();
        let completion_rate = if total_tasks == 0 {
            0.0
        } else {
            100.0 * completed_tasks as f64 / total_tasks as f64
        };

        let mut status_breakdown = StatusBreakdown::default();
        for project in &projects {
            match project.status {
                ProjectStatus::Planning => status_breakdown.planning += 1,
                ProjectStatus::InProgress => status_breakdown.in_progress += 1,
                ProjectStatus::Completed => status_breakdown.completed += 1,
                ProjectStatus::OnHold => status_breakdown.on_hold += 1,
            }
        }

        let mut by_name: HashMap<String, f64> = HashMap::new();
        for log in &logs {
            let Some(project) = projects.iter().find(|p| p.id == log.project_id) else {
                tracing::warn!(
                    "Time log {} references unknown project {}",
                    log.id,
                    log.project_id
                );
                continue;
            };
            *by_name.entry(project.name.clone()).or_insert(0.0) +=
                log.duration_secs as f64 / 3600.0;
        }

        let mut hours_by_project: Vec<ProjectHours> = by_name
            .into_iter()
            .map(|(name, hours)| ProjectHours { name, hours })
            .collect();
        hours_by_project.sort_by(|a, b| {
            b.hours
                .partial_cmp(&a.hours)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });
        hours_by_project.truncate(REPORT_TOP_PROJECTS);

        Ok(ActivityReport {
            total_hours,
            total_tasks,
            completed_tasks,
            completion_rate,
            status_breakdown,
            hours_by_project,
        })
    }
}
