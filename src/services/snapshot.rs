//! Snapshot service
//!
//! Whole-state export and import for backup/restore. A snapshot carries
//! every collection as plain JSON plus a SHA-256 checksum over the
//! collections; import verifies the checksum when one is present and
//! overwrites provided collections wholesale, leaving absent ones alone.

use crate::error::{AppError, Result};
use crate::models::{
    Alert, Appointment, Note, Project, Purchase, ScheduleEvent, Task, TimeLog, User,
};
use crate::store::{AttachmentFileStore, Collection, KvStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The collections carried by a snapshot. Every field is optional so a
/// partial snapshot can restore a subset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<User>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<Project>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Task>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<Note>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointments: Option<Vec<Appointment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_logs: Option<Vec<TimeLog>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchases: Option<Vec<Purchase>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alerts: Option<Vec<Alert>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_events: Option<Vec<ScheduleEvent>>,
}

/// A full or partial export of the stored state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    /// Hex SHA-256 over the canonical JSON of the collections. Absent on
    /// snapshots produced elsewhere; import verifies it only when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    #[serde(flatten)]
    pub data: SnapshotData,
}

fn checksum(data: &SnapshotData) -> Result<String> {
    let canonical = serde_json::to_vec(data)?;
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Service for bulk export, import, and wipe
#[derive(Clone)]
pub struct SnapshotService {
    kv: KvStore,
    files: AttachmentFileStore,
    users: Collection<User>,
    projects: Collection<Project>,
    tasks: Collection<Task>,
    notes: Collection<Note>,
    appointments: Collection<Appointment>,
    time_logs: Collection<TimeLog>,
    purchases: Collection<Purchase>,
    alerts: Collection<Alert>,
    schedule_events: Collection<ScheduleEvent>,
}

impl SnapshotService {
    pub fn new(kv: KvStore, files: AttachmentFileStore) -> Self {
        Self {
            users: Collection::new(kv.clone()),
            projects: Collection::new(kv.clone()),
            tasks: Collection::new(kv.clone()),
            notes: Collection::new(kv.clone()),
            appointments: Collection::new(kv.clone()),
            time_logs: Collection::new(kv.clone()),
            purchases: Collection::new(kv.clone()),
            alerts: Collection::new(kv.clone()),
            schedule_events: Collection::new(kv.clone()),
            kv,
            files,
        }
    }

    /// Export every collection into one checksummed snapshot
    pub async fn export_data(&self) -> Result<Snapshot> {
        let data = SnapshotData {
            users: Some(self.users.get_all().await?),
            projects: Some(self.projects.get_all().await?),
            tasks: Some(self.tasks.get_all().await?),
            notes: Some(self.notes.get_all().await?),
            appointments: Some(self.appointments.get_all().await?),
            time_logs: Some(self.time_logs.get_all().await?),
            purchases: Some(self.purchases.get_all().await?),
            alerts: Some(self.alerts.get_all().await?),
            schedule_events: Some(self.schedule_events.get_all().await?),
        };

        let checksum = checksum(&data)?;

        tracing::info!("Exported data snapshot");

        Ok(Snapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            checksum: Some(checksum),
            data,
        })
    }

    /// Restore a snapshot. Each provided collection overwrites its stored
    /// array wholesale (no restamping); collections absent from the
    /// snapshot stay as they are.
    pub async fn import_data(&self, snapshot: Snapshot) -> Result<()> {
        if let Some(expected) = &snapshot.checksum {
            let computed = checksum(&snapshot.data)?;
            if &computed != expected {
                return Err(AppError::Snapshot(format!(
                    "Checksum mismatch: snapshot says {}, computed {}",
                    expected, computed
                )));
            }
        }

        let data = snapshot.data;

        if let Some(records) = data.users {
            self.users.replace_all(records).await?;
        }
        if let Some(records) = data.projects {
            self.projects.replace_all(records).await?;
        }
        if let Some(records) = data.tasks {
            self.tasks.replace_all(records).await?;
        }
        if let Some(records) = data.notes {
            self.notes.replace_all(records).await?;
        }
        if let Some(records) = data.appointments {
            self.appointments.replace_all(records).await?;
        }
        if let Some(records) = data.time_logs {
            self.time_logs.replace_all(records).await?;
        }
        if let Some(records) = data.purchases {
            self.purchases.replace_all(records).await?;
        }
        if let Some(records) = data.alerts {
            self.alerts.replace_all(records).await?;
        }
        if let Some(records) = data.schedule_events {
            self.schedule_events.replace_all(records).await?;
        }

        tracing::info!("Imported data snapshot (version {})", snapshot.version);

        Ok(())
    }

    /// Wipe everything: every stored key (collections and session alike)
    /// and the attachments directory.
    pub async fn clear_all_data(&self) -> Result<()> {
        self.kv.clear().await?;
        self.files.wipe().await?;

        tracing::info!("All data cleared");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;
    use tempfile::TempDir;

    async fn create_test_service() -> (SnapshotService, KvStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let kv = KvStore::in_memory().await.unwrap();
        let files = AttachmentFileStore::new(temp_dir.path().join("attachments"));
        files.initialize().await.unwrap();
        (SnapshotService::new(kv.clone(), files), kv, temp_dir)
    }

    async fn seed(service: &SnapshotService) {
        let project = service
            .projects
            .save(Project::new("u1", "Remodel"))
            .await
            .unwrap();
        service
            .tasks
            .save(Task::new(&project.id, "u1", "Demo walls"))
            .await
            .unwrap();
        service
            .purchases
            .save(Purchase::new(&project.id, "Lumber", 24, 312.50))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_round_trip_into_fresh_store() {
        let (service, kv, _temp) = create_test_service().await;
        seed(&service).await;

        let exported = service.export_data().await.unwrap();
        let json = serde_json::to_string(&exported).unwrap();

        // Restore from the serialized form into an empty store
        let (fresh, fresh_kv, _fresh_temp) = create_test_service().await;
        let parsed: Snapshot = serde_json::from_str(&json).unwrap();
        fresh.import_data(parsed).await.unwrap();

        for key in [
            Project::COLLECTION,
            Task::COLLECTION,
            Purchase::COLLECTION,
        ] {
            let before: serde_json::Value =
                serde_json::from_str(&kv.get(key).await.unwrap()).unwrap();
            let after: serde_json::Value =
                serde_json::from_str(&fresh_kv.get(key).await.unwrap()).unwrap();
            assert_eq!(before, after, "collection {} changed in round trip", key);
        }
    }

    #[tokio::test]
    async fn test_import_rejects_tampered_snapshot() {
        let (service, _kv, _temp) = create_test_service().await;
        seed(&service).await;

        let mut exported = service.export_data().await.unwrap();
        exported
            .data
            .tasks
            .as_mut()
            .unwrap()
            .push(Task::new("p-injected", "u1", "Smuggled in"));

        let result = service.import_data(exported).await;

        assert!(matches!(result, Err(AppError::Snapshot(_))));
    }

    #[tokio::test]
    async fn test_partial_import_leaves_other_collections() {
        let (service, _kv, _temp) = create_test_service().await;
        seed(&service).await;
        let projects_before = service.projects.get_all().await.unwrap();

        let snapshot = Snapshot {
            version: "0.0.0".to_string(),
            exported_at: Utc::now(),
            checksum: None,
            data: SnapshotData {
                tasks: Some(vec![]),
                ..SnapshotData::default()
            },
        };
        service.import_data(snapshot).await.unwrap();

        assert!(service.tasks.get_all().await.unwrap().is_empty());
        assert_eq!(
            service.projects.get_all().await.unwrap().len(),
            projects_before.len()
        );
    }

    #[tokio::test]
    async fn test_import_without_checksum_skips_verification() {
        let (service, _kv, _temp) = create_test_service().await;

        let snapshot = Snapshot {
            version: "0.0.0".to_string(),
            exported_at: Utc::now(),
            checksum: None,
            data: SnapshotData {
                notes: Some(vec![Note::new("p1", "u1", "Imported", "from elsewhere")]),
                ..SnapshotData::default()
            },
        };

        service.import_data(snapshot).await.unwrap();

        assert_eq!(service.notes.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_all_data() {
        let (service, kv, _temp) = create_test_service().await;
        seed(&service).await;
        kv.put("current_user", "{}").await.unwrap();

        let file = service.files.root().join("orphan.bin");
        std::fs::write(&file, b"bytes").unwrap();

        service.clear_all_data().await.unwrap();

        assert!(service.projects.get_all().await.unwrap().is_empty());
        assert!(kv.get("current_user").await.is_none());
        assert!(!file.exists());
        assert!(service.files.root().exists());
    }
}
