//! Application entry point
//!
//! `Workdesk` owns the opened data directory (database plus attachments)
//! and hands out collections and services over it. Everything returned is
//! a cheap clone sharing the same store, so callers hold one `Workdesk`
//! and pull what they need.

use crate::config::{ATTACHMENTS_DIR, DB_FILE_NAME};
use crate::error::Result;
use crate::models::{Appointment, Purchase, Record, ScheduleEvent, TimeLog, User};
use crate::services::{
    AlertService, AttachmentService, NoteService, ProjectService, ReportService, SessionService,
    SnapshotService, TaskService,
};
use crate::store::{AttachmentFileStore, Collection, KvStore};
use std::path::Path;

/// An opened data directory
#[derive(Clone)]
pub struct Workdesk {
    kv: KvStore,
    files: AttachmentFileStore,
}

impl Workdesk {
    /// Open (or create) the data directory: the database file and the
    /// attachments directory inside it.
    pub async fn open(data_dir: &Path) -> Result<Self> {
        tracing::info!("Opening data directory: {:?}", data_dir);

        let kv = KvStore::open(&data_dir.join(DB_FILE_NAME)).await?;

        let files = AttachmentFileStore::new(data_dir.join(ATTACHMENTS_DIR));
        files.initialize().await?;

        tracing::info!("Data directory ready");

        Ok(Self { kv, files })
    }

    /// The typed collection for any entity type
    pub fn collection<T: Record>(&self) -> Collection<T> {
        Collection::new(self.kv.clone())
    }

    pub fn users(&self) -> Collection<User> {
        self.collection()
    }

    pub fn appointments(&self) -> Collection<Appointment> {
        self.collection()
    }

    pub fn time_logs(&self) -> Collection<TimeLog> {
        self.collection()
    }

    pub fn purchases(&self) -> Collection<Purchase> {
        self.collection()
    }

    pub fn schedule_events(&self) -> Collection<ScheduleEvent> {
        self.collection()
    }

    pub fn projects(&self) -> ProjectService {
        ProjectService::new(self.kv.clone(), self.files.clone())
    }

    pub fn tasks(&self) -> TaskService {
        TaskService::new(self.kv.clone())
    }

    pub fn notes(&self) -> NoteService {
        NoteService::new(self.kv.clone())
    }

    pub fn attachments(&self) -> AttachmentService {
        AttachmentService::new(self.kv.clone(), self.files.clone())
    }

    pub fn alerts(&self) -> AlertService {
        AlertService::new(self.kv.clone())
    }

    pub fn reports(&self) -> ReportService {
        ReportService::new(self.kv.clone())
    }

    pub fn session(&self) -> SessionService {
        SessionService::new(self.kv.clone())
    }

    pub fn snapshot(&self) -> SnapshotService {
        SnapshotService::new(self.kv.clone(), self.files.clone())
    }

    /// Root of the attachment file store
    pub fn attachments_dir(&self) -> &Path {
        self.files.root()
    }
}
