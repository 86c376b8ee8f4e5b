//! Entity records
//!
//! Typed records for every persisted collection. JSON field names are
//! camelCase to preserve the on-device layout; enum values are snake_case
//! strings. The `Record` trait binds each type to its collection key and
//! gives the repository access to ids and timestamps.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// A persisted entity: one collection key, an opaque string id, and
/// repository-managed timestamps.
pub trait Record:
    Clone + std::fmt::Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Storage key of the collection holding this entity type.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn set_created_at(&mut self, at: DateTime<Utc>);
    fn set_updated_at(&mut self, at: DateTime<Utc>);
}

/// Entities owned by a user.
pub trait UserScoped: Record {
    fn user_id(&self) -> &str;
}

/// Entities that belong (or may belong) to a project.
pub trait ProjectScoped: Record {
    fn project_id(&self) -> Option<&str>;
}

/// Serde helper for "HH:mm" clock strings (appointments, schedule events).
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

fn now() -> DateTime<Utc> {
    Utc::now()
}

// ===== Users =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    Collaborator,
}

/// Per-user preferences carried on the user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_true() -> bool {
    true
}

fn default_theme() -> String {
    "light".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            theme: default_theme(),
            language: default_language(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub weekly_hours: u32,
    pub daily_hours: u32,
    /// Argon2id PHC string; never a plaintext password. Absent for users
    /// that were imported without credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub settings: UserSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        let at = now();
        Self {
            id: String::new(),
            name: name.into(),
            email: email.into(),
            role,
            weekly_hours: 40,
            daily_hours: 8,
            password_hash: None,
            settings: UserSettings::default(),
            created_at: at,
            updated_at: at,
        }
    }
}

impl Record for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

// ===== Projects =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Planning,
    InProgress,
    Completed,
    OnHold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// A person listed on a project's team. `Task.assigned_to` references the
/// member id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub role: Option<String>,
}

/// Attachment metadata embedded in `Project.attachments`. The backing file
/// lives in the attachments directory, named after the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub mime: String,
    /// Local filesystem path of the copied file.
    pub uri: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub priority: Priority,
    /// Derived completed-task share, 0-100. Maintained by the task service
    /// roll-up; a project with no tasks keeps its last value.
    pub progress: u8,
    pub start_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub team: Vec<TeamMember>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        let at = now();
        Self {
            id: String::new(),
            user_id: user_id.into(),
            name: name.into(),
            description: None,
            status: ProjectStatus::Planning,
            priority: Priority::Medium,
            progress: 0,
            start_date: None,
            deadline: None,
            team: Vec::new(),
            attachments: Vec::new(),
            created_at: at,
            updated_at: at,
        }
    }
}

impl Record for Project {
    const COLLECTION: &'static str = "projects";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

impl UserScoped for Project {
    fn user_id(&self) -> &str {
        &self.user_id
    }
}

// ===== Tasks =====

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default)]
    pub id: String,
    pub project_id: String,
    pub user_id: String,
    pub title: String,
    pub completed: bool,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    /// Team member id on the owning project, when assigned.
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(
        project_id: impl Into<String>,
        user_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        let at = now();
        Self {
            id: String::new(),
            project_id: project_id.into(),
            user_id: user_id.into(),
            title: title.into(),
            completed: false,
            priority: Priority::Medium,
            due_date: None,
            assigned_to: None,
            created_at: at,
            updated_at: at,
        }
    }
}

impl Record for Task {
    const COLLECTION: &'static str = "tasks";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

impl UserScoped for Task {
    fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl ProjectScoped for Task {
    fn project_id(&self) -> Option<&str> {
        Some(&self.project_id)
    }
}

// ===== Notes =====

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(default)]
    pub id: String,
    pub project_id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(
        project_id: impl Into<String>,
        user_id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let at = now();
        Self {
            id: String::new(),
            project_id: project_id.into(),
            user_id: user_id.into(),
            title: title.into(),
            content: content.into(),
            created_at: at,
            updated_at: at,
        }
    }
}

impl Record for Note {
    const COLLECTION: &'static str = "notes";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

impl UserScoped for Note {
    fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl ProjectScoped for Note {
    fn project_id(&self) -> Option<&str> {
        Some(&self.project_id)
    }
}

// ===== Appointments =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Done,
    Canceled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    pub project_id: Option<String>,
    pub title: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub priority: Priority,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Self {
        let at = now();
        Self {
            id: String::new(),
            user_id: user_id.into(),
            project_id: None,
            title: title.into(),
            date,
            time,
            priority: Priority::Medium,
            status: AppointmentStatus::Scheduled,
            created_at: at,
            updated_at: at,
        }
    }
}

impl Record for Appointment {
    const COLLECTION: &'static str = "appointments";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

impl UserScoped for Appointment {
    fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl ProjectScoped for Appointment {
    fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }
}

// ===== Time Logs =====

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeLog {
    #[serde(default)]
    pub id: String,
    pub project_id: String,
    pub user_id: String,
    pub start: DateTime<Utc>,
    /// Tracked duration in seconds.
    #[serde(rename = "duration")]
    pub duration_secs: u64,
    pub description: Option<String>,
    /// Placeholder carried over from the persisted layout; no sync engine
    /// exists behind it.
    #[serde(default)]
    pub synced: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimeLog {
    pub fn new(
        project_id: impl Into<String>,
        user_id: impl Into<String>,
        start: DateTime<Utc>,
        duration_secs: u64,
    ) -> Self {
        let at = now();
        Self {
            id: String::new(),
            project_id: project_id.into(),
            user_id: user_id.into(),
            start,
            duration_secs,
            description: None,
            synced: false,
            created_at: at,
            updated_at: at,
        }
    }
}

impl Record for TimeLog {
    const COLLECTION: &'static str = "time_logs";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

impl UserScoped for TimeLog {
    fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl ProjectScoped for TimeLog {
    fn project_id(&self) -> Option<&str> {
        Some(&self.project_id)
    }
}

// ===== Purchases =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    #[default]
    Planned,
    Purchased,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    #[serde(default)]
    pub id: String,
    pub project_id: String,
    pub item: String,
    pub quantity: u32,
    pub price: f64,
    pub status: PurchaseStatus,
    /// Placeholder carried over from the persisted layout; no sync engine
    /// exists behind it.
    #[serde(default)]
    pub synced: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Purchase {
    pub fn new(project_id: impl Into<String>, item: impl Into<String>, quantity: u32, price: f64) -> Self {
        let at = now();
        Self {
            id: String::new(),
            project_id: project_id.into(),
            item: item.into(),
            quantity,
            price,
            status: PurchaseStatus::Planned,
            synced: false,
            created_at: at,
            updated_at: at,
        }
    }
}

impl Record for Purchase {
    const COLLECTION: &'static str = "purchases";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

impl ProjectScoped for Purchase {
    fn project_id(&self) -> Option<&str> {
        Some(&self.project_id)
    }
}

// ===== Alerts =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    #[default]
    Info,
    Warning,
    Error,
    Success,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    pub project_id: Option<String>,
    pub task_id: Option<String>,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Alert {
    pub fn new(user_id: impl Into<String>, message: impl Into<String>, kind: AlertKind) -> Self {
        let at = now();
        Self {
            id: String::new(),
            user_id: user_id.into(),
            project_id: None,
            task_id: None,
            message: message.into(),
            kind,
            read: false,
            created_at: at,
            updated_at: at,
        }
    }
}

impl Record for Alert {
    const COLLECTION: &'static str = "alerts";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

impl UserScoped for Alert {
    fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl ProjectScoped for Alert {
    fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }
}

// ===== Schedule Events =====

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEvent {
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    pub project_id: Option<String>,
    pub title: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduleEvent {
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        let at = now();
        Self {
            id: String::new(),
            user_id: user_id.into(),
            project_id: None,
            title: title.into(),
            date,
            start_time,
            end_time,
            created_at: at,
            updated_at: at,
        }
    }
}

impl Record for ScheduleEvent {
    const COLLECTION: &'static str = "schedule_events";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

impl UserScoped for ScheduleEvent {
    fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl ProjectScoped for ScheduleEvent {
    fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_json_shape() {
        let mut project = Project::new("u1", "Kitchen remodel");
        project.status = ProjectStatus::InProgress;
        project.deadline = NaiveDate::from_ymd_opt(2025, 3, 1);

        let value = serde_json::to_value(&project).unwrap();

        assert_eq!(value["userId"], "u1");
        assert_eq!(value["status"], "in_progress");
        assert_eq!(value["priority"], "medium");
        assert_eq!(value["deadline"], "2025-03-01");
        assert!(value["createdAt"].is_string());
    }

    #[test]
    fn test_user_hash_stays_out_of_json_when_absent() {
        let user = User::new("Ana", "ana@example.com", Role::Collaborator);

        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("passwordHash").is_none());

        let mut with_hash = user;
        with_hash.password_hash = Some("$argon2id$stub".to_string());
        let value = serde_json::to_value(&with_hash).unwrap();
        assert_eq!(value["passwordHash"], "$argon2id$stub");
    }

    #[test]
    fn test_appointment_time_round_trip() {
        let appointment = Appointment::new(
            "u1",
            "Site visit",
            NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
        );

        let value = serde_json::to_value(&appointment).unwrap();
        assert_eq!(value["time"], "14:30");

        let parsed: Appointment = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.time, appointment.time);
    }

    #[test]
    fn test_alert_type_field_name() {
        let alert = Alert::new("u1", "Deadline passed", AlertKind::Warning);

        let value = serde_json::to_value(&alert).unwrap();
        assert_eq!(value["type"], "warning");
        assert_eq!(value["read"], false);
    }

    #[test]
    fn test_time_log_duration_field_name() {
        let log = TimeLog::new("p1", "u1", Utc::now(), 5400);

        let value = serde_json::to_value(&log).unwrap();
        assert_eq!(value["duration"], 5400);
        assert_eq!(value["synced"], false);
    }

    #[test]
    fn test_user_settings_defaults_when_missing() {
        let value = serde_json::json!({
            "id": "u1",
            "name": "Ana",
            "email": "ana@example.com",
            "role": "admin",
            "weeklyHours": 40,
            "dailyHours": 8,
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        });

        let user: User = serde_json::from_value(value).unwrap();
        assert_eq!(user.role, Role::Admin);
        assert!(user.settings.notifications_enabled);
        assert_eq!(user.settings.theme, "light");
        assert!(user.password_hash.is_none());
    }

    #[test]
    fn test_project_tolerates_missing_collections() {
        let value = serde_json::json!({
            "id": "p1",
            "userId": "u1",
            "name": "Bare",
            "description": null,
            "status": "planning",
            "priority": "low",
            "progress": 0,
            "startDate": null,
            "deadline": null,
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        });

        let project: Project = serde_json::from_value(value).unwrap();
        assert!(project.team.is_empty());
        assert!(project.attachments.is_empty());
    }
}
