//! Generic entity repository
//!
//! One `Collection<T>` per entity type, all sharing the same shape: the
//! whole collection is a single JSON array under the entity's key, and
//! every mutation is load-all / mutate / write-all under that key's write
//! lock. Collections stay small on a single-user device, so one
//! abstraction serves all nine entity types.
//!
//! Records are decoded individually on load: a malformed record is logged
//! and dropped rather than surfaced as an untyped value or a collection
//! failure.

use crate::error::Result;
use crate::models::{ProjectScoped, Record, UserScoped};
use crate::store::KvStore;
use chrono::Utc;
use std::marker::PhantomData;
use uuid::Uuid;

/// Typed repository over one stored collection.
pub struct Collection<T: Record> {
    kv: KvStore,
    _entity: PhantomData<T>,
}

impl<T: Record> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            kv: self.kv.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Record> Collection<T> {
    pub fn new(kv: KvStore) -> Self {
        Self {
            kv,
            _entity: PhantomData,
        }
    }

    /// Load and decode the stored collection. Absent key, unreadable value,
    /// and malformed records all degrade to fewer (or zero) records.
    async fn load(&self) -> Vec<T> {
        let Some(raw) = self.kv.get(T::COLLECTION).await else {
            return Vec::new();
        };

        let values: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(e) => {
                tracing::error!(
                    "Collection {} is not a JSON array, treating as empty: {}",
                    T::COLLECTION,
                    e
                );
                return Vec::new();
            }
        };

        let mut records = Vec::with_capacity(values.len());
        for value in values {
            match serde_json::from_value::<T>(value) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("Dropping malformed record in {}: {}", T::COLLECTION, e);
                }
            }
        }

        records
    }

    /// Serialize and write the whole collection back.
    async fn write(&self, records: &[T]) -> Result<()> {
        let json = serde_json::to_string(records)?;
        self.kv.put(T::COLLECTION, &json).await
    }

    /// The full collection, or empty when nothing was stored yet.
    pub async fn get_all(&self) -> Result<Vec<T>> {
        Ok(self.load().await)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<T>> {
        Ok(self.load().await.into_iter().find(|r| r.id() == id))
    }

    /// Upsert by id: replace the stored record in place, or append a new
    /// one (generating a UUID when the incoming id is empty). Appends stamp
    /// `created_at`; every save refreshes `updated_at`. Returns the record
    /// as persisted.
    pub async fn save(&self, mut record: T) -> Result<T> {
        let _guard = self.kv.write_lock(T::COLLECTION).await;

        let mut records = self.load().await;
        let now = Utc::now();

        if record.id().is_empty() {
            record.set_id(Uuid::new_v4().to_string());
        }
        record.set_updated_at(now);

        match records.iter().position(|r| r.id() == record.id()) {
            Some(index) => {
                records[index] = record.clone();
            }
            None => {
                record.set_created_at(now);
                records.push(record.clone());
            }
        }

        self.write(&records).await?;

        tracing::debug!("Saved record {} in {}", record.id(), T::COLLECTION);
        Ok(record)
    }

    /// Remove one record by id. Deleting a missing id is a no-op and
    /// returns `false`.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let _guard = self.kv.write_lock(T::COLLECTION).await;

        let mut records = self.load().await;
        let before = records.len();
        records.retain(|r| r.id() != id);

        if records.len() == before {
            return Ok(false);
        }

        self.write(&records).await?;

        tracing::debug!("Deleted record {} from {}", id, T::COLLECTION);
        Ok(true)
    }

    /// Overwrite the stored collection wholesale, without restamping.
    /// Import path: records keep exactly the ids and timestamps they carry.
    pub async fn replace_all(&self, records: Vec<T>) -> Result<()> {
        let _guard = self.kv.write_lock(T::COLLECTION).await;

        self.write(&records).await?;

        tracing::debug!("Replaced {} with {} records", T::COLLECTION, records.len());
        Ok(())
    }
}

impl<T: UserScoped> Collection<T> {
    pub async fn get_by_user(&self, user_id: &str) -> Result<Vec<T>> {
        Ok(self
            .load()
            .await
            .into_iter()
            .filter(|r| r.user_id() == user_id)
            .collect())
    }

    /// Remove every record owned by the user; returns how many went.
    pub async fn delete_by_user(&self, user_id: &str) -> Result<usize> {
        let _guard = self.kv.write_lock(T::COLLECTION).await;

        let mut records = self.load().await;
        let before = records.len();
        records.retain(|r| r.user_id() != user_id);
        let removed = before - records.len();

        if removed > 0 {
            self.write(&records).await?;
            tracing::debug!("Deleted {} records from {} for user {}", removed, T::COLLECTION, user_id);
        }

        Ok(removed)
    }
}

impl<T: ProjectScoped> Collection<T> {
    pub async fn get_by_project(&self, project_id: &str) -> Result<Vec<T>> {
        Ok(self
            .load()
            .await
            .into_iter()
            .filter(|r| r.project_id() == Some(project_id))
            .collect())
    }

    /// Remove every record belonging to the project; returns how many went.
    pub async fn delete_by_project(&self, project_id: &str) -> Result<usize> {
        let _guard = self.kv.write_lock(T::COLLECTION).await;

        let mut records = self.load().await;
        let before = records.len();
        records.retain(|r| r.project_id() != Some(project_id));
        let removed = before - records.len();

        if removed > 0 {
            self.write(&records).await?;
            tracing::debug!(
                "Deleted {} records from {} for project {}",
                removed,
                T::COLLECTION,
                project_id
            );
        }

        Ok(removed)
    }
}
