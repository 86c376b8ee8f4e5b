//! Notes service
//!
//! Plain CRUD over project notes plus case-insensitive search across
//! titles and content.

use crate::error::Result;
use crate::models::Note;
use crate::store::{Collection, KvStore};

/// Service for managing notes
#[derive(Clone)]
pub struct NoteService {
    notes: Collection<Note>,
}

impl NoteService {
    pub fn new(kv: KvStore) -> Self {
        Self {
            notes: Collection::new(kv),
        }
    }

    /// Create or update a note
    pub async fn save_note(&self, note: Note) -> Result<Note> {
        self.notes.save(note).await
    }

    /// Get a note by id
    pub async fn get_note(&self, id: &str) -> Result<Option<Note>> {
        self.notes.get_by_id(id).await
    }

    /// List all notes
    pub async fn list_notes(&self) -> Result<Vec<Note>> {
        self.notes.get_all().await
    }

    /// List a project's notes
    pub async fn list_notes_for_project(&self, project_id: &str) -> Result<Vec<Note>> {
        self.notes.get_by_project(project_id).await
    }

    /// List one user's notes
    pub async fn list_notes_for_user(&self, user_id: &str) -> Result<Vec<Note>> {
        self.notes.get_by_user(user_id).await
    }

    /// Delete a note. Unknown ids are a no-op returning `false`.
    pub async fn delete_note(&self, id: &str) -> Result<bool> {
        self.notes.delete(id).await
    }

    /// Search notes by title or content, case-insensitive
    pub async fn search_notes(&self, query: &str) -> Result<Vec<Note>> {
        let all_notes = self.list_notes().await?;

        let query_lower = query.to_lowercase();

        let filtered: Vec<Note> = all_notes
            .into_iter()
            .filter(|note| {
                note.title.to_lowercase().contains(&query_lower)
                    || note.content.to_lowercase().contains(&query_lower)
            })
            .collect();

        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn create_test_service() -> NoteService {
        let kv = KvStore::in_memory().await.unwrap();
        NoteService::new(kv)
    }

    #[tokio::test]
    async fn test_save_and_get_note() {
        let service = create_test_service().await;

        let note = service
            .save_note(Note::new("p1", "u1", "Delivery", "Gravel arrives Tuesday"))
            .await
            .unwrap();

        let fetched = service.get_note(&note.id).await.unwrap().unwrap();

        assert_eq!(fetched.id, note.id);
        assert_eq!(fetched.title, "Delivery");
    }

    #[tokio::test]
    async fn test_search_notes() {
        let service = create_test_service().await;

        service
            .save_note(Note::new("p1", "u1", "Apple", "crate of apples"))
            .await
            .unwrap();
        service
            .save_note(Note::new("p1", "u1", "Banana", "yellow"))
            .await
            .unwrap();
        service
            .save_note(Note::new("p1", "u1", "Cherry", "pits everywhere"))
            .await
            .unwrap();

        let results = service.search_notes("an").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Banana");

        // Content matches too, ignoring case
        let results = service.search_notes("PITS").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Cherry");
    }

    #[tokio::test]
    async fn test_list_by_project() {
        let service = create_test_service().await;

        service
            .save_note(Note::new("p1", "u1", "A", ""))
            .await
            .unwrap();
        service
            .save_note(Note::new("p2", "u1", "B", ""))
            .await
            .unwrap();

        assert_eq!(service.list_notes_for_project("p1").await.unwrap().len(), 1);
    }
}
