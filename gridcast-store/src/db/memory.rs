use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use super::{CompanyId, Database, DatabaseError, Result, RoomData, RoomUpdate};

/// A process-local database keeping rooms in creation order per company.
///
/// This serves both as a standalone backend for tests and as the substrate
/// the room store degrades to when the remote backend fails. None of its
/// operations can fail with [DatabaseError::Internal].
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    rooms: DashMap<CompanyId, Vec<RoomData>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn list_all_rooms(&self) -> Result<Vec<RoomData>> {
        let mut rooms: Vec<_> = self
            .rooms
            .iter()
            .flat_map(|entry| entry.value().clone())
            .collect();

        // DashMap iteration order is arbitrary, so order across companies
        // has to be restored here
        rooms.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(rooms)
    }

    async fn rooms_by_company(&self, company_id: &str) -> Result<Vec<RoomData>> {
        let rooms = self
            .rooms
            .get(company_id)
            .map(|rooms| rooms.clone())
            .unwrap_or_default();

        Ok(rooms)
    }

    async fn room_by_id(&self, room_id: &str, company_id: &str) -> Result<RoomData> {
        self.rooms
            .get(company_id)
            .and_then(|rooms| rooms.iter().find(|room| room.id == room_id).cloned())
            .ok_or(DatabaseError::NotFound {
                resource: "room",
                identifier: "id",
            })
    }

    async fn insert_room(&self, room: RoomData) -> Result<RoomData> {
        self.rooms
            .entry(room.company_id.clone())
            .or_default()
            .push(room.clone());

        Ok(room)
    }

    async fn update_room(&self, update: RoomUpdate) -> Result<RoomData> {
        let mut rooms =
            self.rooms
                .get_mut(&update.company_id)
                .ok_or(DatabaseError::NotFound {
                    resource: "room",
                    identifier: "id",
                })?;

        let room = rooms
            .iter_mut()
            .find(|room| room.id == update.id)
            .ok_or(DatabaseError::NotFound {
                resource: "room",
                identifier: "id",
            })?;

        update.apply_to(room, Utc::now());

        Ok(room.clone())
    }

    async fn delete_room(&self, room_id: &str, company_id: &str) -> Result<()> {
        if let Some(mut rooms) = self.rooms.get_mut(company_id) {
            rooms.retain(|room| room.id != room_id);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StreamType;

    fn room(id: &str, company_id: &str) -> RoomData {
        let now = Utc::now();

        RoomData {
            id: id.to_string(),
            company_id: company_id.to_string(),
            name: format!("Room {id}"),
            stream_url: String::new(),
            stream_type: StreamType::Youtube,
            is_active: false,
            thumbnail: None,
            auto_start: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_rooms_keep_creation_order() {
        let db = MemoryDatabase::new();

        for id in ["a", "b", "c"] {
            db.insert_room(room(id, "acme")).await.unwrap();
        }

        let ids: Vec<_> = db
            .rooms_by_company("acme")
            .await
            .unwrap()
            .into_iter()
            .map(|room| room.id)
            .collect();

        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_rooms_are_scoped_by_company() {
        let db = MemoryDatabase::new();

        db.insert_room(room("a", "acme")).await.unwrap();

        assert!(db.room_by_id("a", "acme").await.is_ok());
        assert!(matches!(
            db.room_by_id("a", "globex").await,
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_missing_room_is_not_found() {
        let db = MemoryDatabase::new();

        let result = db
            .update_room(RoomUpdate {
                id: "missing".to_string(),
                company_id: "acme".to_string(),
                ..Default::default()
            })
            .await;

        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let db = MemoryDatabase::new();

        db.insert_room(room("a", "acme")).await.unwrap();

        db.delete_room("a", "acme").await.unwrap();
        db.delete_room("a", "acme").await.unwrap();
        db.delete_room("never-existed", "acme").await.unwrap();

        assert!(db.rooms_by_company("acme").await.unwrap().is_empty());
    }
}
