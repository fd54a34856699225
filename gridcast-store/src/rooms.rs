use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use gridcast_core::{random_string, Config};
use log::{info, warn};

use crate::{
    Database, DatabaseError, MemoryDatabase, NewRoom, RoomData, RoomUpdate, StreamType,
};

/// Length of generated room ids
const ROOM_ID_LENGTH: usize = 16;

/// The single source of truth for room configuration per company.
///
/// Operations go to the remote database until the first failure, after
/// which the store permanently degrades to its in-process storage for the
/// rest of the process lifetime. Callers never observe the degrade: reads
/// return whatever local storage holds and writes land locally instead.
/// Rooms persisted remotely before the degrade are invisible until the
/// process restarts.
pub struct RoomStore<Db> {
    remote: Arc<Db>,
    local: MemoryDatabase,
    degraded: AtomicBool,

    config: Config,
    /// Serializes first-touch seeding, so two callers cannot both observe
    /// an empty company and seed it twice
    seed_lock: tokio::sync::Mutex<()>,
}

impl<Db> RoomStore<Db>
where
    Db: Database,
{
    pub fn new(database: &Arc<Db>, config: Config) -> Self {
        Self {
            remote: database.clone(),
            local: MemoryDatabase::new(),
            degraded: AtomicBool::new(false),
            config,
            seed_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Whether the store has degraded to in-process storage
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    /// Flips the store into in-process mode. The transition is
    /// one-directional and only its first occurrence is logged.
    fn degrade(&self, error: DatabaseError) {
        if self
            .degraded
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            warn!("Remote database failed, continuing on in-process storage: {error}");
        }
    }

    /// Every room across every company. Administrative use only.
    pub async fn list_all(&self) -> Vec<RoomData> {
        if !self.is_degraded() {
            match self.remote.list_all_rooms().await {
                Ok(rooms) => return rooms,
                Err(error) => self.degrade(error),
            }
        }

        self.local.list_all_rooms().await.unwrap_or_default()
    }

    /// All rooms belonging to the company, in creation order
    pub async fn list_by_company(&self, company_id: &str) -> Vec<RoomData> {
        if !self.is_degraded() {
            match self.remote.rooms_by_company(company_id).await {
                Ok(rooms) => return rooms,
                Err(error) => self.degrade(error),
            }
        }

        self.local
            .rooms_by_company(company_id)
            .await
            .unwrap_or_default()
    }

    /// A single room, or nothing when the id doesn't exist for that
    /// company. Ids never resolve across tenants.
    pub async fn room_by_id(&self, room_id: &str, company_id: &str) -> Option<RoomData> {
        if !self.is_degraded() {
            match self.remote.room_by_id(room_id, company_id).await {
                Ok(room) => return Some(room),
                Err(DatabaseError::NotFound { .. }) => return None,
                Err(error) => self.degrade(error),
            }
        }

        self.local.room_by_id(room_id, company_id).await.ok()
    }

    /// Creates a room with a generated id. Always succeeds.
    pub async fn create_room(&self, new_room: NewRoom) -> RoomData {
        let now = Utc::now();

        let room = RoomData {
            id: random_string(ROOM_ID_LENGTH),
            company_id: new_room.company_id,
            name: new_room.name,
            stream_url: new_room.stream_url,
            stream_type: new_room.stream_type,
            is_active: new_room.is_active,
            thumbnail: new_room.thumbnail,
            auto_start: new_room.auto_start,
            created_at: now,
            updated_at: now,
        };

        if !self.is_degraded() {
            match self.remote.insert_room(room.clone()).await {
                Ok(room) => return room,
                Err(error) => self.degrade(error),
            }
        }

        self.local
            .insert_room(room)
            .await
            .expect("in-process storage is infallible")
    }

    /// Merges the supplied fields into the room, or returns nothing when
    /// no such room exists for that company
    pub async fn update_room(&self, update: RoomUpdate) -> Option<RoomData> {
        if !self.is_degraded() {
            match self.remote.update_room(update.clone()).await {
                Ok(room) => return Some(room),
                Err(DatabaseError::NotFound { .. }) => return None,
                Err(error) => self.degrade(error),
            }
        }

        self.local.update_room(update).await.ok()
    }

    /// Removes the room. Deleting a room that doesn't exist is not an
    /// error.
    pub async fn delete_room(&self, room_id: &str, company_id: &str) {
        if !self.is_degraded() {
            match self.remote.delete_room(room_id, company_id).await {
                Ok(()) => return,
                Err(error) => self.degrade(error),
            }
        }

        self.local
            .delete_room(room_id, company_id)
            .await
            .expect("in-process storage is infallible");
    }

    /// Ensures the company has its fixed set of placeholder rooms.
    ///
    /// The first call seeds one unconfigured, inactive room per slot, the
    /// leading half set up for the platform's live embeds and the rest for
    /// manifest streams. Every call after that returns the existing set
    /// unchanged.
    pub async fn initialize_company(&self, company_id: &str) -> Vec<RoomData> {
        let _guard = self.seed_lock.lock().await;

        let existing = self.list_by_company(company_id).await;

        if !existing.is_empty() {
            return existing;
        }

        info!(
            "Seeding {} placeholder rooms for company {}",
            self.config.total_slots, company_id
        );

        let mut rooms = Vec::with_capacity(self.config.total_slots);

        for slot in 0..self.config.total_slots {
            let stream_type = if slot < self.config.total_slots / 2 {
                StreamType::Youtube
            } else {
                StreamType::Hls
            };

            let room = self
                .create_room(NewRoom {
                    company_id: company_id.to_string(),
                    name: format!("Room {}", slot + 1),
                    stream_url: String::new(),
                    stream_type,
                    is_active: false,
                    thumbnail: None,
                    auto_start: None,
                })
                .await;

            rooms.push(room);
        }

        rooms
    }
}
