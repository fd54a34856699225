use async_trait::async_trait;
use thiserror::Error;

mod data;
pub use data::*;

mod memory;
pub use memory::*;

mod pg;
pub use pg::*;

pub type Result<T> = std::result::Result<T, DatabaseError>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// An unknown or internal error happened with the database
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),
    /// A resource in the database doesn't exist
    #[error("{resource}:{identifier} doesn't exist")]
    NotFound {
        resource: &'static str,
        identifier: &'static str,
    },
}

/// Helper trait to reduce boilerplate
pub trait IntoDatabaseError {
    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError;
    fn any(self) -> DatabaseError;
}

/// Represents a type that can persist gridcast room configuration
#[async_trait]
pub trait Database: Send + Sync {
    /// Every room across every company. Administrative use only.
    async fn list_all_rooms(&self) -> Result<Vec<RoomData>>;
    /// All rooms belonging to a company, in creation order
    async fn rooms_by_company(&self, company_id: &str) -> Result<Vec<RoomData>>;
    /// A single room, scoped by company so ids never leak across tenants
    async fn room_by_id(&self, room_id: &str, company_id: &str) -> Result<RoomData>;
    async fn insert_room(&self, room: RoomData) -> Result<RoomData>;
    /// Merges the supplied fields into the room and refreshes `updated_at`
    async fn update_room(&self, update: RoomUpdate) -> Result<RoomData>;
    /// Deleting a room that doesn't exist is not an error
    async fn delete_room(&self, room_id: &str, company_id: &str) -> Result<()>;
}
