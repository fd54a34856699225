use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, Error as SqlxError, FromRow, PgPool};

use super::{
    Database, DatabaseError, IntoDatabaseError, Result, RoomData, RoomUpdate, StreamType,
};

/// A postgres database implementation for gridcast
pub struct PgDatabase {
    pool: PgPool,
}

/// The raw row shape. `stream_type` is text in the schema.
#[derive(FromRow)]
struct RoomRow {
    id: String,
    company_id: String,
    name: String,
    stream_url: String,
    stream_type: String,
    is_active: bool,
    thumbnail: Option<String>,
    auto_start: Option<bool>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RoomRow {
    fn into_data(self) -> Result<RoomData> {
        let stream_type = StreamType::from_str(&self.stream_type)
            .map_err(|e| DatabaseError::Internal(Box::new(e)))?;

        Ok(RoomData {
            id: self.id,
            company_id: self.company_id,
            name: self.name,
            stream_url: self.stream_url,
            stream_type,
            is_active: self.is_active,
            thumbnail: self.thumbnail,
            auto_start: self.auto_start,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl PgDatabase {
    /// Creates a lazily connecting pool, so an unreachable database
    /// surfaces as operation errors instead of failing construction
    pub fn connect_lazy(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_lazy(url)
            .map_err(|e| DatabaseError::Internal(Box::new(e)))?;

        Ok(Self { pool })
    }

    /// Connects eagerly and applies pending migrations
    pub async fn connect(url: &str) -> Result<Self> {
        let db = Self::connect_lazy(url)?;

        sqlx::migrate!("./migrations")
            .run(&db.pool)
            .await
            .map_err(|e| DatabaseError::Internal(Box::new(e)))?;

        Ok(db)
    }
}

#[async_trait]
impl Database for PgDatabase {
    async fn list_all_rooms(&self) -> Result<Vec<RoomData>> {
        let rows: Vec<RoomRow> = sqlx::query_as("SELECT * FROM rooms ORDER BY seq")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())?;

        rows.into_iter().map(RoomRow::into_data).collect()
    }

    async fn rooms_by_company(&self, company_id: &str) -> Result<Vec<RoomData>> {
        let rows: Vec<RoomRow> =
            sqlx::query_as("SELECT * FROM rooms WHERE company_id = $1 ORDER BY seq")
                .bind(company_id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| e.any())?;

        rows.into_iter().map(RoomRow::into_data).collect()
    }

    async fn room_by_id(&self, room_id: &str, company_id: &str) -> Result<RoomData> {
        let row: RoomRow = sqlx::query_as("SELECT * FROM rooms WHERE id = $1 AND company_id = $2")
            .bind(room_id)
            .bind(company_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("room", "id"))?;

        row.into_data()
    }

    async fn insert_room(&self, room: RoomData) -> Result<RoomData> {
        sqlx::query(
            "INSERT INTO rooms
                (id, company_id, name, stream_url, stream_type,
                 is_active, thumbnail, auto_start, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(&room.id)
        .bind(&room.company_id)
        .bind(&room.name)
        .bind(&room.stream_url)
        .bind(room.stream_type.as_str())
        .bind(room.is_active)
        .bind(&room.thumbnail)
        .bind(room.auto_start)
        .bind(room.created_at)
        .bind(room.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| e.any())?;

        Ok(room)
    }

    async fn update_room(&self, update: RoomUpdate) -> Result<RoomData> {
        let mut room = self.room_by_id(&update.id, &update.company_id).await?;
        update.apply_to(&mut room, Utc::now());

        sqlx::query(
            "UPDATE rooms SET
                name = $1,
                stream_url = $2,
                stream_type = $3,
                is_active = $4,
                thumbnail = $5,
                auto_start = $6,
                updated_at = $7
             WHERE id = $8 AND company_id = $9",
        )
        .bind(&room.name)
        .bind(&room.stream_url)
        .bind(room.stream_type.as_str())
        .bind(room.is_active)
        .bind(&room.thumbnail)
        .bind(room.auto_start)
        .bind(room.updated_at)
        .bind(&room.id)
        .bind(&room.company_id)
        .execute(&self.pool)
        .await
        .map_err(|e| e.any())?;

        Ok(room)
    }

    async fn delete_room(&self, room_id: &str, company_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM rooms WHERE id = $1 AND company_id = $2")
            .bind(room_id)
            .bind(company_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }
}

impl IntoDatabaseError for SqlxError {
    fn any(self) -> DatabaseError {
        DatabaseError::Internal(Box::new(self))
    }

    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError {
        match self {
            SqlxError::RowNotFound => DatabaseError::NotFound {
                resource,
                identifier,
            },
            e => Self::any(e),
        }
    }
}
