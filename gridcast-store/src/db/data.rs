use std::fmt::{self, Display};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The type used to identify rooms. Opaque, assigned at creation.
pub type RoomId = String;
/// The type used to identify the tenant owning a set of rooms
pub type CompanyId = String;

/// How a room's stream URL should be interpreted by a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamType {
    /// A YouTube watch or live URL, played through the YouTube embed player
    Youtube,
    /// An HLS manifest, played through a native HLS player
    Hls,
    /// Anything else, dropped into a plain iframe
    Embed,
}

/// A configured stream slot owned by exactly one company
#[derive(Debug, Clone, PartialEq)]
pub struct RoomData {
    pub id: RoomId,
    pub company_id: CompanyId,
    pub name: String,
    /// Playback URL. An empty string means the room is not configured yet.
    pub stream_url: String,
    pub stream_type: StreamType,
    pub is_active: bool,
    pub thumbnail: Option<String>,
    pub auto_start: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRoom {
    /// The company the new room will belong to
    pub company_id: CompanyId,
    pub name: String,
    pub stream_url: String,
    pub stream_type: StreamType,
    pub is_active: bool,
    pub thumbnail: Option<String>,
    pub auto_start: Option<bool>,
}

/// A partial update of a room. Only the supplied fields change.
#[derive(Debug, Clone, Default)]
pub struct RoomUpdate {
    pub id: RoomId,
    pub company_id: CompanyId,
    pub name: Option<String>,
    pub stream_url: Option<String>,
    pub stream_type: Option<StreamType>,
    pub is_active: Option<bool>,
    pub thumbnail: Option<String>,
    pub auto_start: Option<bool>,
}

impl RoomData {
    /// Whether the room can actually be watched. A room without a stream
    /// URL is never live, no matter what its active flag says.
    pub fn is_live(&self) -> bool {
        self.is_active && !self.stream_url.is_empty()
    }
}

impl RoomUpdate {
    /// Merges the supplied fields into the room, refreshing `updated_at`
    pub fn apply_to(self, room: &mut RoomData, now: DateTime<Utc>) {
        let RoomUpdate {
            id: _,
            company_id: _,
            name,
            stream_url,
            stream_type,
            is_active,
            thumbnail,
            auto_start,
        } = self;

        if let Some(name) = name {
            room.name = name;
        }

        if let Some(stream_url) = stream_url {
            room.stream_url = stream_url;
        }

        room.stream_type = stream_type.unwrap_or(room.stream_type);
        room.is_active = is_active.unwrap_or(room.is_active);
        room.thumbnail = thumbnail.or(room.thumbnail.take());
        room.auto_start = auto_start.or(room.auto_start);
        room.updated_at = now;
    }
}

impl StreamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Youtube => "youtube",
            Self::Hls => "hls",
            Self::Embed => "embed",
        }
    }
}

impl Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamType {
    type Err = UnknownStreamType;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value {
            "youtube" => Ok(Self::Youtube),
            "hls" => Ok(Self::Hls),
            "embed" => Ok(Self::Embed),
            other => Err(UnknownStreamType(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown stream type: {0}")]
pub struct UnknownStreamType(String);
