//! All schemas that are exposed from endpoints are defined here
//! along with the conversion impls

use gridcast_store::{youtube_embed_url, RoomData, StreamType as StoreStreamType};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Mirror of the store's stream type for the API surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StreamType {
    Youtube,
    Hls,
    Embed,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    id: String,
    company_id: String,
    name: String,
    stream_url: String,
    stream_type: StreamType,
    is_active: bool,
    /// Whether the room is active and actually has a stream to show
    is_live: bool,
    thumbnail: Option<String>,
    auto_start: Option<bool>,
    /// Derived embed URL for youtube streams
    embed_url: Option<String>,
    created_at: String,
    updated_at: String,
}

/// Helper trait to convert any type into a serialized version
pub trait ToSerialized<T>
where
    T: Serialize,
{
    fn to_serialized(&self) -> T;
}

impl<I, O> ToSerialized<Vec<O>> for Vec<I>
where
    I: ToSerialized<O>,
    O: Serialize,
{
    fn to_serialized(&self) -> Vec<O> {
        self.iter().map(|x| x.to_serialized()).collect()
    }
}

impl ToSerialized<Room> for RoomData {
    fn to_serialized(&self) -> Room {
        Room {
            id: self.id.clone(),
            company_id: self.company_id.clone(),
            name: self.name.clone(),
            stream_url: self.stream_url.clone(),
            stream_type: self.stream_type.into(),
            is_active: self.is_active,
            is_live: self.is_live(),
            thumbnail: self.thumbnail.clone(),
            auto_start: self.auto_start,
            embed_url: youtube_embed_url(&self.stream_url),
            created_at: self.created_at.to_rfc3339(),
            updated_at: self.updated_at.to_rfc3339(),
        }
    }
}

impl From<StoreStreamType> for StreamType {
    fn from(value: StoreStreamType) -> Self {
        match value {
            StoreStreamType::Youtube => Self::Youtube,
            StoreStreamType::Hls => Self::Hls,
            StoreStreamType::Embed => Self::Embed,
        }
    }
}

impl From<StreamType> for StoreStreamType {
    fn from(value: StreamType) -> Self {
        match value {
            StreamType::Youtube => Self::Youtube,
            StreamType::Hls => Self::Hls,
            StreamType::Embed => Self::Embed,
        }
    }
}
