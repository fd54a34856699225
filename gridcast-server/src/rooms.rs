use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use gridcast_store::{detect_stream_type, NewRoom, RoomUpdate};

use crate::{
    context::ServerContext,
    errors::{ServerError, ServerResult},
    schemas::{NewRoomSchema, UpdateRoomSchema, ValidatedJson},
    serialized::{Room, ToSerialized},
};

#[utoipa::path(
    get,
    path = "/v1/rooms",
    tag = "rooms",
    responses(
        (status = 200, body = Vec<Room>)
    )
)]
async fn list_all_rooms(State(context): State<ServerContext>) -> Json<Vec<Room>> {
    let rooms = context.rooms.list_all().await;

    Json(rooms.to_serialized())
}

#[utoipa::path(
    get,
    path = "/v1/companies/{company_id}/rooms",
    tag = "rooms",
    responses(
        (status = 200, body = Vec<Room>)
    )
)]
async fn list_company_rooms(
    State(context): State<ServerContext>,
    Path(company_id): Path<String>,
) -> Json<Vec<Room>> {
    let rooms = context.rooms.list_by_company(&company_id).await;

    Json(rooms.to_serialized())
}

#[utoipa::path(
    post,
    path = "/v1/companies/{company_id}/rooms/init",
    tag = "rooms",
    responses(
        (status = 200, description = "The company's fixed set of rooms, seeded on first call", body = Vec<Room>)
    )
)]
async fn initialize_company(
    State(context): State<ServerContext>,
    Path(company_id): Path<String>,
) -> Json<Vec<Room>> {
    let rooms = context.rooms.initialize_company(&company_id).await;

    Json(rooms.to_serialized())
}

#[utoipa::path(
    get,
    path = "/v1/companies/{company_id}/rooms/{room_id}",
    tag = "rooms",
    responses(
        (status = 200, body = Room),
        (status = 404, description = "No such room for this company")
    )
)]
async fn room(
    State(context): State<ServerContext>,
    Path((company_id, room_id)): Path<(String, String)>,
) -> ServerResult<Json<Room>> {
    let room = context
        .rooms
        .room_by_id(&room_id, &company_id)
        .await
        .ok_or(ServerError::NotFound {
            resource: "room",
            identifier: "id",
        })?;

    Ok(Json(room.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/companies/{company_id}/rooms",
    tag = "rooms",
    request_body = NewRoomSchema,
    responses(
        (status = 200, body = Room)
    )
)]
async fn create_room(
    State(context): State<ServerContext>,
    Path(company_id): Path<String>,
    ValidatedJson(body): ValidatedJson<NewRoomSchema>,
) -> Json<Room> {
    let stream_url = body.stream_url.unwrap_or_default();

    // Rooms created without an explicit type are classified by their URL
    let stream_type = body
        .stream_type
        .map(Into::into)
        .unwrap_or_else(|| detect_stream_type(&stream_url));

    let room = context
        .rooms
        .create_room(NewRoom {
            company_id,
            name: body.name,
            stream_url,
            stream_type,
            is_active: body.is_active.unwrap_or(false),
            thumbnail: body.thumbnail,
            auto_start: body.auto_start,
        })
        .await;

    Json(room.to_serialized())
}

#[utoipa::path(
    patch,
    path = "/v1/companies/{company_id}/rooms/{room_id}",
    tag = "rooms",
    request_body = UpdateRoomSchema,
    responses(
        (status = 200, body = Room),
        (status = 404, description = "No such room for this company")
    )
)]
async fn update_room(
    State(context): State<ServerContext>,
    Path((company_id, room_id)): Path<(String, String)>,
    ValidatedJson(body): ValidatedJson<UpdateRoomSchema>,
) -> ServerResult<Json<Room>> {
    // A new URL reclassifies the room unless the type is given explicitly
    let stream_type = body.stream_type.map(Into::into).or_else(|| {
        body.stream_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .map(detect_stream_type)
    });

    let updated = context
        .rooms
        .update_room(RoomUpdate {
            id: room_id,
            company_id,
            name: body.name,
            stream_url: body.stream_url,
            stream_type,
            is_active: body.is_active,
            thumbnail: body.thumbnail,
            auto_start: body.auto_start,
        })
        .await
        .ok_or(ServerError::NotFound {
            resource: "room",
            identifier: "id",
        })?;

    Ok(Json(updated.to_serialized()))
}

#[utoipa::path(
    delete,
    path = "/v1/companies/{company_id}/rooms/{room_id}",
    tag = "rooms",
    responses(
        (status = 204, description = "Room was removed, or never existed")
    )
)]
async fn delete_room(
    State(context): State<ServerContext>,
    Path((company_id, room_id)): Path<(String, String)>,
) -> StatusCode {
    context.rooms.delete_room(&room_id, &company_id).await;

    StatusCode::NO_CONTENT
}

pub fn router() -> Router<ServerContext> {
    Router::new()
        .route("/rooms", get(list_all_rooms))
        .route("/companies/:company_id/rooms", get(list_company_rooms))
        .route("/companies/:company_id/rooms", post(create_room))
        .route("/companies/:company_id/rooms/init", post(initialize_company))
        .route("/companies/:company_id/rooms/:room_id", get(room))
        .route("/companies/:company_id/rooms/:room_id", patch(update_room))
        .route("/companies/:company_id/rooms/:room_id", delete(delete_room))
}
