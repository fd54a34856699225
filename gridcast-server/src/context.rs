use std::sync::Arc;

use axum::extract::FromRef;
use gridcast_store::{PgDatabase, RoomStore};

/// The room store type the server is wired to
pub type Rooms = RoomStore<PgDatabase>;

#[derive(Clone, FromRef)]
pub struct ServerContext {
    pub rooms: Arc<Rooms>,
}
