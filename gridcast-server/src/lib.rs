mod context;
mod docs;
mod errors;
mod rooms;
mod schemas;
mod serialized;

use std::{
    env,
    net::{Ipv6Addr, SocketAddr},
};

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

pub use context::{Rooms, ServerContext};

/// The default port the server will listen on.
pub const DEFAULT_PORT: u16 = 9060;

/// Starts the gridcast server
pub async fn run_server(context: ServerContext) {
    let port = env::var("GRIDCAST_SERVER_PORT")
        .map(|x| x.parse::<u16>().expect("Port must be a number"))
        .unwrap_or(DEFAULT_PORT);

    let addr: SocketAddr = (Ipv6Addr::UNSPECIFIED, port).into();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let version_one_router = Router::new().merge(rooms::router());

    let root_router = Router::new()
        .nest("/v1", version_one_router)
        .route("/api.json", get(docs::docs))
        .layer(cors)
        .with_state(context);

    let listener = TcpListener::bind(&addr).await.expect("listens on address");

    axum::serve(listener, root_router.into_make_service())
        .await
        .expect("server runs until shutdown");
}
