use std::{env, sync::Arc};

use colored::Colorize;
use gridcast_core::Config;
use gridcast_server::{run_server, ServerContext};
use gridcast_store::{DatabaseError, PgDatabase, RoomStore};
use log::{error, info, warn};
use thiserror::Error;

mod logging;

#[derive(Debug, Error)]
enum StartError {
    #[error("GRIDCAST_DATABASE_URL is not set")]
    MissingDatabaseUrl,

    #[error("Could not initialize database: {0}")]
    Database(DatabaseError),
}

impl StartError {
    fn hint(&self) -> String {
        match self {
            StartError::MissingDatabaseUrl => {
                "Set GRIDCAST_DATABASE_URL to a postgres connection string, for example postgres://localhost/gridcast.".to_string()
            }
            StartError::Database(_) => {
                "The connection string could not be used at all. Check its syntax, then try again.".to_string()
            }
        }
    }
}

#[tokio::main]
async fn main() {
    logging::init_logger();

    if let Err(error) = start().await {
        error!(
            "{} Read the error below to troubleshoot the issue.",
            "gridcast failed to start!".bold().red()
        );
        error!("{}", error);
        error!("{}", format!("Hint: {}", error.hint()).dimmed().italic());
    }
}

async fn start() -> Result<(), StartError> {
    let url = env::var("GRIDCAST_DATABASE_URL").map_err(|_| StartError::MissingDatabaseUrl)?;

    info!("Connecting to database...");

    let database = match PgDatabase::connect(&url).await {
        Ok(database) => database,
        Err(error) => {
            // An unreachable database is the exact case the store's
            // degrade path covers, so startup continues without it
            warn!("Database is unreachable, starting on in-process storage: {error}");

            PgDatabase::connect_lazy(&url).map_err(StartError::Database)?
        }
    };

    let rooms = Arc::new(RoomStore::new(&Arc::new(database), Config::default()));

    info!("Initialized successfully.");
    run_server(ServerContext { rooms }).await;

    Ok(())
}
