use anyhow::{Context, Result};
use mongodb::{Client, Database, options::ClientOptions};
use std::env;

/// Establish the database handle from the environment.
///
/// The driver connects lazily and maintains its own pool; this only parses
/// the connection string and picks the database.
pub async fn get_database() -> Result<Database> {
    let uri = env::var("MONGODB_URI").context("MONGODB_URI not set")?;
    let db_name = env::var("DATABASE_NAME").unwrap_or_else(|_| String::from("sitepulse"));

    let options = ClientOptions::parse(&uri)
        .await
        .context("Failed to parse MONGODB_URI")?;
    let client = Client::with_options(options).context("Failed to create MongoDB client")?;

    Ok(client.database(&db_name))
}
