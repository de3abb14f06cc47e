use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};

use crate::models::marks::MarksRecord;
use crate::models::user::User;

pub const USERS_COLLECTION: &str = "users";
pub const MARKS_COLLECTION: &str = "marksData";

const DEFAULT_DB_NAME: &str = "marksheet";

/// Build the database handle from the connection string. Connectivity is
/// verified with a ping but a failure only logs a warning; requests that
/// need storage will fail individually instead of the process refusing to
/// start.
pub async fn get_db_client(mongodb_uri: &str) -> mongodb::error::Result<Database> {
    let client = Client::with_uri_str(mongodb_uri).await?;
    let db = client
        .default_database()
        .unwrap_or_else(|| client.database(DEFAULT_DB_NAME));

    match db.run_command(doc! { "ping": 1 }).await {
        Ok(_) => tracing::info!("Connected to database: {}", db.name()),
        Err(e) => tracing::warn!("Database '{}' is unreachable at startup: {}", db.name(), e),
    }

    Ok(db)
}

/// Enforce the (section, usn, subject) natural key and email uniqueness
/// at the storage layer so concurrent writes cannot leave duplicate
/// documents behind.
pub async fn ensure_indexes(db: &Database) {
    let marks_index = IndexModel::builder()
        .keys(doc! { "section": 1, "usn": 1, "subject": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();

    let marks = db.collection::<MarksRecord>(MARKS_COLLECTION);
    if let Err(e) = marks.create_index(marks_index).await {
        tracing::warn!("Failed to create marks key index: {}", e);
    }

    let email_index = IndexModel::builder()
        .keys(doc! { "email": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();

    let users = db.collection::<User>(USERS_COLLECTION);
    if let Err(e) = users.create_index(email_index).await {
        tracing::warn!("Failed to create users email index: {}", e);
    }
}
