pub mod filters;
pub mod models;
pub mod test_utils;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::path::Path;
use std::time::Duration;
use util::config;

/// Opens the pool for `DATABASE_URL`.
///
/// SQLite won't create intermediate directories, so the parent folder of a
/// file-backed URL is created first.
pub async fn connect() -> Result<DatabaseConnection, DbErr> {
    let url = config::database_url();

    if let Some(rest) = url.strip_prefix("sqlite://") {
        let path = rest.split('?').next().unwrap_or(rest);
        if !path.is_empty() && path != ":memory:" {
            if let Some(parent) = Path::new(path).parent() {
                let _ = std::fs::create_dir_all(parent);
            }
        }
    }

    let mut opts = ConnectOptions::new(url);
    opts.max_connections(20)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    Database::connect(opts).await
}
