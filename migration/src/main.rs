use colored::*;
use migration::{Migrator, MigratorTrait};
use std::{env, fs, path::Path};
use util::config;

mod runner;

#[tokio::main]
async fn main() {
    let url = config::database_url();
    let args: Vec<String> = env::args().collect();

    if let Err(err) = run(args.get(1).map(|s| s.as_str()), &url).await {
        eprintln!("{} {err}", "error:".red().bold());
        std::process::exit(1);
    }
}

async fn run(command: Option<&str>, url: &str) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Some("clean") => {
            remove_sqlite_file(url);
            remove_uploads();
        }
        Some("fresh") => {
            let db = connect(url).await?;
            println!("Dropping all tables...");
            Migrator::fresh(&db).await?;
            println!("{}", "Schema rebuilt".green());
        }
        Some("down") => {
            let db = connect(url).await?;
            runner::rollback_last(&db).await?;
        }
        Some("status") => {
            let db = connect(url).await?;
            Migrator::status(&db).await?;
        }
        Some("up") | None => {
            let db = connect(url).await?;
            runner::run_pending_migrations(&db).await?;
        }
        Some(other) => {
            return Err(format!("unknown command '{other}' (expected up, down, fresh, status or clean)").into());
        }
    }
    Ok(())
}

async fn connect(url: &str) -> Result<sea_orm::DatabaseConnection, sea_orm::DbErr> {
    if let Some(path) = sqlite_path(url) {
        if let Some(parent) = Path::new(path).parent() {
            fs::create_dir_all(parent).ok();
        }
    }
    sea_orm::Database::connect(url).await
}

/// File path portion of a `sqlite://` URL, if it names a file.
fn sqlite_path(url: &str) -> Option<&str> {
    let rest = url.strip_prefix("sqlite://")?;
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path == ":memory:" {
        None
    } else {
        Some(path)
    }
}

fn remove_sqlite_file(url: &str) {
    let Some(path) = sqlite_path(url) else {
        println!("DATABASE_URL is not a sqlite file; nothing to delete");
        return;
    };
    let db_path = Path::new(path);
    if db_path.exists() {
        match fs::remove_file(db_path) {
            Ok(()) => println!("Deleted DB: {}", db_path.display()),
            Err(err) => eprintln!("Failed to delete {}: {err}", db_path.display()),
        }
    } else {
        println!("DB file does not exist: {}", db_path.display());
    }
}

fn remove_uploads() {
    let root = util::paths::upload_root();
    if root.exists() {
        match fs::remove_dir_all(&root) {
            Ok(()) => println!("Deleted uploads: {}", root.display()),
            Err(err) => eprintln!("Failed to delete {}: {err}", root.display()),
        }
    } else {
        println!("Upload directory does not exist: {}", root.display());
    }
}
