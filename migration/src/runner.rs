use colored::*;
use migration::Migrator;
use sea_orm::DatabaseConnection;
use sea_orm_migration::prelude::*;
use std::io::{self, Write};
use std::time::Instant;

const STATUS_COLUMN: usize = 80;

/// Applies every pending migration one at a time, printing a status line for each.
pub async fn run_pending_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    let pending = Migrator::get_pending_migrations(db).await?;
    if pending.is_empty() {
        println!("{}", "Nothing to migrate".dimmed());
        return Ok(());
    }

    println!("Running migrations...");
    for migration in pending {
        let name_str = format!("Applying {}", migration.name().bold());
        let dots = ".".repeat(STATUS_COLUMN.saturating_sub(name_str.len()));
        print!("{name_str}{dots} ");
        io::stdout().flush().ok();

        let start = Instant::now();
        match Migrator::up(db, Some(1)).await {
            Ok(()) => {
                let time_str = format!("({:.2?})", start.elapsed()).dimmed();
                println!("{} {}", "done".green(), time_str);
            }
            Err(err) => {
                println!("{}", "failed".red());
                return Err(err);
            }
        }
    }
    Ok(())
}

/// Rolls back the most recently applied migration.
pub async fn rollback_last(db: &DatabaseConnection) -> Result<(), DbErr> {
    let applied = Migrator::get_applied_migrations(db).await?;
    let Some(last) = applied.last() else {
        println!("{}", "Nothing to roll back".dimmed());
        return Ok(());
    };
    print!("Reverting {} ", last.name().bold());
    io::stdout().flush().ok();
    Migrator::down(db, Some(1)).await?;
    println!("{}", "done".green());
    Ok(())
}
