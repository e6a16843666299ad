use crate::seed::{Seeder, run_seeder};
use crate::seeds::{
    article::ArticleSeeder, comment::CommentSeeder, ticket::TicketSeeder, user::UserSeeder,
};
use migration::{Migrator, MigratorTrait};

mod seed;
mod seeds;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let db = db::connect().await?;
    Migrator::up(&db, None).await?;

    for (seeder, name) in [
        (Box::new(UserSeeder) as Box<dyn Seeder + Send + Sync>, "User"),
        (Box::new(TicketSeeder), "Ticket"),
        (Box::new(CommentSeeder), "Comment"),
        (Box::new(ArticleSeeder), "KnowledgeArticle"),
    ] {
        if !run_seeder(&*seeder, name, &db).await {
            std::process::exit(1);
        }
    }

    println!(
        "\nDemo accounts use the password '{}'",
        seeds::DEMO_PASSWORD
    );
    Ok(())
}
