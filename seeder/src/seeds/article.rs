use super::users_with_role;
use crate::seed::Seeder;
use db::models::user::Role;
use sea_orm::DatabaseConnection;
use services::Actor;
use services::knowledge_service::{CreateArticle, KnowledgeService};

const ARTICLES: &[(&str, &str, &str, &[&str])] = &[
    (
        "Connecting to the VPN",
        "Install the VPN client from the software portal, sign in with your work account and pick the gateway closest to you.",
        "network",
        &["vpn", "remote"],
    ),
    (
        "Resetting your password",
        "Use the self-service portal. New passwords need at least 8 characters and cannot reuse your last three.",
        "access",
        &["password", "account"],
    ),
    (
        "Clearing a printer jam",
        "Open tray 2, remove the stuck sheet gently, then close every door before printing again.",
        "hardware",
        &["printer"],
    ),
    (
        "Adding a shared mailbox in Outlook",
        "File > Account Settings > Change > More Settings > Advanced, then add the mailbox address.",
        "email",
        &["outlook", "mailbox"],
    ),
];

pub struct ArticleSeeder;

#[async_trait::async_trait]
impl Seeder for ArticleSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> anyhow::Result<()> {
        let managers = users_with_role(db, Role::Manager).await?;
        let Some(author) = managers.first().map(Actor::from) else {
            anyhow::bail!("no manager to author articles; run the user seeder first");
        };

        for (title, content, category, tags) in ARTICLES {
            KnowledgeService::create(
                db,
                &author,
                CreateArticle {
                    title: title.to_string(),
                    content: content.to_string(),
                    category: category.to_string(),
                    tags: tags.iter().map(|t| t.to_string()).collect(),
                },
            )
            .await?;
        }
        Ok(())
    }
}
