use super::{pick, users_with_role};
use crate::seed::Seeder;
use db::models::{ticket, user, user::Role};
use sea_orm::{DatabaseConnection, EntityTrait};
use services::Actor;
use services::comment_service::CommentService;
use services::outbox::NoopOutbox;

const STAFF_REPLIES: &[&str] = &[
    "Thanks for reporting this, I'm taking a look now.",
    "Could you send a screenshot of the error?",
    "I've pushed a fix, please try again and let us know.",
];

const INTERNAL_NOTES: &[&str] = &[
    "Same symptom as last month's driver rollout.",
    "Waiting on the vendor, escalate if no reply by Friday.",
];

const OWNER_REPLIES: &[&str] = &["Still happening on my side.", "That worked, thanks!"];

pub struct CommentSeeder;

#[async_trait::async_trait]
impl Seeder for CommentSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> anyhow::Result<()> {
        let staff = users_with_role(db, Role::ItStaff).await?;
        let tickets = ticket::Entity::find().all(db).await?;

        for t in tickets.iter().filter(|t| t.assigned_to.is_some()) {
            let responder = t
                .assigned_to
                .and_then(|id| staff.iter().find(|s| s.id == id))
                .or_else(|| staff.first());
            let Some(responder) = responder.map(Actor::from) else {
                continue;
            };

            if let Some(text) = pick(STAFF_REPLIES) {
                CommentService::create(db, &NoopOutbox, &responder, t.id, text, false).await?;
            }
            if fastrand::bool() {
                if let Some(text) = pick(INTERNAL_NOTES) {
                    CommentService::create(db, &NoopOutbox, &responder, t.id, text, true).await?;
                }
            }
            if let Some(owner) = user::Entity::find_by_id(t.created_by).one(db).await? {
                if let Some(text) = pick(OWNER_REPLIES) {
                    CommentService::create(db, &NoopOutbox, &Actor::from(&owner), t.id, text, false)
                        .await?;
                }
            }
        }
        Ok(())
    }
}
