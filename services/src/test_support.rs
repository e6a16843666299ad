use crate::policy::Actor;
use db::models::ticket::{self, NewTicket, TicketCategory, TicketPriority};
use db::models::user::{self, Role};
use sea_orm::DatabaseConnection;

pub async fn make_user(db: &DatabaseConnection, email: &str, role: Role) -> (user::Model, Actor) {
    let u = user::Model::create(db, email, "Test", "User", role, "password123")
        .await
        .unwrap();
    let actor = Actor::from(&u);
    (u, actor)
}

pub async fn make_ticket(db: &DatabaseConnection, owner: i64, title: &str) -> ticket::Model {
    ticket::Model::create(
        db,
        NewTicket {
            title: title.into(),
            description: format!("{title} description"),
            category: TicketCategory::Hardware,
            priority: TicketPriority::Medium,
            created_by: owner,
            contact_phone: None,
            contact_preference: None,
            best_time_to_contact: None,
            location: None,
        },
    )
    .await
    .unwrap()
}
