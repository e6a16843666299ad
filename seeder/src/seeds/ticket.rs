use super::{pick, users_with_role};
use crate::seed::Seeder;
use db::models::ticket::{TicketCategory, TicketPriority, TicketStatus};
use db::models::user::Role;
use sea_orm::DatabaseConnection;
use services::Actor;
use services::outbox::NoopOutbox;
use services::ticket_service::{CreateTicket, TicketService, UpdateTicket};

const TICKETS: &[(&str, &str, TicketCategory)] = &[
    ("Laptop will not power on", "Charging light stays off, tried another outlet.", TicketCategory::Hardware),
    ("Printer on floor 3 jams", "Every second page jams in tray 2.", TicketCategory::Hardware),
    ("Excel crashes on startup", "Crashes right after the splash screen since the last update.", TicketCategory::Software),
    ("Need Visio licence", "Starting on the network diagrams project next week.", TicketCategory::Software),
    ("VPN disconnects every hour", "Working from home, the tunnel drops and reconnects.", TicketCategory::Network),
    ("Wi-Fi slow in meeting room B", "Video calls freeze for everyone in the room.", TicketCategory::Network),
    ("Locked out of my account", "Too many attempts after the password change.", TicketCategory::Access),
    ("Access to finance share", "New role requires read access to the finance drive.", TicketCategory::Access),
    ("Emails stuck in outbox", "Messages with attachments never leave the outbox.", TicketCategory::Email),
    ("Shared mailbox missing", "The helpdesk mailbox disappeared from Outlook.", TicketCategory::Email),
    ("Desk phone has no dial tone", "Handset was moved to a new desk yesterday.", TicketCategory::Other),
    ("Monitor flickering", "Second screen flickers when the laptop is docked.", TicketCategory::Hardware),
];

const PRIORITIES: &[TicketPriority] = &[
    TicketPriority::Low,
    TicketPriority::Medium,
    TicketPriority::Medium,
    TicketPriority::High,
    TicketPriority::Critical,
];

const PROGRESSIONS: &[&[TicketStatus]] = &[
    &[],
    &[TicketStatus::InProgress],
    &[TicketStatus::InProgress, TicketStatus::Pending],
    &[TicketStatus::InProgress, TicketStatus::Resolved],
    &[TicketStatus::Resolved, TicketStatus::Closed],
];

pub struct TicketSeeder;

#[async_trait::async_trait]
impl Seeder for TicketSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> anyhow::Result<()> {
        let end_users = users_with_role(db, Role::EndUser).await?;
        let staff = users_with_role(db, Role::ItStaff).await?;
        let Some(dispatcher) = staff.first().map(Actor::from) else {
            anyhow::bail!("no IT staff to work tickets; run the user seeder first");
        };

        for (title, description, category) in TICKETS {
            let Some(owner) = pick(&end_users) else {
                anyhow::bail!("no end users to own tickets");
            };
            let priority = pick(PRIORITIES).copied().unwrap_or(TicketPriority::Medium);
            let ticket = TicketService::create(
                db,
                &NoopOutbox,
                &Actor::from(owner),
                CreateTicket {
                    title: title.to_string(),
                    description: description.to_string(),
                    category: *category,
                    priority,
                    contact_phone: None,
                    contact_preference: Some("email".into()),
                    best_time_to_contact: None,
                    location: None,
                },
            )
            .await?;

            let steps = pick(PROGRESSIONS).copied().unwrap_or_default();
            if !steps.is_empty() {
                if let Some(assignee) = pick(&staff) {
                    TicketService::assign(db, &NoopOutbox, &dispatcher, ticket.id, Some(assignee.id))
                        .await?;
                }
            }
            for status in steps {
                TicketService::update(
                    db,
                    &NoopOutbox,
                    &dispatcher,
                    ticket.id,
                    UpdateTicket {
                        status: Some(*status),
                        ..Default::default()
                    },
                )
                .await?;
            }
        }
        Ok(())
    }
}
