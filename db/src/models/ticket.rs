use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "tickets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub title: String,
    pub description: String,
    pub category: TicketCategory,
    pub priority: TicketPriority,
    pub status: TicketStatus,

    /// Owning user. Never changes after creation.
    pub created_by: i64,
    /// Must reference an it_staff, manager or admin user.
    pub assigned_to: Option<i64>,

    pub contact_phone: Option<String>,
    pub contact_preference: Option<String>,
    pub best_time_to_contact: Option<String>,
    pub location: Option<String>,

    /// Null unless status is resolved or closed.
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum TicketStatus {
    #[sea_orm(string_value = "new")]
    New,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "resolved")]
    Resolved,
    #[sea_orm(string_value = "closed")]
    Closed,
}

impl TicketStatus {
    /// Statuses that still need work: new, in_progress, pending.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            TicketStatus::New | TicketStatus::InProgress | TicketStatus::Pending
        )
    }

    pub fn active_statuses() -> [TicketStatus; 3] {
        [
            TicketStatus::New,
            TicketStatus::InProgress,
            TicketStatus::Pending,
        ]
    }

    /// Lifecycle transition table. Staying in the same status is always allowed.
    pub fn can_transition_to(self, next: TicketStatus) -> bool {
        use TicketStatus::*;
        if self == next {
            return true;
        }
        match self {
            New => matches!(next, InProgress | Pending | Resolved | Closed),
            InProgress => matches!(next, Pending | Resolved | Closed),
            Pending => matches!(next, InProgress | Resolved | Closed),
            Resolved => matches!(next, Closed),
            Closed => false,
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum TicketPriority {
    #[sea_orm(string_value = "low")]
    Low,
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
    #[sea_orm(string_value = "critical")]
    Critical,
}

impl TicketPriority {
    /// Resolution target in hours.
    pub fn sla_target_hours(self) -> i64 {
        match self {
            TicketPriority::Critical => 4,
            TicketPriority::High => 8,
            TicketPriority::Medium => 24,
            TicketPriority::Low => 72,
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum TicketCategory {
    #[sea_orm(string_value = "hardware")]
    Hardware,
    #[sea_orm(string_value = "software")]
    Software,
    #[sea_orm(string_value = "network")]
    Network,
    #[sea_orm(string_value = "access")]
    Access,
    #[sea_orm(string_value = "email")]
    Email,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Creator,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AssignedTo",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    Assignee,

    #[sea_orm(has_many = "super::ticket_comment::Entity")]
    Comments,

    #[sea_orm(has_many = "super::ticket_attachment::Entity")]
    Attachments,
}

impl Related<super::ticket_comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl Related<super::ticket_attachment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attachments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Everything needed to open a ticket.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub category: TicketCategory,
    pub priority: TicketPriority,
    pub created_by: i64,
    pub contact_phone: Option<String>,
    pub contact_preference: Option<String>,
    pub best_time_to_contact: Option<String>,
    pub location: Option<String>,
}

impl Model {
    /// Inserts a ticket in status `new` with no assignee.
    pub async fn create(db: &impl ConnectionTrait, new: NewTicket) -> Result<Model, DbErr> {
        let now = Utc::now();
        let active = ActiveModel {
            title: Set(new.title),
            description: Set(new.description),
            category: Set(new.category),
            priority: Set(new.priority),
            status: Set(TicketStatus::New),
            created_by: Set(new.created_by),
            assigned_to: Set(None),
            contact_phone: Set(new.contact_phone),
            contact_preference: Set(new.contact_preference),
            best_time_to_contact: Set(new.best_time_to_contact),
            location: Set(new.location),
            resolved_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        active.insert(db).await
    }

    pub async fn find_by_id(db: &impl ConnectionTrait, id: i64) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }

    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.created_by == user_id
    }
}
