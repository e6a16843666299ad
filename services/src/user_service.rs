use crate::error::{ServiceError, ServiceResult, is_unique_violation};
use crate::outbox::{DomainEvent, Outbox};
use crate::policy::{self, Actor, Capability};
use crate::ticket_service::remove_attachment_files;
use chrono::Utc;
use common::{normalize_email, validate_password};
use db::filters::UserFilter;
use db::models::{
    knowledge_article, notification, session, ticket, ticket_attachment, ticket_comment,
    user::{self, Role},
};
use rand::Rng;
use rand::distr::Alphanumeric;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::path::Path;
use std::sync::OnceLock;

pub use db::models::user::Model as User;

const TEMP_PASSWORD_LEN: usize = 12;

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
}

/// Fields a user may change on their own account.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_notifications: Option<bool>,
    pub in_app_notifications: Option<bool>,
    pub theme: Option<String>,
}

/// Result of an account operation that generated a password.
///
/// `temporary_password` is only populated when the email carrying it could
/// not be delivered, so the admin can pass it on.
#[derive(Debug, Clone)]
pub struct IssuedCredentials {
    pub user: User,
    pub temporary_password: Option<String>,
    pub email_sent: bool,
}

pub fn generate_temporary_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TEMP_PASSWORD_LEN)
        .map(char::from)
        .collect()
}

/// Account whose hash is verified for unknown emails, so both failure paths cost the same.
fn timing_decoy() -> Option<&'static User> {
    static DUMMY: OnceLock<Option<User>> = OnceLock::new();
    DUMMY
        .get_or_init(|| {
            let now = Utc::now();
            user::hash_password("not-a-real-password").ok().map(|hash| User {
                id: 0,
                email: String::new(),
                first_name: String::new(),
                last_name: String::new(),
                role: Role::EndUser,
                is_active: false,
                password_hash: hash,
                email_notifications: false,
                in_app_notifications: false,
                theme: String::new(),
                created_at: now,
                updated_at: now,
            })
        })
        .as_ref()
}

fn required(field: &str, value: &str) -> ServiceResult<String> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ServiceError::validation(format!("{field} is required")));
    }
    Ok(v.to_owned())
}

fn map_conflict(err: sea_orm::DbErr) -> ServiceError {
    if is_unique_violation(&err) {
        ServiceError::Conflict("A user with this email already exists".into())
    } else {
        err.into()
    }
}

pub struct UserService;

impl UserService {
    /// Password is checked before the active flag so a deactivated account is
    /// only revealed to someone who knows its password.
    pub async fn authenticate(
        db: &DatabaseConnection,
        email: &str,
        password: &str,
    ) -> ServiceResult<User> {
        let Some(user) = user::Model::find_by_email(db, email).await? else {
            if let Some(decoy) = timing_decoy() {
                let _ = decoy.verify_password(password);
            }
            tracing::info!("login rejected: unknown email");
            return Err(ServiceError::InvalidCredentials);
        };
        if !user.verify_password(password) {
            tracing::info!(user_id = user.id, "login rejected: bad password");
            return Err(ServiceError::InvalidCredentials);
        }
        if !user.is_active {
            tracing::info!(user_id = user.id, "login rejected: account deactivated");
            return Err(ServiceError::AccountDeactivated);
        }
        Ok(user)
    }

    pub async fn get(db: &DatabaseConnection, id: i64) -> ServiceResult<User> {
        user::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("User {id} not found")))
    }

    pub async fn list(
        db: &DatabaseConnection,
        actor: &Actor,
        filter: &UserFilter,
    ) -> ServiceResult<Vec<User>> {
        policy::require(actor, Capability::ViewUsers)?;
        Ok(user::Entity::find()
            .filter(filter.condition())
            .order_by_asc(user::Column::LastName)
            .order_by_asc(user::Column::FirstName)
            .order_by_asc(user::Column::Id)
            .all(db)
            .await?)
    }

    /// Active users who can receive ticket assignments.
    pub async fn list_assignable(db: &DatabaseConnection, actor: &Actor) -> ServiceResult<Vec<User>> {
        policy::require(actor, Capability::ViewStaffDirectory)?;
        Ok(user::Entity::find()
            .filter(user::Column::IsActive.eq(true))
            .filter(user::Column::Role.is_in(Role::staff_roles()))
            .order_by_asc(user::Column::FirstName)
            .order_by_asc(user::Column::LastName)
            .all(db)
            .await?)
    }

    pub async fn create(
        db: &DatabaseConnection,
        outbox: &dyn Outbox,
        actor: &Actor,
        req: CreateUser,
    ) -> ServiceResult<IssuedCredentials> {
        policy::require(actor, Capability::ManageUsers)?;
        let email = normalize_email(&req.email);
        if email.is_empty() {
            return Err(ServiceError::validation("Email is required"));
        }
        if user::Model::find_by_email(db, &email).await?.is_some() {
            return Err(ServiceError::Conflict(
                "A user with this email already exists".into(),
            ));
        }

        let password = generate_temporary_password();
        let created = user::Model::create(
            db,
            &email,
            &required("First name", &req.first_name)?,
            &required("Last name", &req.last_name)?,
            req.role,
            &password,
        )
        .await
        .map_err(map_conflict)?;

        tracing::info!(user_id = created.id, role = %created.role, by = actor.id, "user created");
        let delivery = outbox
            .publish(DomainEvent::UserCreated {
                user: created.clone(),
                temporary_password: password.clone(),
            })
            .await;

        Ok(IssuedCredentials {
            user: created,
            temporary_password: (!delivery.email_delivered).then_some(password),
            email_sent: delivery.email_delivered,
        })
    }

    pub async fn update(
        db: &DatabaseConnection,
        actor: &Actor,
        id: i64,
        req: UpdateUser,
    ) -> ServiceResult<User> {
        policy::require(actor, Capability::ManageUsers)?;
        let current = Self::get(db, id).await?;
        if id == actor.id && req.role.is_some_and(|r| r != current.role) {
            return Err(ServiceError::validation("You cannot change your own role"));
        }
        let mut active = current.into_active_model();

        if let Some(email) = req.email {
            let email = normalize_email(&email);
            if email.is_empty() {
                return Err(ServiceError::validation("Email is required"));
            }
            if let Some(other) = user::Model::find_by_email(db, &email).await? {
                if other.id != id {
                    return Err(ServiceError::Conflict(
                        "A user with this email already exists".into(),
                    ));
                }
            }
            active.email = Set(email);
        }
        if let Some(first) = req.first_name {
            active.first_name = Set(required("First name", &first)?);
        }
        if let Some(last) = req.last_name {
            active.last_name = Set(required("Last name", &last)?);
        }
        let loses_assignments = req
            .role
            .is_some_and(|r| !policy::has_capability(r, Capability::ReceiveAssignments));
        if let Some(role) = req.role {
            active.role = Set(role);
        }
        active.updated_at = Set(Utc::now());

        let txn = db.begin().await?;
        let updated = active.update(&txn).await.map_err(map_conflict)?;
        if loses_assignments {
            let cleared = ticket::Entity::update_many()
                .col_expr(ticket::Column::AssignedTo, Expr::value(Option::<i64>::None))
                .col_expr(ticket::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(ticket::Column::AssignedTo.eq(id))
                .exec(&txn)
                .await?;
            if cleared.rows_affected > 0 {
                tracing::info!(user_id = id, tickets = cleared.rows_affected, "assignments cleared after role change");
            }
        }
        txn.commit().await?;
        tracing::info!(user_id = id, by = actor.id, "user updated");
        Ok(updated)
    }

    /// Activates or deactivates an account. Existing sessions are left in
    /// place; they fail on their next use.
    pub async fn set_active(
        db: &DatabaseConnection,
        actor: &Actor,
        id: i64,
        is_active: bool,
    ) -> ServiceResult<User> {
        policy::require(actor, Capability::ManageUsers)?;
        if id == actor.id && !is_active {
            return Err(ServiceError::validation(
                "You cannot deactivate your own account",
            ));
        }
        let mut active = Self::get(db, id).await?.into_active_model();
        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now());
        let updated = active.update(db).await?;
        tracing::info!(user_id = id, is_active, by = actor.id, "user status changed");
        Ok(updated)
    }

    pub async fn reset_password(
        db: &DatabaseConnection,
        outbox: &dyn Outbox,
        actor: &Actor,
        id: i64,
    ) -> ServiceResult<IssuedCredentials> {
        policy::require(actor, Capability::ManageUsers)?;
        let target = Self::get(db, id).await?;
        let password = generate_temporary_password();
        let updated = user::Model::set_password(db, target.id, &password).await?;
        tracing::info!(user_id = id, by = actor.id, "password reset");

        let delivery = outbox
            .publish(DomainEvent::PasswordReset {
                user: updated.clone(),
                temporary_password: password.clone(),
            })
            .await;
        Ok(IssuedCredentials {
            user: updated,
            temporary_password: (!delivery.email_delivered).then_some(password),
            email_sent: delivery.email_delivered,
        })
    }

    /// Deletes an account together with everything it owns, including
    /// attachment files on disk.
    pub async fn delete(
        db: &DatabaseConnection,
        uploads_root: &Path,
        actor: &Actor,
        id: i64,
    ) -> ServiceResult<()> {
        policy::require(actor, Capability::ManageUsers)?;
        if id == actor.id {
            return Err(ServiceError::validation("You cannot delete your own account"));
        }
        let target = Self::get(db, id).await?;

        let owned_ticket_ids: Vec<i64> = ticket::Entity::find()
            .filter(ticket::Column::CreatedBy.eq(target.id))
            .all(db)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();
        let attachments = ticket_attachment::Entity::find()
            .filter(
                Condition::any()
                    .add(ticket_attachment::Column::TicketId.is_in(owned_ticket_ids.clone()))
                    .add(ticket_attachment::Column::UploadedBy.eq(target.id)),
            )
            .all(db)
            .await?;

        let txn = db.begin().await?;
        ticket_attachment::Entity::delete_many()
            .filter(
                ticket_attachment::Column::Id.is_in(attachments.iter().map(|a| a.id).collect::<Vec<_>>()),
            )
            .exec(&txn)
            .await?;
        ticket_comment::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(ticket_comment::Column::TicketId.is_in(owned_ticket_ids.clone()))
                    .add(ticket_comment::Column::AuthorId.eq(target.id)),
            )
            .exec(&txn)
            .await?;
        ticket::Entity::delete_many()
            .filter(ticket::Column::Id.is_in(owned_ticket_ids.clone()))
            .exec(&txn)
            .await?;
        ticket::Entity::update_many()
            .col_expr(ticket::Column::AssignedTo, Expr::value(Option::<i64>::None))
            .filter(ticket::Column::AssignedTo.eq(target.id))
            .exec(&txn)
            .await?;
        knowledge_article::Entity::update_many()
            .col_expr(knowledge_article::Column::AuthorId, Expr::value(Option::<i64>::None))
            .filter(knowledge_article::Column::AuthorId.eq(target.id))
            .exec(&txn)
            .await?;
        notification::Entity::delete_many()
            .filter(notification::Column::UserId.eq(target.id))
            .exec(&txn)
            .await?;
        session::Model::delete_for_user(&txn, target.id).await?;
        user::Entity::delete_by_id(target.id).exec(&txn).await?;
        txn.commit().await?;

        remove_attachment_files(uploads_root, &attachments).await;
        for ticket_id in owned_ticket_ids {
            let _ = tokio::fs::remove_dir_all(util::paths::ticket_dir(uploads_root, ticket_id)).await;
        }
        tracing::info!(user_id = id, by = actor.id, "user deleted");
        Ok(())
    }

    pub async fn update_profile(
        db: &DatabaseConnection,
        actor: &Actor,
        req: UpdateProfile,
    ) -> ServiceResult<User> {
        let mut active = Self::get(db, actor.id).await?.into_active_model();
        if let Some(first) = req.first_name {
            active.first_name = Set(required("First name", &first)?);
        }
        if let Some(last) = req.last_name {
            active.last_name = Set(required("Last name", &last)?);
        }
        if let Some(flag) = req.email_notifications {
            active.email_notifications = Set(flag);
        }
        if let Some(flag) = req.in_app_notifications {
            active.in_app_notifications = Set(flag);
        }
        if let Some(theme) = req.theme {
            let theme = theme.trim().to_ascii_lowercase();
            if !matches!(theme.as_str(), "light" | "dark" | "system") {
                return Err(ServiceError::validation(
                    "Theme must be one of light, dark or system",
                ));
            }
            active.theme = Set(theme);
        }
        active.updated_at = Set(Utc::now());
        Ok(active.update(db).await?)
    }

    pub async fn change_password(
        db: &DatabaseConnection,
        actor: &Actor,
        current_password: &str,
        new_password: &str,
    ) -> ServiceResult<()> {
        let user = Self::get(db, actor.id).await?;
        if !user.verify_password(current_password) {
            return Err(ServiceError::validation("Current password is incorrect"));
        }
        validate_password(new_password).map_err(|e| {
            ServiceError::validation(
                e.message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Password is too weak".into()),
            )
        })?;
        user::Model::set_password(db, user.id, new_password).await?;
        tracing::info!(user_id = user.id, "password changed");
        Ok(())
    }
}
