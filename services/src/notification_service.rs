use crate::error::{ServiceError, ServiceResult};
use crate::policy::Actor;
use db::models::notification::{self, NotificationKind};
use db::models::user;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde_json::Value;

pub use db::models::notification::Model as Notification;

/// Most recent notifications returned per request.
const LIST_LIMIT: u64 = 100;

pub struct NotificationService;

impl NotificationService {
    /// Stores an in-app notification unless the recipient opted out.
    /// Returns `None` when skipped.
    pub async fn notify(
        db: &DatabaseConnection,
        recipient: &user::Model,
        kind: NotificationKind,
        title: &str,
        message: &str,
        data: Option<Value>,
    ) -> ServiceResult<Option<Notification>> {
        if !recipient.in_app_notifications || !recipient.is_active {
            return Ok(None);
        }
        let created =
            notification::Model::create(db, recipient.id, kind, title, message, data).await?;
        Ok(Some(created))
    }

    pub async fn list(
        db: &DatabaseConnection,
        actor: &Actor,
        unread_only: bool,
    ) -> ServiceResult<Vec<Notification>> {
        let mut query = notification::Entity::find()
            .filter(notification::Column::UserId.eq(actor.id));
        if unread_only {
            query = query.filter(notification::Column::IsRead.eq(false));
        }
        Ok(query
            .order_by_desc(notification::Column::CreatedAt)
            .order_by_desc(notification::Column::Id)
            .limit(LIST_LIMIT)
            .all(db)
            .await?)
    }

    pub async fn mark_read(
        db: &DatabaseConnection,
        actor: &Actor,
        id: i64,
    ) -> ServiceResult<Notification> {
        let res = notification::Entity::update_many()
            .col_expr(notification::Column::IsRead, Expr::value(true))
            .filter(notification::Column::Id.eq(id))
            .filter(notification::Column::UserId.eq(actor.id))
            .exec(db)
            .await?;
        if res.rows_affected == 0 {
            return Err(ServiceError::not_found(format!("Notification {id} not found")));
        }
        notification::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Notification {id} not found")))
    }

    pub async fn mark_all_read(db: &DatabaseConnection, actor: &Actor) -> ServiceResult<u64> {
        let res = notification::Entity::update_many()
            .col_expr(notification::Column::IsRead, Expr::value(true))
            .filter(notification::Column::UserId.eq(actor.id))
            .filter(notification::Column::IsRead.eq(false))
            .exec(db)
            .await?;
        Ok(res.rows_affected)
    }

    pub async fn unread_count(db: &DatabaseConnection, actor: &Actor) -> ServiceResult<u64> {
        Ok(notification::Entity::find()
            .filter(notification::Column::UserId.eq(actor.id))
            .filter(notification::Column::IsRead.eq(false))
            .count(db)
            .await?)
    }
}
