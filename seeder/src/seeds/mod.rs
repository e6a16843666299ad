pub mod article;
pub mod comment;
pub mod ticket;
pub mod user;

use db::models::user::{self as user_model, Role};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Password shared by every seeded account.
pub const DEMO_PASSWORD: &str = "password123";

pub async fn users_with_role(db: &DatabaseConnection, role: Role) -> anyhow::Result<Vec<user_model::Model>> {
    Ok(user_model::Entity::find()
        .filter(user_model::Column::Role.eq(role))
        .filter(user_model::Column::IsActive.eq(true))
        .all(db)
        .await?)
}

/// Picks a random element. `None` for an empty slice.
pub fn pick<T>(items: &[T]) -> Option<&T> {
    if items.is_empty() {
        None
    } else {
        items.get(fastrand::usize(..items.len()))
    }
}
