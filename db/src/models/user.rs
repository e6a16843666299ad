use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::QueryFilter;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Represents a user in the `users` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Stored lowercased; unique.
    #[sea_orm(unique)]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    /// Inactive accounts can neither log in nor use an existing session.
    pub is_active: bool,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email_notifications: bool,
    pub in_app_notifications: bool,
    pub theme: String,
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
pub enum Role {
    #[sea_orm(string_value = "end_user")]
    EndUser,
    #[sea_orm(string_value = "it_staff")]
    ItStaff,
    #[sea_orm(string_value = "manager")]
    Manager,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl Role {
    /// it_staff, manager and admin.
    pub fn is_staff(self) -> bool {
        !matches!(self, Role::EndUser)
    }

    pub fn staff_roles() -> [Role; 3] {
        [Role::ItStaff, Role::Manager, Role::Admin]
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Hashes a plaintext password with Argon2 and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, DbErr> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| DbErr::Custom(format!("password hashing failed: {e}")))
}

impl Model {
    /// Inserts a new active user with default preferences.
    pub async fn create(
        db: &impl ConnectionTrait,
        email: &str,
        first_name: &str,
        last_name: &str,
        role: Role,
        password: &str,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();
        let active = ActiveModel {
            email: Set(email.trim().to_lowercase()),
            first_name: Set(first_name.trim().to_owned()),
            last_name: Set(last_name.trim().to_owned()),
            role: Set(role),
            is_active: Set(true),
            password_hash: Set(hash_password(password)?),
            email_notifications: Set(true),
            in_app_notifications: Set(true),
            theme: Set("system".to_owned()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        active.insert(db).await
    }

    pub async fn find_by_email(
        db: &impl ConnectionTrait,
        email: &str,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::Email.eq(email.trim().to_lowercase()))
            .one(db)
            .await
    }

    pub async fn set_password(
        db: &impl ConnectionTrait,
        user_id: i64,
        password: &str,
    ) -> Result<Model, DbErr> {
        let active = ActiveModel {
            id: Set(user_id),
            password_hash: Set(hash_password(password)?),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        active.update(db).await
    }

    /// Constant-time Argon2 verification; malformed hashes never verify.
    pub fn verify_password(&self, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.password_hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;
    use std::str::FromStr;

    #[tokio::test]
    async fn create_lowercases_email_and_hashes_password() {
        let db = setup_test_db().await;
        let user = Model::create(&db, " Alice@Example.com ", "Alice", "Smith", Role::EndUser, "hunter22")
            .await
            .unwrap();

        assert_eq!(user.email, "alice@example.com");
        assert_ne!(user.password_hash, "hunter22");
        assert!(user.verify_password("hunter22"));
        assert!(!user.verify_password("wrong"));

        let found = Model::find_by_email(&db, "ALICE@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let db = setup_test_db().await;
        Model::create(&db, "dup@example.com", "A", "B", Role::EndUser, "password1")
            .await
            .unwrap();
        let second = Model::create(&db, "DUP@example.com", "C", "D", Role::Admin, "password2").await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn set_password_replaces_hash() {
        let db = setup_test_db().await;
        let user = Model::create(&db, "p@example.com", "P", "Q", Role::ItStaff, "original1")
            .await
            .unwrap();
        let updated = Model::set_password(&db, user.id, "changed12").await.unwrap();
        assert!(updated.verify_password("changed12"));
        assert!(!updated.verify_password("original1"));
    }

    #[test]
    fn role_round_trips_through_strings() {
        assert_eq!(Role::ItStaff.to_string(), "it_staff");
        assert_eq!(Role::from_str("END_USER").unwrap(), Role::EndUser);
        assert!(Role::Manager.is_staff());
        assert!(!Role::EndUser.is_staff());
    }
}
