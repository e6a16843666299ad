use super::DEMO_PASSWORD;
use crate::seed::Seeder;
use db::models::user::{Model, Role};
use fake::{
    Fake,
    faker::name::en::{FirstName, LastName},
};
use sea_orm::DatabaseConnection;

pub struct UserSeeder;

#[async_trait::async_trait]
impl Seeder for UserSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> anyhow::Result<()> {
        // Fixed accounts, one per role
        for (email, first, last, role) in [
            ("admin@example.com", "Ada", "Admin", Role::Admin),
            ("manager@example.com", "Morgan", "Manager", Role::Manager),
            ("staff@example.com", "Sam", "Support", Role::ItStaff),
            ("staff2@example.com", "Taylor", "Tech", Role::ItStaff),
            ("user@example.com", "Uma", "User", Role::EndUser),
        ] {
            if Model::find_by_email(db, email).await?.is_none() {
                Model::create(db, email, first, last, role, DEMO_PASSWORD).await?;
            }
        }

        // Random end users
        for i in 0..10 {
            let first: String = FirstName().fake();
            let last: String = LastName().fake();
            let email = format!(
                "{}.{}{}@example.com",
                first.to_lowercase(),
                last.to_lowercase(),
                i
            );
            if Model::find_by_email(db, &email).await?.is_none() {
                Model::create(db, &email, &first, &last, Role::EndUser, DEMO_PASSWORD).await?;
            }
        }
        Ok(())
    }
}
