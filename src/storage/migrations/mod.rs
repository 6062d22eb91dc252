use sea_orm_migration::prelude::*;

mod m20250601_000001_create_users;
mod m20250601_000002_create_chats;
mod m20250601_000003_create_messages;
mod m20250601_000004_create_transactions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_users::Migration),
            Box::new(m20250601_000002_create_chats::Migration),
            Box::new(m20250601_000003_create_messages::Migration),
            Box::new(m20250601_000004_create_transactions::Migration),
        ]
    }
}
