use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

pub mod entities;
pub mod models;
pub mod types;

pub use sea_orm::{ConnectionTrait, DbErr, TransactionTrait};

#[derive(Clone)]
pub struct DBService {
    pub conn: DatabaseConnection,
}

impl DBService {
    /// Connect and bring the schema up to date. Anything sqlx understands
    /// works; sqlite for local use, postgres for real deployments.
    pub async fn new(database_url: &str) -> Result<DBService, DbErr> {
        let conn = Database::connect(database_url).await?;
        db_migration::Migrator::up(&conn, None).await?;
        Ok(DBService { conn })
    }
}
