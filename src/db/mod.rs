use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::models::{Bot, User};

pub mod memory;
pub mod migrator;
pub mod repositories;
mod repository;

pub use memory::MemoryStore;
pub use repository::Repository;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        if !in_memory && let Some(path_str) = db_url.strip_prefix("sqlite:") {
            let path_str = path_str.trim_start_matches("//");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        // every pooled connection to :memory: would open its own empty database
        if in_memory {
            opt.max_connections(1).min_connections(1);
        } else {
            opt.max_connections(max_connections)
                .min_connections(min_connections)
                .idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn bot_repo(&self) -> repositories::bot::BotRepository {
        repositories::bot::BotRepository::new(self.conn.clone())
    }
}

#[async_trait]
impl Repository for Store {
    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>> {
        self.user_repo().get_by_login(login).await
    }

    async fn insert_user(&self, user: &User) -> Result<bool> {
        self.user_repo().create(user).await
    }

    async fn find_bot_by_id(&self, bot_id: &str) -> Result<Option<Bot>> {
        self.bot_repo().get(bot_id).await
    }

    async fn list_bots_by_owner(&self, owner_login: &str) -> Result<Vec<Bot>> {
        self.bot_repo().list_for_owner(owner_login).await
    }

    async fn insert_bot(&self, bot: &Bot) -> Result<bool> {
        self.bot_repo().add(bot).await
    }

    async fn delete_bot(&self, bot_id: &str) -> Result<Option<Bot>> {
        self.bot_repo().remove(bot_id).await
    }

    async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }
}
