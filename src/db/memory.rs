use anyhow::{Result, bail};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::Repository;
use crate::models::{Bot, User};

#[derive(Default)]
struct Tables {
    users: BTreeMap<String, User>,
    bots: BTreeMap<String, Bot>,
}

/// In-process [`Repository`] with the same key and ownership rules as the
/// relational schema.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryStore {
    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(login).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&user.login) {
            return Ok(false);
        }
        tables.users.insert(user.login.clone(), user.clone());
        Ok(true)
    }

    async fn find_bot_by_id(&self, bot_id: &str) -> Result<Option<Bot>> {
        Ok(self.tables.read().await.bots.get(bot_id).cloned())
    }

    async fn list_bots_by_owner(&self, owner_login: &str) -> Result<Vec<Bot>> {
        Ok(self
            .tables
            .read()
            .await
            .bots
            .values()
            .filter(|bot| bot.owner_login == owner_login)
            .cloned()
            .collect())
    }

    async fn insert_bot(&self, bot: &Bot) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&bot.owner_login) {
            bail!(
                "FOREIGN KEY constraint failed: owner {} does not exist",
                bot.owner_login
            );
        }
        if tables.bots.contains_key(&bot.bot_id) {
            return Ok(false);
        }
        tables.bots.insert(bot.bot_id.clone(), bot.clone());
        Ok(true)
    }

    async fn delete_bot(&self, bot_id: &str) -> Result<Option<Bot>> {
        Ok(self.tables.write().await.bots.remove(bot_id))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
