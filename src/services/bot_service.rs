//! Domain service for bot records owned by users.

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::constants::limits::MAX_BOT_ID_LEN;
use crate::db::Repository;
use crate::models::{Bot, Document, User};

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Bot with id {0} not found")]
    NotFound(String),

    #[error("Bot with id {0} already exists")]
    AlreadyExists(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for BotError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

/// Fields a client supplies when creating a bot; the owner comes from the
/// authenticated user.
#[derive(Debug, Clone)]
pub struct NewBot {
    pub bot_id: String,
    pub token: String,
    pub state: Document,
    pub config: Document,
}

pub struct BotService {
    repo: Arc<dyn Repository>,
}

impl BotService {
    #[must_use]
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    pub async fn list_for(&self, owner: &User) -> Result<Vec<Bot>, BotError> {
        Ok(self.repo.list_bots_by_owner(&owner.login).await?)
    }

    pub async fn get(&self, bot_id: &str) -> Result<Bot, BotError> {
        self.repo
            .find_bot_by_id(bot_id)
            .await?
            .ok_or_else(|| BotError::NotFound(bot_id.to_string()))
    }

    /// Stores a new bot owned by `owner`.
    ///
    /// # Errors
    ///
    /// [`BotError::AlreadyExists`] when the id is taken, including when a
    /// concurrent create wins between the lookup and the insert.
    pub async fn create(&self, owner: &User, new_bot: NewBot) -> Result<Bot, BotError> {
        validate_bot_id(&new_bot.bot_id)?;

        if self.repo.find_bot_by_id(&new_bot.bot_id).await?.is_some() {
            return Err(BotError::AlreadyExists(new_bot.bot_id));
        }

        let bot = Bot {
            bot_id: new_bot.bot_id,
            token: new_bot.token,
            state: new_bot.state,
            config: new_bot.config,
            owner_login: owner.login.clone(),
        };

        if !self.repo.insert_bot(&bot).await? {
            return Err(BotError::AlreadyExists(bot.bot_id));
        }

        info!(bot_id = %bot.bot_id, owner = %owner.login, "Bot created");
        Ok(bot)
    }

    /// Deletes by id and returns the removed record.
    pub async fn delete(&self, bot_id: &str) -> Result<Bot, BotError> {
        let bot = self
            .repo
            .delete_bot(bot_id)
            .await?
            .ok_or_else(|| BotError::NotFound(bot_id.to_string()))?;

        info!(bot_id = %bot.bot_id, "Bot deleted");
        Ok(bot)
    }

    /// Ids of every bot `owner` holds, as a JSON array string.
    pub async fn describe_owned(&self, owner: &User) -> Result<String, BotError> {
        let ids: Vec<String> = self
            .list_for(owner)
            .await?
            .into_iter()
            .map(|b| b.bot_id)
            .collect();

        serde_json::to_string(&ids).map_err(|e| BotError::Database(e.to_string()))
    }
}

pub fn validate_bot_id(bot_id: &str) -> Result<(), BotError> {
    if bot_id.is_empty() {
        return Err(BotError::Validation("Bot id cannot be empty".to_string()));
    }

    if bot_id.chars().count() > MAX_BOT_ID_LEN {
        return Err(BotError::Validation(format!(
            "Bot id must be {MAX_BOT_ID_LEN} characters or less"
        )));
    }

    if bot_id.contains('/') {
        return Err(BotError::Validation(
            "Bot id cannot contain '/'".to_string(),
        ));
    }

    Ok(())
}
