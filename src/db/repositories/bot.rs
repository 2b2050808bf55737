use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
    TransactionTrait,
};
use serde_json::Value;
use tracing::info;

use crate::entities::{bots, prelude::*};
use crate::models::{Bot, bot::document_from_value};

/// Repository for bot records
pub struct BotRepository {
    conn: DatabaseConnection,
}

impl BotRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_bot_model(m: bots::Model) -> Bot {
        Bot {
            bot_id: m.bot_id,
            token: m.token,
            state: document_from_value(m.state),
            config: document_from_value(m.config),
            owner_login: m.owner_login,
        }
    }

    pub async fn get(&self, bot_id: &str) -> Result<Option<Bot>> {
        let row = Bots::find_by_id(bot_id.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query bot by id")?;

        Ok(row.map(Self::map_bot_model))
    }

    pub async fn list_for_owner(&self, owner_login: &str) -> Result<Vec<Bot>> {
        let rows = Bots::find()
            .filter(bots::Column::OwnerLogin.eq(owner_login))
            .order_by_asc(bots::Column::BotId)
            .all(&self.conn)
            .await
            .context("Failed to list bots for owner")?;

        Ok(rows.into_iter().map(Self::map_bot_model).collect())
    }

    pub async fn add(&self, bot: &Bot) -> Result<bool> {
        let active = bots::ActiveModel {
            bot_id: Set(bot.bot_id.clone()),
            token: Set(bot.token.clone()),
            state: Set(Value::Object(bot.state.clone())),
            config: Set(Value::Object(bot.config.clone())),
            owner_login: Set(bot.owner_login.clone()),
        };

        match Bots::insert(active).exec_without_returning(&self.conn).await {
            Ok(_) => {
                info!("Added bot {} for {}", bot.bot_id, bot.owner_login);
                Ok(true)
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(false)
            }
            Err(e) => Err(e).context("Failed to insert bot"),
        }
    }

    pub async fn remove(&self, bot_id: &str) -> Result<Option<Bot>> {
        let txn = self.conn.begin().await?;

        let Some(row) = Bots::find_by_id(bot_id.to_string()).one(&txn).await? else {
            return Ok(None);
        };

        let result = Bots::delete_by_id(bot_id.to_string()).exec(&txn).await?;
        txn.commit().await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        info!("Removed bot {}", bot_id);
        Ok(Some(Self::map_bot_model(row)))
    }
}
