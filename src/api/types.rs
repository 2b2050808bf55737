use serde::{Deserialize, Serialize};

use crate::models::{Bot, Document};
use crate::services::NewBot;

/// Error payload: `{"detail": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotDto {
    pub bot_id: String,
    pub token: String,
    pub state: Document,
    pub config: Document,
}

impl From<Bot> for BotDto {
    fn from(bot: Bot) -> Self {
        Self {
            bot_id: bot.bot_id,
            token: bot.token,
            state: bot.state,
            config: bot.config,
        }
    }
}

impl From<BotDto> for NewBot {
    fn from(dto: BotDto) -> Self {
        Self {
            bot_id: dto.bot_id,
            token: dto.token,
            state: dto.state,
            config: dto.config,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserDto {
    pub login: String,
    pub password: String,
    /// JSON array of owned bot ids, rendered as a string.
    pub bots: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
