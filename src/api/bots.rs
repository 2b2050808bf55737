use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::auth::{Authenticated, CurrentUser};
use super::{ApiError, AppState, BotDto};

/// GET /bots
pub async fn list_bots(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Authenticated,
) -> Result<Json<Vec<BotDto>>, ApiError> {
    let bots = state.bots.list_for(&user).await?;
    Ok(Json(bots.into_iter().map(BotDto::from).collect()))
}

/// GET /bots/{bot_id}
pub async fn get_bot(
    State(state): State<Arc<AppState>>,
    Path(bot_id): Path<String>,
) -> Result<Json<BotDto>, ApiError> {
    let bot = state.bots.get(&bot_id).await?;
    Ok(Json(BotDto::from(bot)))
}

/// POST /bots
pub async fn create_bot(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Authenticated,
    Json(payload): Json<BotDto>,
) -> Result<Json<BotDto>, ApiError> {
    let bot = state.bots.create(&user, payload.into()).await?;
    Ok(Json(BotDto::from(bot)))
}

/// DELETE /bots/{bot_id}
pub async fn delete_bot(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Authenticated,
    Path(bot_id): Path<String>,
) -> Result<Json<BotDto>, ApiError> {
    let bot = state.bots.delete(&bot_id).await?;
    tracing::debug!(by = %user.login, "Deleted bot {}", bot.bot_id);
    Ok(Json(BotDto::from(bot)))
}
