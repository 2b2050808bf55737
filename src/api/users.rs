use axum::{Extension, Json, extract::State};
use std::sync::Arc;

use super::auth::{Authenticated, CurrentUser};
use super::{ApiError, AppState, UserDto};

/// GET /me
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Authenticated,
) -> Result<Json<UserDto>, ApiError> {
    let bots = state.bots.describe_owned(&user).await?;

    Ok(Json(UserDto {
        login: user.login,
        password: user.password,
        bots,
    }))
}
