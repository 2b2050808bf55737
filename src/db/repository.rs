//! Storage seam for the auth and bot services.
//!
//! Services only ever see `Arc<dyn Repository>`; [`super::Store`] backs it with
//! `SeaORM` and [`super::MemoryStore`] with plain maps.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Bot, User};

#[async_trait]
pub trait Repository: Send + Sync {
    /// Exact-match lookup on the login primary key.
    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>>;

    /// Returns `false` when the login is already taken.
    async fn insert_user(&self, user: &User) -> Result<bool>;

    async fn find_bot_by_id(&self, bot_id: &str) -> Result<Option<Bot>>;

    /// Bots owned by `owner_login`, ordered by id.
    async fn list_bots_by_owner(&self, owner_login: &str) -> Result<Vec<Bot>>;

    /// Returns `false` when the id is already taken. Fails if the owner does
    /// not exist.
    async fn insert_bot(&self, bot: &Bot) -> Result<bool>;

    /// Removes the bot and hands back the deleted record.
    async fn delete_bot(&self, bot_id: &str) -> Result<Option<Bot>>;

    async fn ping(&self) -> Result<()>;
}
