use anyhow::{Context, Result};
use sea_orm::{DatabaseConnection, EntityTrait, Set, SqlErr};

use crate::entities::{prelude::*, users};
use crate::models::User;

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            login: model.login,
            password: model.password,
        }
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Get user by login
    pub async fn get_by_login(&self, login: &str) -> Result<Option<User>> {
        let user = Users::find_by_id(login.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query user by login")?;

        Ok(user.map(User::from))
    }

    /// Insert a user whose password is already hashed
    pub async fn create(&self, user: &User) -> Result<bool> {
        let active = users::ActiveModel {
            login: Set(user.login.clone()),
            password: Set(user.password.clone()),
        };

        match Users::insert(active).exec_without_returning(&self.conn).await {
            Ok(_) => Ok(true),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(false)
            }
            Err(e) => Err(e).context("Failed to insert user"),
        }
    }
}
