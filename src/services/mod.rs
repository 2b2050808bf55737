pub mod auth_service;
pub use auth_service::{AuthError, AuthService};

pub mod bot_service;
pub use bot_service::{BotError, BotService, NewBot};

pub mod password;
pub use password::PasswordHasher;

pub mod token;
pub use token::{Claims, TokenError, TokenIssuer};
