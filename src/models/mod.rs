pub mod bot;
pub mod user;

pub use bot::{Bot, Document};
pub use user::User;
