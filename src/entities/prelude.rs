pub use super::bots::Entity as Bots;
pub use super::users::Entity as Users;
