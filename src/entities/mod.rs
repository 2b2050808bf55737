pub mod prelude;

pub mod bots;
pub mod users;
