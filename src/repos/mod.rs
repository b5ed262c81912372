pub mod error;
#[cfg(test)]
pub mod memory;
pub mod user_repo;

pub use user_repo::{PgUserRepo, UserRepo};
