pub mod auth;
pub mod fields;
pub mod users;
