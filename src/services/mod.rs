pub mod auth;
pub mod authz;
