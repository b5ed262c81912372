pub mod access;
pub mod credential;
pub mod roles;

pub use roles::require_roles;
