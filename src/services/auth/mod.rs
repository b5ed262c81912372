pub mod factory;
pub mod password;
pub mod token;

pub use factory::{build_password_hasher, build_token_codec};
pub use password::{Password, PasswordHasher};
pub use token::{TokenCodec, TokenError};
