/*
 * Responsibility
 * - sign-up / sign-in の request DTO
 * - 必須フィールドも Option で受け、欠落は validation error (400) として返す
 */
use serde::Deserialize;

use crate::api::v1::dto::fields;
use crate::error::FieldViolation;
use crate::services::auth::Password;

/// Public sign-up always creates a `user`; roles are changed by an admin via PUT /users/{id}.
#[derive(Debug, Default, Deserialize)]
pub struct SignUpRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<Password>,
}

#[derive(Debug)]
pub struct SignUp {
    pub name: String,
    pub email: String,
    pub password: Password,
}

impl SignUpRequest {
    pub fn validate(self) -> Result<SignUp, Vec<FieldViolation>> {
        let name = fields::required("name", self.name).and_then(|v| fields::name(&v));
        let email = fields::required("email", self.email).and_then(|v| fields::email(&v));
        let password = fields::required("password", self.password)
            .and_then(|p| fields::password(&p).map(|()| p));

        match (name, email, password) {
            (Ok(name), Ok(email), Ok(password)) => Ok(SignUp {
                name,
                email,
                password,
            }),
            (name, email, password) => Err([name.err(), email.err(), password.err()]
                .into_iter()
                .flatten()
                .collect()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SignInRequest {
    pub email: Option<String>,
    pub password: Option<Password>,
}

#[derive(Debug)]
pub struct SignIn {
    pub email: String,
    pub password: Password,
}

impl SignInRequest {
    // sign-in では長さチェックをしない (既存ユーザーのポリシー変更に備えて)
    pub fn validate(self) -> Result<SignIn, Vec<FieldViolation>> {
        let email = fields::required("email", self.email).and_then(|v| fields::email(&v));
        let password = fields::required("password", self.password);

        match (email, password) {
            (Ok(email), Ok(password)) => Ok(SignIn { email, password }),
            (email, password) => Err([email.err(), password.err()]
                .into_iter()
                .flatten()
                .collect()),
        }
    }
}
