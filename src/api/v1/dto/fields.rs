/*
 * Responsibility
 * - users / auth DTO で共通のフィールド検証 (形式チェックのみ)
 * - 正規化 (trim, lowercase) した値を返す
 */
use crate::error::FieldViolation;
use crate::services::auth::Password;
use crate::services::authz::Role;

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 255;
const EMAIL_MAX: usize = 255;
const PASSWORD_MIN: usize = 6;
const PASSWORD_MAX: usize = 128;

pub fn name(raw: &str) -> Result<String, FieldViolation> {
    let name = raw.trim();
    let len = name.chars().count();
    if len < NAME_MIN {
        return Err(FieldViolation::new(
            "name",
            format!("must be at least {NAME_MIN} characters"),
        ));
    }
    if len > NAME_MAX {
        return Err(FieldViolation::new(
            "name",
            format!("must be at most {NAME_MAX} characters"),
        ));
    }
    Ok(name.to_string())
}

pub fn email(raw: &str) -> Result<String, FieldViolation> {
    let email = raw.trim().to_lowercase();
    if email.chars().count() > EMAIL_MAX {
        return Err(FieldViolation::new(
            "email",
            format!("must be at most {EMAIL_MAX} characters"),
        ));
    }
    if !looks_like_email(&email) {
        return Err(FieldViolation::new("email", "invalid email address"));
    }
    Ok(email)
}

// local@domain.tld 程度の形だけ見る
fn looks_like_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || s.chars().any(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2,
        None => false,
    }
}

pub fn password(raw: &Password) -> Result<(), FieldViolation> {
    let len = raw.char_count();
    if len < PASSWORD_MIN {
        return Err(FieldViolation::new(
            "password",
            format!("must be at least {PASSWORD_MIN} characters"),
        ));
    }
    if len > PASSWORD_MAX {
        return Err(FieldViolation::new(
            "password",
            format!("must be at most {PASSWORD_MAX} characters"),
        ));
    }
    Ok(())
}

pub fn role(raw: &str) -> Result<Role, FieldViolation> {
    raw.parse::<Role>()
        .map_err(|_| FieldViolation::new("role", "must be one of: user, admin"))
}

pub fn required<T>(field: &'static str, value: Option<T>) -> Result<T, FieldViolation> {
    value.ok_or_else(|| FieldViolation::new(field, "is required"))
}
