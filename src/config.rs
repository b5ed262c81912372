/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, CORS 許可、JWT / Cookie 設定など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

/// HS256 の鍵長の下限 (bytes)
const MIN_JWT_SECRET_LEN: usize = 32;
/// access token の有効期間の上限 (1 年)
const MAX_JWT_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Auth cookie settings shared by the credential extractor and sign-in/out.
#[derive(Clone, Debug)]
pub struct CookieConfig {
    pub name: String,
    pub max_age_seconds: u64,
    pub secure: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "token".to_string(),
            max_age_seconds: 15 * 60,
            secure: false,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub database_max_connections: u32,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub jwt_secret: String,
    pub jwt_ttl_seconds: u64,
    pub jwt_leeway_seconds: u64,

    pub cookie: CookieConfig,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print secrets / credentials
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("jwt_ttl_seconds", &self.jwt_ttl_seconds)
            .field("cookie", &self.cookie)
            .finish_non_exhaustive()
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn check_jwt_ttl(seconds: u64) -> Result<u64, ConfigError> {
    if seconds == 0 || seconds > MAX_JWT_TTL_SECONDS {
        return Err(ConfigError::Invalid("JWT_TTL_SECONDS"));
    }
    Ok(seconds)
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = parse_or("PORT", 3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let database_max_connections = parse_or("DATABASE_MAX_CONNECTIONS", 10);

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let jwt_secret =
            std::env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Invalid("JWT_SECRET"));
        }

        let jwt_ttl_seconds = check_jwt_ttl(parse_or("JWT_TTL_SECONDS", 86_400))?; // 1 day
        let jwt_leeway_seconds = parse_or("JWT_LEEWAY_SECONDS", 0);

        let cookie_defaults = CookieConfig::default();
        let cookie = CookieConfig {
            name: std::env::var("AUTH_COOKIE_NAME").unwrap_or(cookie_defaults.name),
            max_age_seconds: parse_or(
                "AUTH_COOKIE_MAX_AGE_SECONDS",
                cookie_defaults.max_age_seconds,
            ),
            secure: app_env.is_production(),
        };

        Ok(Self {
            addr,
            database_url,
            database_max_connections,
            app_env,
            cors_allowed_origins,
            jwt_secret,
            jwt_ttl_seconds,
            jwt_leeway_seconds,
            cookie,
        })
    }
}
