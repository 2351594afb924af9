use std::env;
use std::str::FromStr;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
}

fn optional<T: FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().with_context(|| format!("{} 값이 올바르지 않습니다: {}", key, raw)),
        Err(_) => Ok(default),
    }
}

impl Settings {
    /// `.env`를 읽은 뒤 환경 변수에서 설정을 구성한다.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL 환경 변수가 필요합니다")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET 환경 변수가 필요합니다")?,
            host: optional("APP_HOST", "127.0.0.1".to_string())?,
            port: optional("APP_PORT", 8080)?,
            db_max_connections: optional("DB_MAX_CONNECTIONS", 10)?,
            db_min_connections: optional("DB_MIN_CONNECTIONS", 5)?,
        })
    }

    pub fn address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}
