use std::path::PathBuf;

use serde::Deserialize;
use tracing::warn;

const DEFAULT_JWT_SECRET: &str = "dev-secret-change-me";

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub data_file: PathBuf,
    pub jwt: JwtConfig,
    /// Allowed CORS origins; `*` allows any.
    pub client_origins: Vec<String>,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let data_file = std::env::var("DATA_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/db.json"));

        let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set; using the development secret");
            DEFAULT_JWT_SECRET.into()
        });
        let jwt = JwtConfig {
            secret,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "gainzkeeper".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "gainzkeeper-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 7),
        };

        let client_origins = parse_origins(
            &std::env::var("CLIENT_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = match std::env::var("APP_PORT") {
            Ok(v) => v.parse::<u16>()?,
            Err(_) => 4000,
        };

        Ok(Self {
            data_file,
            jwt,
            client_origins,
            host,
            port,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}
