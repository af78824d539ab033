use std::net::SocketAddr;
use std::path::PathBuf;

/// JWT secrets shipped in sample env files. Never accepted.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("CAMPUS_JWT_SECRET is unset or still a placeholder")]
    MissingSecret,
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub token_ttl_days: i64,
    pub fixture_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("CAMPUS_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            return Err(ConfigError::MissingSecret);
        }

        let db_path = lookup("CAMPUS_DB_PATH").unwrap_or_else(|| "campus.db".into()).into();
        let host = lookup("CAMPUS_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or(&lookup, "CAMPUS_PORT", 3000)?;
        let token_ttl_days = parse_or(&lookup, "CAMPUS_TOKEN_TTL_DAYS", 30)?;
        if token_ttl_days <= 0 {
            return Err(ConfigError::Invalid {
                name: "CAMPUS_TOKEN_TTL_DAYS",
                value: token_ttl_days.to_string(),
            });
        }
        let fixture_path = lookup("CAMPUS_FIXTURE_PATH")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            jwt_secret,
            db_path,
            host,
            port,
            token_ttl_days,
            fixture_path,
        })
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::Invalid { name: "CAMPUS_HOST", value: raw })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
