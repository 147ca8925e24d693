use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub token_ttl_hours: i64,
    pub registration: RegistrationMode,
    pub cors_origins: Vec<String>,
    pub max_body_size: usize,
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationMode {
    /// Anyone may create an account through `/api/auth/register`.
    Open,
    /// Only the bootstrap account may self-register; managers create the rest.
    Closed,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;

        let host: IpAddr = env_or("ERM_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid ERM_HOST: {e}"))?;

        let port: u16 = env_or("ERM_PORT", "5000")
            .parse()
            .map_err(|e| format!("Invalid ERM_PORT: {e}"))?;

        let token_ttl_hours = parse_ttl_hours(&env_or("ERM_TOKEN_TTL_HOURS", "24"))?;

        let registration = parse_registration(&env_or("ERM_REGISTRATION", "open"))?;

        let cors_origins = parse_list(&env_or("ERM_CORS_ORIGINS", ""));

        let max_body_size: usize = env_or("ERM_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid ERM_MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("ERM_LOG_LEVEL", "info");

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            token_ttl_hours,
            registration,
            cors_origins,
            max_body_size,
            log_level,
        })
    }
}

/// Upper bound for bearer token lifetime: one year.
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

fn parse_ttl_hours(value: &str) -> Result<i64, String> {
    let hours: i64 = value
        .trim()
        .parse()
        .map_err(|e| format!("Invalid ERM_TOKEN_TTL_HOURS: {e}"))?;
    if !(1..=MAX_TOKEN_TTL_HOURS).contains(&hours) {
        return Err(format!(
            "ERM_TOKEN_TTL_HOURS must be between 1 and {MAX_TOKEN_TTL_HOURS}"
        ));
    }
    Ok(hours)
}

fn parse_registration(value: &str) -> Result<RegistrationMode, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "open" => Ok(RegistrationMode::Open),
        "closed" => Ok(RegistrationMode::Closed),
        other => Err(format!(
            "Invalid ERM_REGISTRATION '{other}': expected 'open' or 'closed'"
        )),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
