use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub server_addr: String,
    pub token_ttl: usize,

    // session cookie
    pub api_domain: Option<String>,
    pub cookie_secure: bool,

    /// Emails that receive the admin role at sign-up
    pub admin_emails: Vec<String>,

    pub log_dir: String,

    // Rate limiting, 0 disables the limiter
    pub rate_auth_per_min: u32,
    pub rate_protected_per_min: u32,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn parsed_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            db_max_connections: parsed_or("DB_MAX_CONNECTIONS", 10)?,
            token_ttl: parsed_or("TOKEN_TTL", 43_200)?, // default 12 hours

            api_domain: env::var("API_DOMAIN").ok().filter(|d| !d.is_empty()),
            cookie_secure: parsed_or("COOKIE_SECURE", true)?,

            admin_emails: env::var("ADMIN_EMAILS")
                .map(|raw| parse_email_list(&raw))
                .unwrap_or_default(),

            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),

            rate_auth_per_min: parsed_or("RATE_AUTH_PER_MIN", 60)?,
            rate_protected_per_min: parsed_or("RATE_PROTECTED_PER_MIN", 1000)?,
        })
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.admin_emails.iter().any(|e| *e == email)
    }
}

fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            database_url: String::new(),
            db_max_connections: 1,
            jwt_secret: "test-secret".to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            token_ttl: 3600,
            api_domain: None,
            cookie_secure: false,
            admin_emails: vec!["boss@example.com".to_string()],
            log_dir: "logs".to_string(),
            rate_auth_per_min: 0,
            rate_protected_per_min: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_email_list_is_trimmed_and_case_insensitive() {
        let mut config = Config::for_tests();
        config.admin_emails = parse_email_list(" Boss@Example.com, ,ops@example.com ");

        assert_eq!(config.admin_emails, vec!["boss@example.com", "ops@example.com"]);
        assert!(config.is_admin_email("BOSS@example.com"));
        assert!(!config.is_admin_email("worker@example.com"));
    }
}
