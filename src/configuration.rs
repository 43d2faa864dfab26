use config::ConfigError;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
}

#[derive(serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Dev,
    Production,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub platform: Platform,
    /// Directory served under /app/
    pub filepath_root: String,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// Token signing and webhook settings
#[derive(serde::Deserialize, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    /// Key the Polka webhook presents as `Authorization: ApiKey <key>`
    pub polka_key: String,
    #[serde(default = "default_access_token_ttl_seconds")]
    pub access_token_ttl_seconds: i64,
    #[serde(default = "default_refresh_token_ttl_days")]
    pub refresh_token_ttl_days: i64,
}

/// Upper bound for `access_token_ttl_seconds` (one day)
pub const MAX_ACCESS_TOKEN_TTL_SECONDS: i64 = 24 * 60 * 60;
/// Upper bound for `refresh_token_ttl_days` (ten years)
pub const MAX_REFRESH_TOKEN_TTL_DAYS: i64 = 3650;

fn default_access_token_ttl_seconds() -> i64 {
    3600
}

fn default_refresh_token_ttl_days() -> i64 {
    60
}

impl AuthSettings {
    pub fn signing_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Access token lifetime, clamped to +/- `MAX_ACCESS_TOKEN_TTL_SECONDS`
    pub fn access_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(
            self.access_token_ttl_seconds
                .clamp(-MAX_ACCESS_TOKEN_TTL_SECONDS, MAX_ACCESS_TOKEN_TTL_SECONDS),
        )
    }

    /// Refresh token lifetime, clamped to +/- `MAX_REFRESH_TOKEN_TTL_DAYS`
    pub fn refresh_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(
            self.refresh_token_ttl_days
                .clamp(-MAX_REFRESH_TOKEN_TTL_DAYS, MAX_REFRESH_TOKEN_TTL_DAYS),
        )
    }

    /// Reject settings the server must not start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::Message(
                "auth.jwt_secret must not be empty".to_string(),
            ));
        }
        if !(0..=MAX_ACCESS_TOKEN_TTL_SECONDS).contains(&self.access_token_ttl_seconds) {
            return Err(ConfigError::Message(format!(
                "auth.access_token_ttl_seconds must be between 0 and {}",
                MAX_ACCESS_TOKEN_TTL_SECONDS
            )));
        }
        if !(0..=MAX_REFRESH_TOKEN_TTL_DAYS).contains(&self.refresh_token_ttl_days) {
            return Err(ConfigError::Message(format!(
                "auth.refresh_token_ttl_days must be between 0 and {}",
                MAX_REFRESH_TOKEN_TTL_DAYS
            )));
        }
        Ok(())
    }
}

// Secrets stay out of logs
impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &"[redacted]")
            .field("polka_key", &"[redacted]")
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("refresh_token_ttl_days", &self.refresh_token_ttl_days)
            .finish()
    }
}

/// Load settings from `configuration.{yaml,toml,json}` (optional) and
/// `APP_`-prefixed environment variables, e.g. `APP_AUTH__JWT_SECRET`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    let settings = settings.try_deserialize::<Settings>()?;
    settings.auth.validate()?;

    Ok(settings)
}
