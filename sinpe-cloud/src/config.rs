//! Server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration, loaded from the environment
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection URL
    pub database_url: String,
    /// HTTP listen port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// HMAC secret for session cookies and API tokens
    pub jwt_secret: String,
    /// `iss` claim written and required on every token
    pub jwt_issuer: String,
    /// `aud` claim written and required on every token
    pub jwt_audience: String,
    /// Lifetime of merchant API bearer tokens
    pub api_token_hours: i64,
    /// Lifetime of web session cookies
    pub session_hours: i64,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
        std::env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://sinpe.db?mode=rwc".into()),
            http_port: Self::parse_or("HTTP_PORT", 8080),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            jwt_issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "sinpe-cloud".into()),
            jwt_audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "sinpe-api".into()),
            api_token_hours: Self::parse_or("API_TOKEN_HOURS", 2),
            session_hours: Self::parse_or("SESSION_HOURS", 8),
            environment,
        })
    }

    /// Cookies get the `Secure` attribute outside development
    pub fn secure_cookies(&self) -> bool {
        self.environment != "development"
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
            http_port: 0,
            environment: "development".into(),
            jwt_secret: "test-secret-with-enough-entropy-0123456789".into(),
            jwt_issuer: "sinpe-cloud".into(),
            jwt_audience: "sinpe-api".into(),
            api_token_hours: 2,
            session_hours: 8,
        }
    }
}
