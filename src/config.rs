use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
}

/// Credentials for the admin account created at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    pub admin_email: String,
    pub admin_password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// `None` runs the server on the in-memory store.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub seed: SeedConfig,
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").ok();
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "auth-service".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "auth-service-users".into()),
            access_ttl_secs: env_u64("JWT_ACCESS_TTL_SECS", 900),
            refresh_ttl_secs: env_u64("JWT_REFRESH_TTL_SECS", 60 * 60 * 24 * 30),
        };
        let seed = SeedConfig {
            admin_email: std::env::var("SEED_ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@user.com".into()),
            admin_password: std::env::var("SEED_ADMIN_PASSWORD").ok(),
        };
        Ok(Self {
            database_url,
            jwt,
            seed,
        })
    }

    /// Configuration used by tests: in-memory store, 900 second access tokens.
    pub fn test_default() -> Self {
        Self {
            database_url: None,
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                access_ttl_secs: 900,
                refresh_ttl_secs: 60 * 60,
            },
            seed: SeedConfig {
                admin_email: "admin@user.com".into(),
                admin_password: None,
            },
        }
    }
}
