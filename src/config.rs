use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Signing secret. May be absent at startup; the token service fails
    /// with a configuration error at first use instead.
    pub secret: Option<String>,
    pub algorithm: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpoonacularConfig {
    /// Upstream API key. Like the JWT secret, checked at first use so the
    /// service can still serve non-recipe routes without it.
    pub api_key: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub spoonacular: SpoonacularConfig,
    pub cors_allowed_origins: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()),
            algorithm: std::env::var("JWT_ALGORITHM").unwrap_or_else(|_| "HS256".into()),
            ttl_minutes: std::env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        };
        let spoonacular = SpoonacularConfig {
            api_key: std::env::var("SPOONACULAR_API_KEY")
                .ok()
                .filter(|s| !s.is_empty()),
            base_url: std::env::var("SPOONACULAR_BASE_URL")
                .unwrap_or_else(|_| "https://api.spoonacular.com".into()),
        };
        let cors_allowed_origins =
            std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "*".into());
        Ok(Self {
            database_url,
            jwt,
            spoonacular,
            cors_allowed_origins,
        })
    }
}
