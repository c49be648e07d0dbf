use serde::Deserialize;

/// Session cookie settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub cookie_secure: bool,
}

/// Outbound SMTP settings; absent in development, where mail is spooled to disk.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// Settings for the hosted generation API.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub app_url: String,
    pub mail_from: String,
    pub session: SessionConfig,
    pub smtp: Option<SmtpConfig>,
    pub generation: GenerationConfig,
}

const FALLBACK_SESSION_SECRET: &str = "fallback-dev-secret-do-not-use-in-production";

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let production = std::env::var("APP_ENV")
            .map(|v| v == "production")
            .unwrap_or(false);

        let secret = std::env::var("SESSION_SECRET").unwrap_or_else(|_| {
            tracing::warn!("SESSION_SECRET is not set, using an insecure fallback secret");
            FALLBACK_SESSION_SECRET.into()
        });

        let smtp = std::env::var("SMTP_HOST").ok().map(|host| SmtpConfig {
            host,
            port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(587),
            username: std::env::var("SMTP_USER").unwrap_or_default(),
            password: std::env::var("SMTP_PASS").unwrap_or_default(),
        });

        let generation = GenerationConfig {
            api_key: std::env::var("GENERATION_API_KEY").unwrap_or_else(|_| {
                tracing::warn!("GENERATION_API_KEY is not set, generation requests will fail");
                String::new()
            }),
            base_url: std::env::var("GENERATION_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
            model: std::env::var("GENERATION_MODEL").unwrap_or_else(|_| "gpt-4-turbo".into()),
        };

        Ok(Self {
            database_url,
            app_url: std::env::var("APP_URL").unwrap_or_else(|_| "http://localhost:8080".into()),
            mail_from: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "Reqsmith <noreply@example.com>".into()),
            session: SessionConfig {
                secret,
                cookie_secure: production,
            },
            smtp,
            generation,
        })
    }
}
