use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub media: MediaConfig,
    pub site: SiteConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Media-library uploads go to object storage: 10MB, image or video.
    pub library_max_bytes: usize,
    /// Legacy local-disk uploads keep their historical 5MB image-only limit.
    pub legacy_max_bytes: usize,
    pub legacy_upload_dir: String,
    pub s3_bucket: String,
    pub public_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Base domain for tenant blogs; public links render as
    /// https://{slug}.{base_domain}.
    pub base_domain: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECT_TIMEOUT_SECS") {
            self.database.connect_timeout_secs = v.parse().unwrap_or(self.database.connect_timeout_secs);
        }

        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        if let Ok(v) = env::var("MEDIA_UPLOAD_DIR") {
            self.media.legacy_upload_dir = v;
        }
        if let Ok(v) = env::var("MEDIA_S3_BUCKET") {
            self.media.s3_bucket = v;
        }
        if let Ok(v) = env::var("MEDIA_PUBLIC_BASE_URL") {
            self.media.public_base_url = v.trim_end_matches('/').to_string();
        }

        if let Ok(v) = env::var("SITE_BASE_DOMAIN") {
            self.site.base_domain = v;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connect_timeout_secs: 30,
            },
            security: SecurityConfig {
                jwt_secret: "dev-only-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
            media: MediaConfig {
                library_max_bytes: 10 * 1024 * 1024,
                legacy_max_bytes: 5 * 1024 * 1024,
                legacy_upload_dir: "uploads".to_string(),
                s3_bucket: "sprilliblo-media-dev".to_string(),
                public_base_url: "http://localhost:9000/sprilliblo-media-dev".to_string(),
            },
            site: SiteConfig {
                base_domain: "sprilliblo.com".to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connect_timeout_secs: 10,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                cors_origins: vec!["https://staging.sprilliblo.com".to_string()],
            },
            media: MediaConfig {
                library_max_bytes: 10 * 1024 * 1024,
                legacy_max_bytes: 5 * 1024 * 1024,
                legacy_upload_dir: "uploads".to_string(),
                s3_bucket: "sprilliblo-media-staging".to_string(),
                public_base_url: "https://media-staging.sprilliblo.com".to_string(),
            },
            site: SiteConfig {
                base_domain: "staging.sprilliblo.com".to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connect_timeout_secs: 5,
            },
            security: SecurityConfig {
                // Must come from JWT_SECRET in production
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                cors_origins: vec!["https://app.sprilliblo.com".to_string()],
            },
            media: MediaConfig {
                library_max_bytes: 10 * 1024 * 1024,
                legacy_max_bytes: 5 * 1024 * 1024,
                legacy_upload_dir: "uploads".to_string(),
                s3_bucket: "sprilliblo-media".to_string(),
                public_base_url: "https://media.sprilliblo.com".to_string(),
            },
            site: SiteConfig {
                base_domain: "sprilliblo.com".to_string(),
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults() {
        let config = AppConfig::development();
        assert_eq!(config.media.library_max_bytes, 10 * 1024 * 1024);
        assert_eq!(config.media.legacy_max_bytes, 5 * 1024 * 1024);
        assert!(!config.security.jwt_secret.is_empty());
    }

    #[test]
    fn production_requires_secret_from_env() {
        let config = AppConfig::production();
        assert!(config.security.jwt_secret.is_empty());
        assert_eq!(config.security.jwt_expiry_hours, 24);
    }
}
