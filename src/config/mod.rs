use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub cache: CacheConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub csrf_token_ttl_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Memory,
    Redis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub redis_url: Option<String>,
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_bytes: usize,
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub public_base_url: String,
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
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout_secs =
                v.parse().unwrap_or(self.database.connection_timeout_secs);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_CSRF_TOKEN_TTL_SECS") {
            self.security.csrf_token_ttl_secs =
                v.parse().unwrap_or(self.security.csrf_token_ttl_secs);
        }

        // Cache overrides
        if let Ok(v) = env::var("CACHE_BACKEND") {
            self.cache.backend = match v.to_lowercase().as_str() {
                "redis" => CacheBackend::Redis,
                _ => CacheBackend::Memory,
            };
        }
        if let Ok(v) = env::var("REDIS_URL") {
            self.cache.redis_url = Some(v);
        }
        if let Ok(v) = env::var("CACHE_SWEEP_INTERVAL_SECS") {
            self.cache.sweep_interval_secs =
                v.parse().unwrap_or(self.cache.sweep_interval_secs);
        }

        // Upload overrides
        if let Ok(v) = env::var("UPLOAD_MAX_BYTES") {
            self.upload.max_bytes = v.parse().unwrap_or(self.upload.max_bytes);
        }
        if let Ok(v) = env::var("S3_BUCKET") {
            self.upload.bucket = v;
        }
        if let Ok(v) = env::var("S3_REGION") {
            self.upload.region = v;
        }
        if let Ok(v) = env::var("S3_ENDPOINT") {
            self.upload.endpoint = Some(v);
        }
        if let Ok(v) = env::var("S3_ACCESS_KEY") {
            self.upload.access_key = Some(v);
        }
        if let Ok(v) = env::var("S3_SECRET_KEY") {
            self.upload.secret_key = Some(v);
        }
        if let Ok(v) = env::var("UPLOAD_PUBLIC_BASE_URL") {
            self.upload.public_base_url = v;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig { max_connections: 10, connection_timeout_secs: 30 },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7, // 1 week
                csrf_token_ttl_secs: 3600,
            },
            cache: CacheConfig {
                backend: CacheBackend::Memory,
                redis_url: None,
                sweep_interval_secs: 60,
            },
            upload: UploadConfig {
                max_bytes: 10 * 1024 * 1024, // 10MB
                bucket: "pagecraft-dev".to_string(),
                region: "us-east-1".to_string(),
                endpoint: Some("http://localhost:9000".to_string()),
                access_key: None,
                secret_key: None,
                public_base_url: "http://localhost:9000/pagecraft-dev".to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig { max_connections: 20, connection_timeout_secs: 10 },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                csrf_token_ttl_secs: 1800,
            },
            cache: CacheConfig {
                backend: CacheBackend::Memory,
                redis_url: None,
                sweep_interval_secs: 60,
            },
            upload: UploadConfig {
                max_bytes: 10 * 1024 * 1024,
                bucket: "pagecraft-staging".to_string(),
                region: "us-east-1".to_string(),
                endpoint: None,
                access_key: None,
                secret_key: None,
                public_base_url: "https://cdn-staging.example.com".to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig { max_connections: 50, connection_timeout_secs: 5 },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                csrf_token_ttl_secs: 900,
            },
            cache: CacheConfig {
                backend: CacheBackend::Redis,
                redis_url: None,
                sweep_interval_secs: 300,
            },
            upload: UploadConfig {
                max_bytes: 10 * 1024 * 1024,
                bucket: "pagecraft".to_string(),
                region: "us-east-1".to_string(),
                endpoint: None,
                access_key: None,
                secret_key: None,
                public_base_url: "https://cdn.example.com".to_string(),
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
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.upload.max_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.cache.backend, CacheBackend::Redis);
        assert_eq!(config.security.jwt_expiry_hours, 4);
        assert_eq!(config.security.csrf_token_ttl_secs, 900);
    }
}
