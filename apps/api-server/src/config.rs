//! Application configuration loaded from environment variables.

use std::env;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use inkpost_infra::{DatabaseConfig, JwtConfig};

/// Application configuration, built once at startup and handed to the
/// services that need it.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs the server on in-memory stores.
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    pub uploads: UploadConfig,
    /// Frontend origin allowed to call the API with credentials.
    pub cors_origin: String,
    /// Whether the session cookie carries the `Secure` attribute.
    pub secure_cookies: bool,
}

/// Where uploads go and how they are exposed.
///
/// `dir` is relative to the working directory and is served at `/<dir>`, so a
/// stored cover path is also its URL path.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub dir: PathBuf,
    /// URL prefix the upload directory is served under.
    pub public_prefix: String,
    pub max_bytes: usize,
}

impl UploadConfig {
    /// Normalized directory and public prefix for a configured upload path.
    ///
    /// Only plain relative paths are accepted; absolute paths and `..` would
    /// make stored cover paths diverge from their URLs.
    pub fn location(raw: &str) -> Option<(PathBuf, String)> {
        let mut dir = PathBuf::new();
        let mut segments = Vec::new();
        for component in Path::new(raw).components() {
            match component {
                Component::Normal(part) => {
                    segments.push(part.to_str()?.to_string());
                    dir.push(part);
                }
                Component::CurDir => {}
                _ => return None,
            }
        }
        if segments.is_empty() {
            return None;
        }
        Some((dir, format!("/{}", segments.join("/"))))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
            database: None,
            jwt: JwtConfig::default(),
            uploads: UploadConfig {
                dir: PathBuf::from("uploads"),
                public_prefix: "/uploads".to_string(),
                max_bytes: 10 * 1024 * 1024,
            },
            cors_origin: "http://localhost:3000".to_string(),
            secure_cookies: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let database = env::var("DATABASE_URL").ok().map(|url| {
            let mut db = DatabaseConfig::new(url);
            db.max_connections = parse_or("DB_MAX_CONNECTIONS", db.max_connections);
            db.min_connections = parse_or("DB_MIN_CONNECTIONS", db.min_connections);
            db
        });

        let production = env::var("RUST_ENV")
            .map(|v| v == "production" || v == "prod")
            .unwrap_or(false);

        let jwt = JwtConfig {
            secret: env::var("JWT_SECRET").unwrap_or(defaults.jwt.secret),
            issuer: env::var("JWT_ISSUER").unwrap_or(defaults.jwt.issuer),
        };
        if jwt.uses_default_secret() {
            if production {
                tracing::error!(
                    "SECURITY: Using default JWT secret in production! Set JWT_SECRET environment variable."
                );
            } else {
                tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
            }
        }

        let (upload_dir, public_prefix) = match env::var("UPLOAD_DIR") {
            Ok(raw) => UploadConfig::location(&raw).unwrap_or_else(|| {
                tracing::warn!(
                    upload_dir = %raw,
                    "UPLOAD_DIR must be a relative path without '..'; using the default"
                );
                (defaults.uploads.dir.clone(), defaults.uploads.public_prefix.clone())
            }),
            Err(_) => (defaults.uploads.dir, defaults.uploads.public_prefix),
        };
        let uploads = UploadConfig {
            dir: upload_dir,
            public_prefix,
            max_bytes: parse_or("UPLOAD_MAX_BYTES", defaults.uploads.max_bytes),
        };

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_or("PORT", defaults.port),
            database,
            jwt,
            uploads,
            cors_origin: env::var("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            secure_cookies: env::var("COOKIE_SECURE")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(defaults.secure_cookies),
        }
    }
}

/// Parse `key` from the environment, falling back to `default` when unset or
/// malformed.
fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_location_serves_relative_dir_at_its_path() {
        assert_eq!(
            UploadConfig::location("uploads"),
            Some((PathBuf::from("uploads"), "/uploads".to_string()))
        );
        assert_eq!(
            UploadConfig::location("./data/covers/"),
            Some((PathBuf::from("data/covers"), "/data/covers".to_string()))
        );
    }

    #[test]
    fn test_upload_location_rejects_paths_outside_working_dir() {
        assert_eq!(UploadConfig::location("/var/lib/inkpost"), None);
        assert_eq!(UploadConfig::location("../uploads"), None);
        assert_eq!(UploadConfig::location("data/../../x"), None);
        assert_eq!(UploadConfig::location("."), None);
        assert_eq!(UploadConfig::location(""), None);
    }

    #[test]
    fn test_default_upload_dir_matches_prefix() {
        let uploads = AppConfig::default().uploads;

        let (dir, prefix) = UploadConfig::location("uploads").unwrap();

        assert_eq!(uploads.dir, dir);
        assert_eq!(uploads.public_prefix, prefix);
    }
}
