use std::{net::SocketAddr, path::PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {source}")]
    InvalidAddr {
        var: &'static str,
        source: std::net::AddrParseError,
    },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub mongodb_uri: String,
    pub database_name: String,
    pub api_addr: SocketAddr,
    pub upload_addr: SocketAddr,
    pub upload_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            database_name: "sumon".to_string(),
            api_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            upload_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            upload_dir: PathBuf::from("uploadedfiles"),
        }
    }
}

impl Settings {
    /// Reads the settings from the environment, falling back to the local
    /// defaults for anything unset. Call `dotenvy::dotenv` first to pick up
    /// a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let addr = |var: &'static str, default: SocketAddr| match lookup(var) {
            Some(value) => value
                .parse()
                .map_err(|source| ConfigError::InvalidAddr { var, source }),
            None => Ok(default),
        };

        Ok(Self {
            api_addr: addr("API_ADDR", defaults.api_addr)?,
            upload_addr: addr("UPLOAD_ADDR", defaults.upload_addr)?,
            mongodb_uri: lookup("MONGODB_URI").unwrap_or(defaults.mongodb_uri),
            database_name: lookup("DATABASE_NAME").unwrap_or(defaults.database_name),
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::{ConfigError, Settings};

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(|_| None).unwrap();

        assert_eq!(settings.mongodb_uri, "mongodb://localhost:27017");
        assert_eq!(settings.database_name, "sumon");
        assert_eq!(settings.api_addr.port(), 5000);
        assert_eq!(settings.upload_addr.port(), 8080);
        assert_eq!(settings.upload_dir.to_str(), Some("uploadedfiles"));
    }

    #[test]
    fn test_overrides() {
        let env = HashMap::from([
            ("DATABASE_NAME", "marketplace"),
            ("API_ADDR", "127.0.0.1:9000"),
        ]);

        let settings = Settings::from_lookup(|name| env.get(name).map(|it| it.to_string())).unwrap();

        assert_eq!(settings.database_name, "marketplace");
        assert_eq!(settings.api_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(settings.upload_addr.port(), 8080);
    }

    #[test]
    fn test_invalid_addr() {
        let err = Settings::from_lookup(|name| (name == "UPLOAD_ADDR").then(|| "8080".to_string()))
            .unwrap_err();

        assert_matches!(err, ConfigError::InvalidAddr { var: "UPLOAD_ADDR", .. });
    }
}
