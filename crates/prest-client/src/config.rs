use std::{env, fmt, fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{ConfigError, PrestError, Result};

pub const ENV_BASE_URL: &str = "BASE_URL";
pub const ENV_USER_NAME: &str = "USER_NAME";
pub const ENV_USER_PASSWORD: &str = "USER_PASSWORD";
pub const ENV_DATABASE_NAME: &str = "DATABASE_NAME";

/// Connection options for a pREST gateway.
#[derive(Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClientOptions {
    /// Base URL of the gateway, e.g. `http://localhost:3000`.
    pub base_url: String,

    /// User name for basic authentication.
    pub user_name: String,

    /// Password for basic authentication.
    pub password: String,

    /// Database every table is addressed in.
    pub database: String,
}

impl ClientOptions {
    pub fn new(
        base_url: impl Into<String>,
        user_name: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            user_name: user_name.into(),
            password: password.into(),
            database: database.into(),
        }
    }

    /// Reads `BASE_URL`, `USER_NAME`, `USER_PASSWORD` and `DATABASE_NAME`.
    /// Unset variables are left empty; [`ClientOptions::validate`] reports
    /// the ones that are required.
    pub fn from_env() -> Self {
        let var = |name: &str| env::var(name).unwrap_or_default();
        Self {
            base_url: var(ENV_BASE_URL),
            user_name: var(ENV_USER_NAME),
            password: var(ENV_USER_PASSWORD),
            database: var(ENV_DATABASE_NAME),
        }
    }

    /// Loads options from a TOML file.
    ///
    /// ```toml
    /// base_url = "http://localhost:3000"
    /// user_name = "prest"
    /// password = "prest"
    /// database = "prest"
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("loading client options from {}", path.display());
        let content = fs::read_to_string(path).map_err(|source| {
            ConfigError::Io {
                path: path.display().to_string(),
                source,
            }
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content).map_err(ConfigError::from)?)
    }

    /// Checks that a database name and an absolute base URL are present.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(PrestError::InvalidArgument(
                "Base URL is required".to_string(),
            ));
        }
        if let Err(e) = Url::parse(&self.base_url) {
            return Err(PrestError::InvalidArgument(format!(
                "Invalid base URL `{}`: {e}",
                self.base_url
            )));
        }
        if self.database.trim().is_empty() {
            return Err(PrestError::InvalidArgument(
                "Database name is required".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("base_url", &self.base_url)
            .field("user_name", &self.user_name)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serial_test::serial;
    use tempfile::NamedTempFile;

    use super::*;

    fn options() -> ClientOptions {
        ClientOptions::new("http://localhost:3000", "prest", "secret", "prest")
    }

    #[test]
    fn test_validate_ok() {
        assert!(options().validate().is_ok());
    }

    #[test]
    fn test_validate_missing_database() {
        let opts = ClientOptions {
            database: String::new(),
            ..options()
        };
        let err = opts.validate().unwrap_err();
        assert!(matches!(err, PrestError::InvalidArgument(ref m) if m.contains("Database")));
    }

    #[test]
    fn test_validate_missing_base_url() {
        let opts = ClientOptions {
            base_url: " ".into(),
            ..options()
        };
        assert!(matches!(
            opts.validate(),
            Err(PrestError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_validate_relative_base_url() {
        let opts = ClientOptions {
            base_url: "localhost/api".into(),
            ..options()
        };
        let err = opts.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid base URL"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let debug = format!("{:?}", options());
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_from_toml_str() {
        let opts = ClientOptions::from_toml_str(
            r#"
            base_url = "http://localhost:3000"
            user_name = "prest"
            password = "secret"
            database = "prest"
            "#,
        )
        .unwrap();
        assert_eq!(opts, options());
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let err = ClientOptions::from_toml_str("base_url = ").unwrap_err();
        assert!(matches!(
            err,
            PrestError::Config(ConfigError::TomlDeError(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "base_url = \"http://localhost:3000\"\nuser_name = \"prest\"\npassword = \"secret\"\ndatabase = \"prest\""
        )
        .unwrap();

        let opts = ClientOptions::from_file(file.path()).unwrap();
        assert_eq!(opts, options());
    }

    #[test]
    fn test_from_file_missing() {
        let err = ClientOptions::from_file("/nonexistent/prest.toml").unwrap_err();
        assert!(matches!(
            err,
            PrestError::Config(ConfigError::Io { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        env::set_var(ENV_BASE_URL, "http://gateway:3000");
        env::set_var(ENV_USER_NAME, "admin");
        env::set_var(ENV_USER_PASSWORD, "pw");
        env::set_var(ENV_DATABASE_NAME, "northwind");

        let opts = ClientOptions::from_env();
        assert_eq!(
            opts,
            ClientOptions::new("http://gateway:3000", "admin", "pw", "northwind")
        );

        env::remove_var(ENV_BASE_URL);
        env::remove_var(ENV_USER_NAME);
        env::remove_var(ENV_USER_PASSWORD);
        env::remove_var(ENV_DATABASE_NAME);
    }

    #[test]
    #[serial]
    fn test_from_env_unset_is_empty() {
        env::remove_var(ENV_DATABASE_NAME);
        let opts = ClientOptions::from_env();
        assert!(opts.database.is_empty());
        assert!(opts.validate().is_err());
    }
}
