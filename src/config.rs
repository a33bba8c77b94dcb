use std::time::Duration;

use serde::Deserialize;

use crate::errors::{AppError, Result};

/// Prefix shared by every environment variable read into [`Config`].
pub const ENV_PREFIX: &str = "TCBUILDS_";

fn default_base_url() -> String {
    "https://build2.syncthing.net".to_string()
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_listen() -> String {
    "127.0.0.1:8123".to_string()
}

fn default_cache_secs() -> u64 {
    300
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_fetch_concurrency() -> usize {
    1
}

/// Basic auth pair taken from a `user:password` credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.split_once(':') {
            Some((user, password)) if !user.is_empty() => Ok(Self {
                user: user.to_string(),
                password: password.to_string(),
            }),
            _ => Err(AppError::Config {
                message: "auth must have the form user:password".to_string(),
            }),
        }
    }
}

/// Main configuration struct parsed from `TCBUILDS_*` environment variables.
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// TeamCity server address.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Branch whose latest successful builds are shown.
    #[serde(default = "default_branch")]
    pub branch: String,

    #[serde(default = "default_listen")]
    pub listen: String,

    /// Top level project id; every build configuration is listed when unset.
    pub project: Option<String>,

    /// `user:password` for the authenticated REST namespace.
    pub auth: Option<String>,

    #[serde(default = "default_cache_secs")]
    pub cache_secs: u64,

    /// Custom page title, replacing "Latest builds of <branch>".
    pub title: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            branch: default_branch(),
            listen: default_listen(),
            project: None,
            auth: None,
            cache_secs: default_cache_secs(),
            title: None,
            timeout_secs: default_timeout_secs(),
            fetch_concurrency: default_fetch_concurrency(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let config: Config = envy::prefixed(ENV_PREFIX)
            .from_env()
            .map_err(|e| AppError::Config {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base().is_empty() {
            return Err(AppError::Config {
                message: "base_url must not be empty".to_string(),
            });
        }
        if self.branch.is_empty() {
            return Err(AppError::Config {
                message: "branch must not be empty".to_string(),
            });
        }
        if self.cache_secs == 0 {
            return Err(AppError::Config {
                message: "cache_secs must be greater than zero".to_string(),
            });
        }
        if self.fetch_concurrency == 0 {
            return Err(AppError::Config {
                message: "fetch_concurrency must be greater than zero".to_string(),
            });
        }
        self.credentials()?;
        Ok(())
    }

    /// Base URL without a trailing slash, ready for `{base}{path}` composition.
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn credentials(&self) -> Result<Option<Credentials>> {
        match self.auth.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => Credentials::parse(raw).map(Some),
        }
    }

    pub fn cache_lifetime(&self) -> Duration {
        Duration::from_secs(self.cache_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_split_on_first_colon() {
        let creds = Credentials::parse("builder:se:cret").unwrap();
        assert_eq!(creds.user, "builder");
        assert_eq!(creds.password, "se:cret");
    }

    #[test]
    fn credentials_without_colon_are_rejected() {
        assert!(Credentials::parse("builder").is_err());
        assert!(Credentials::parse(":password").is_err());
    }

    #[test]
    fn empty_auth_means_guest_access() {
        let config = Config {
            auth: Some(String::new()),
            ..Config::default()
        };
        assert_eq!(config.credentials().unwrap(), None);
    }

    #[test]
    fn base_drops_trailing_slash() {
        let config = Config {
            base_url: "https://ci.example.com/".to_string(),
            ..Config::default()
        };
        assert_eq!(config.base(), "https://ci.example.com");
    }

    #[test]
    fn validate_rejects_zero_cache_lifetime() {
        let config = Config {
            cache_secs: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }
}
