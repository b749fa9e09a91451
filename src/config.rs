use std::env;
use thiserror::Error;

/// Errors that can occur while loading settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "{0} environment variable is required.\n\
         Set it with: export {0}=<value>"
    )]
    Missing(&'static str),
}

/// Runtime settings for the repository backend, loaded from environment
/// variables.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Provider key selecting the client implementation (e.g. "gitlab")
    pub provider: String,
    /// Base URL of the provider's REST API
    pub url: String,
    /// Private access token
    pub token: String,
    /// Project identifier (numeric id or "group/project" path)
    pub project_id: String,
    /// Branch the list files live on
    pub branch: String,
}

impl Settings {
    /// Load settings from `DOMAIN_REPO_*` environment variables.
    ///
    /// `DOMAIN_REPO_BRANCH` is optional and defaults to `main`; the other
    /// variables are required.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] naming the first absent variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            provider: require("DOMAIN_REPO_PROVIDER")?,
            url: require("DOMAIN_REPO_URL")?.trim_end_matches('/').to_owned(),
            token: require("DOMAIN_REPO_TOKEN")?,
            project_id: require("DOMAIN_REPO_PROJECT_ID")?,
            branch: env::var("DOMAIN_REPO_BRANCH").unwrap_or_else(|_| "main".to_owned()),
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_can_be_constructed_directly() {
        let settings = Settings {
            provider: "gitlab".into(),
            url: "https://gitlab.example.com/api/v4".into(),
            token: "secret".into(),
            project_id: "42".into(),
            branch: "main".into(),
        };
        assert_eq!(settings.provider, "gitlab");
        assert_eq!(settings.branch, "main");
    }

    #[test]
    fn missing_variable_names_itself() {
        let err = ConfigError::Missing("DOMAIN_REPO_TOKEN");
        assert!(err.to_string().contains("DOMAIN_REPO_TOKEN"));
    }
}
