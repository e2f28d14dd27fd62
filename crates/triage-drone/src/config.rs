//! Drone connection settings.

use serde::{Deserialize, Serialize};

use crate::error::{DroneError, Result};

pub const DEFAULT_OWNER: &str = "rancher";
pub const DEFAULT_REPO: &str = "rancher";

/// Where to find the Drone server and which repository to triage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DroneConfig {
    /// Drone server URL, e.g. `https://drone-pr.rancher.io`
    pub server_url: String,
    /// Personal access token (optional for public repositories)
    pub token: Option<String>,
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl DroneConfig {
    /// Config for `owner/repo` on `server_url`, without a token.
    pub fn new(server_url: &str, owner: &str, repo: &str) -> Self {
        DroneConfig {
            server_url: server_url.trim_end_matches('/').to_string(),
            token: None,
            owner: owner.to_string(),
            repo: repo.to_string(),
        }
    }

    /// Read `DRONE_SERVER`, `DRONE_TOKEN`, `DRONE_OWNER` and `DRONE_REPO`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let server_url = get("DRONE_SERVER").ok_or(DroneError::NotConfigured("DRONE_SERVER"))?;
        let owner = get("DRONE_OWNER").unwrap_or_else(|| DEFAULT_OWNER.to_string());
        let repo = get("DRONE_REPO").unwrap_or_else(|| DEFAULT_REPO.to_string());

        let config = Self::new(&server_url, &owner, &repo);
        Ok(match get("DRONE_TOKEN") {
            Some(token) => config.with_token(&token),
            None => config,
        })
    }

    /// Set the access token.
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    /// `{server}/api/repos/{owner}/{repo}`
    pub fn repo_url(&self) -> String {
        format!(
            "{}/api/repos/{}/{}",
            self.server_url, self.owner, self.repo
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn new_strips_trailing_slash() {
        let config = DroneConfig::new("https://drone.example.com/", "rancher", "rancher");
        assert_eq!(
            config.repo_url(),
            "https://drone.example.com/api/repos/rancher/rancher"
        );
        assert!(config.token.is_none());
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn missing_server_is_not_configured() {
        let err = DroneConfig::from_lookup(lookup(&[("DRONE_TOKEN", "t")])).unwrap_err();
        assert!(matches!(err, DroneError::NotConfigured("DRONE_SERVER")));

        let err = DroneConfig::from_lookup(lookup(&[("DRONE_SERVER", "")])).unwrap_err();
        assert!(matches!(err, DroneError::NotConfigured(_)));
    }

    #[test]
    fn owner_and_repo_default_to_rancher() {
        let config =
            DroneConfig::from_lookup(lookup(&[("DRONE_SERVER", "https://drone.example.com")]))
                .unwrap();
        assert_eq!(config.owner, DEFAULT_OWNER);
        assert_eq!(config.repo, DEFAULT_REPO);
        assert!(config.token.is_none());
    }

    #[test]
    fn lookup_overrides_defaults_and_sets_token() {
        let config = DroneConfig::from_lookup(lookup(&[
            ("DRONE_SERVER", "https://drone.example.com/"),
            ("DRONE_TOKEN", "secret"),
            ("DRONE_OWNER", "acme"),
            ("DRONE_REPO", "widgets"),
        ]))
        .unwrap();
        assert_eq!(
            config.repo_url(),
            "https://drone.example.com/api/repos/acme/widgets"
        );
        assert_eq!(config.token.as_deref(), Some("secret"));
    }

    #[test]
    fn with_token_sets_token() {
        let config = DroneConfig::new("https://d", "o", "r").with_token("secret");
        assert_eq!(config.token.as_deref(), Some("secret"));
    }
}
