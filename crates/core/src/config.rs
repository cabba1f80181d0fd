use std::{sync::Arc, time::Duration};

use reqwest::Client;

use crate::{
    error::{NotesError, Result},
    generator::NotesGenerator,
    provider::Provider,
    service::HttpGenerationService,
    types::ListPolicy,
};

pub const PROVIDER_ENV: &str = "LECTURE_NOTES_PROVIDER";
pub const MODEL_ENV: &str = "LECTURE_NOTES_MODEL";
pub const BASE_URL_ENV: &str = "LECTURE_NOTES_BASE_URL";
pub const TIMEOUT_ENV: &str = "LECTURE_NOTES_TIMEOUT_SECS";
pub const LIST_POLICY_ENV: &str = "LECTURE_NOTES_LIST_POLICY";

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub provider: Provider,
    /// Overrides the provider's default model.
    pub model: Option<String>,
    pub base_url: Option<String>,
    /// `None` waits for the service indefinitely.
    pub timeout: Option<Duration>,
    pub list_policy: ListPolicy,
    pub api_key: Option<String>,
}

impl Config {
    /// Load `.env` if present, then read the environment.
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|_| None)
    }

    /// Like [`Config::from_env`], but `overrides` is consulted first.
    pub fn from_env_with(overrides: impl Fn(&str) -> Option<String>) -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| overrides(key).or_else(|| std::env::var(key).ok()))
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = match get(PROVIDER_ENV) {
            Some(name) => name.parse()?,
            None => Provider::default(),
        };
        let list_policy = match get(LIST_POLICY_ENV) {
            Some(policy) => policy.parse()?,
            None => ListPolicy::default(),
        };
        let timeout = match get(TIMEOUT_ENV) {
            Some(secs) => parse_timeout_secs(&secs)?,
            None => None,
        };
        let api_key = get(provider.config().env_var);

        Ok(Self {
            provider,
            model: get(MODEL_ENV),
            base_url: get(BASE_URL_ENV),
            timeout,
            list_policy,
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or(self.provider.config().model)
    }

    /// Construct the HTTP-backed generator described by this config.
    pub fn build_generator(&self) -> Result<NotesGenerator> {
        let api_key = match &self.api_key {
            Some(key) => key.clone(),
            None => {
                tracing::warn!(
                    env_var = self.provider.config().env_var,
                    "no API key configured; requests will be rejected by {}",
                    self.provider.name()
                );
                String::new()
            }
        };

        let client = Client::builder().build()?;
        let mut service = HttpGenerationService::new(client, self.provider, api_key);
        if let Some(base_url) = &self.base_url {
            service = service.with_base_url(base_url.clone());
        }

        Ok(NotesGenerator::new(Arc::new(service), self.model())
            .with_timeout(self.timeout)
            .with_list_policy(self.list_policy))
    }
}

/// Seconds as a timeout; `0` disables it.
pub fn parse_timeout_secs(value: &str) -> Result<Option<Duration>> {
    let secs: u64 = value
        .trim()
        .parse()
        .map_err(|_| NotesError::InvalidConfig {
            reason: format!("timeout must be a whole number of seconds, got `{value}`"),
        })?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}
