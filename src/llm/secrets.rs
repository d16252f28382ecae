use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::utils::{get_data_dir, strip_controls_and_escapes, trim_line};

pub const API_KEY_ENV: &str = "TOPICPRESS_API_KEY";

const AUTH_FILE_NAME: &str = "auth.json";
const TEXT_PROVIDER: &str = "text_generation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeySource {
    Environment,
    AuthFile,
}

impl ApiKeySource {
    pub fn description(&self) -> &'static str {
        match self {
            ApiKeySource::Environment => "environment variable",
            ApiKeySource::AuthFile => "local auth file",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey {
    pub key: String,
    pub source: ApiKeySource,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct AuthFile {
    #[serde(flatten)]
    providers: HashMap<String, ProviderAuth>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProviderAuth {
    key: String,
}

/// The `auth.json` file that keeps the text-generation API key between runs.
#[derive(Debug, Clone)]
pub struct ApiKeyStore {
    path: PathBuf,
}

impl ApiKeyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_data_dir() -> Result<Self> {
        Ok(Self::new(get_data_dir()?.join(AUTH_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self, api_key: &str) -> Result<()> {
        let cleaned = strip_controls_and_escapes(api_key);
        let trimmed = trim_line(&cleaned).with_context(|| "Cannot store an empty API key")?;

        let mut auth = read_auth_file(&self.path)?.unwrap_or_default();
        auth.providers.insert(
            TEXT_PROVIDER.to_string(),
            ProviderAuth {
                key: trimmed.to_string(),
            },
        );

        write_auth_file(&self.path, &auth)
    }

    pub fn clear(&self) -> Result<bool> {
        let Some(mut auth) = read_auth_file(&self.path)? else {
            return Ok(false);
        };

        if auth.providers.remove(TEXT_PROVIDER).is_none() {
            return Ok(false);
        }

        if auth.providers.is_empty() {
            fs::remove_file(&self.path).with_context(|| {
                format!(
                    "Failed to remove empty auth file at {}",
                    self.path.display()
                )
            })?;
            return Ok(true);
        }

        write_auth_file(&self.path, &auth)?;
        Ok(true)
    }

    pub fn load(&self) -> Result<Option<String>> {
        let Some(auth) = read_auth_file(&self.path)? else {
            return Ok(None);
        };

        Ok(auth
            .providers
            .get(TEXT_PROVIDER)
            .map(|entry| entry.key.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string))
    }

    /// The environment variable wins over the auth file.
    pub fn resolve(&self) -> Result<Option<ApiKey>> {
        if let Ok(value) = env::var(API_KEY_ENV)
            && let Some(key) = trim_line(&value)
        {
            return Ok(Some(ApiKey {
                key: key.to_string(),
                source: ApiKeySource::Environment,
            }));
        }

        Ok(self.load()?.map(|key| ApiKey {
            key,
            source: ApiKeySource::AuthFile,
        }))
    }
}

fn read_auth_file(path: &Path) -> Result<Option<AuthFile>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(parse_auth_contents(&contents, path)?),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => {
            Err(err).with_context(|| format!("Failed to read auth file at {}", path.display()))
        }
    }
}

fn write_auth_file(path: &Path, value: &AuthFile) -> Result<()> {
    let contents = serialize_auth(value)?;
    fs::write(path, contents)
        .with_context(|| format!("Failed to write auth file at {}", path.display()))?;
    Ok(())
}

fn parse_auth_contents(contents: &str, path: &Path) -> Result<Option<AuthFile>> {
    if contents.trim().is_empty() {
        return Ok(Some(AuthFile::default()));
    }

    let parsed: AuthFile = serde_json::from_str(contents)
        .with_context(|| format!("Failed to parse auth file at {}", path.display()))?;
    Ok(Some(parsed))
}

fn serialize_auth(value: &AuthFile) -> Result<String> {
    let contents = serde_json::to_string_pretty(value)?;
    Ok(format!("{contents}\n"))
}
