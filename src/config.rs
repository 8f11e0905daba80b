use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::error::MrfError;

pub const CONFIG_FILE_NAME: &str = "mrf.json";
pub const USERNAME_ENV: &str = "COPERNICUSMARINE_SERVICE_USERNAME";
pub const PASSWORD_ENV: &str = "COPERNICUSMARINE_SERVICE_PASSWORD";

const DEFAULT_GBIF_URL: &str = "https://api.gbif.org/v1";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub cmems: Option<CmemsEntry>,
    #[serde(default)]
    pub gbif: Option<GbifEntry>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CmemsEntry {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GbifEntry {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct CmemsSettings {
    pub base_url: Option<String>,
    pub credentials: Option<Credentials>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct GbifSettings {
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub cmems: CmemsSettings,
    pub gbif: GbifSettings,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, MrfError> {
        let config = match path {
            Some(path) => {
                let path = PathBuf::from(path);
                if !path.exists() {
                    return Err(MrfError::MissingConfig(path));
                }
                Self::read(path)?
            }
            None => match Self::discover() {
                Some(path) => Self::read(path)?,
                None => Config::default(),
            },
        };
        Ok(Self::resolve_config(config, |key| std::env::var(key).ok()))
    }

    pub fn resolve_config<F>(config: Config, env: F) -> ResolvedConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let schema_version = config.schema_version.unwrap_or(1);
        let cmems = config.cmems.unwrap_or_default();
        let gbif = config.gbif.unwrap_or_default();

        let lookup = |key: &str| env(key).filter(|value| !value.trim().is_empty());
        let username = lookup(USERNAME_ENV).or(cmems.username);
        let password = lookup(PASSWORD_ENV).or(cmems.password);
        let credentials = match (username, password) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            _ => None,
        };

        ResolvedConfig {
            schema_version,
            cmems: CmemsSettings {
                base_url: cmems.base_url.and_then(trim_url),
                credentials,
                timeout: Duration::from_secs(cmems.timeout_secs.unwrap_or(120)),
            },
            gbif: GbifSettings {
                base_url: trim_base_url(gbif.base_url, DEFAULT_GBIF_URL),
                timeout: Duration::from_secs(gbif.timeout_secs.unwrap_or(60)),
            },
        }
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }
        BaseDirs::new()
            .map(|dirs| {
                dirs.config_dir()
                    .join("marine-records-fetcher")
                    .join(CONFIG_FILE_NAME)
            })
            .filter(|path| path.exists())
    }

    fn read(path: PathBuf) -> Result<Config, MrfError> {
        let content =
            fs::read_to_string(&path).map_err(|_| MrfError::ConfigRead(path.clone()))?;
        serde_json::from_str(&content).map_err(|err| MrfError::ConfigParse(err.to_string()))
    }
}

fn trim_url(url: String) -> Option<String> {
    let url = url.trim().trim_end_matches('/');
    (!url.is_empty()).then(|| url.to_string())
}

fn trim_base_url(value: Option<String>, default: &str) -> String {
    value
        .and_then(trim_url)
        .unwrap_or_else(|| default.to_string())
}
