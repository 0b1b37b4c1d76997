use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

pub const CONFIG_FILE_NAME: &str = "httpsnap.json";

/// Client options as they appear at the root of the file and in each profile.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ClientSection {
    pub headers: BTreeMap<String, String>,
    #[serde(rename = "tlsInsecureSkipVerify")]
    pub tls_insecure_skip_verify: Option<bool>,
    #[serde(rename = "tlsHandshakeTimeoutMs")]
    pub tls_handshake_timeout_ms: Option<u64>,
    #[serde(rename = "dialTimeoutMs")]
    pub dial_timeout_ms: Option<u64>,
    #[serde(rename = "dialKeepAliveMs")]
    pub dial_keep_alive_ms: Option<u64>,
    #[serde(rename = "timeoutMs")]
    pub timeout_ms: Option<u64>,
    #[serde(rename = "userAgent")]
    pub user_agent: Option<String>,
    #[serde(rename = "contentType")]
    pub content_type: Option<String>,
    #[serde(rename = "bindIp")]
    pub bind_ip: Option<String>,
    pub proxy: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct HttpSnapConfig {
    pub profiles: HashMap<String, ClientSection>,
    #[serde(rename = "defaultProfile")]
    pub default_profile: Option<String>,
    #[serde(flatten)]
    pub base: ClientSection,
    #[serde(flatten)]
    pub extras: HashMap<String, Value>,
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: HttpSnapConfig,
    pub path: PathBuf,
    pub dir: PathBuf,
}

/// Loads `httpsnap.json` from a directory, or the given file directly.
///
/// A missing file is not an error.
pub fn load_config(target: &Path) -> Result<Option<LoadedConfig>> {
    let resolved = if target.is_absolute() {
        target.to_path_buf()
    } else {
        std::env::current_dir()?.join(target)
    };

    let (file_path, dir) = if resolved.is_dir() {
        (resolved.join(CONFIG_FILE_NAME), resolved)
    } else {
        let dir = match resolved.parent() {
            Some(parent) => parent.to_path_buf(),
            None => std::env::current_dir()?,
        };
        (resolved.clone(), dir)
    };

    if !file_path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&file_path)
        .with_context(|| format!("reading config {}", file_path.display()))?;

    let config: HttpSnapConfig = serde_json::from_str(&contents)
        .with_context(|| format!("parsing config {}", file_path.display()))?;

    Ok(Some(LoadedConfig {
        config,
        path: file_path,
        dir,
    }))
}
