use std::time::Duration;

use anyhow::{bail, Result};

use crate::client::HttpClient;

use super::loader::{ClientSection, HttpSnapConfig};

/// Root section with the selected profile merged over it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedSettings {
    pub profile_name: Option<String>,
    pub section: ClientSection,
}

impl ResolvedSettings {
    /// Builds a client carrying these settings.
    pub fn to_client(&self) -> HttpClient {
        let mut client = HttpClient::new();
        self.apply(&mut client);
        client
    }

    /// Copies every configured value onto `client`, leaving the rest alone.
    pub fn apply(&self, client: &mut HttpClient) {
        let section = &self.section;
        for (name, value) in &section.headers {
            client.set_header(name.clone(), value.clone());
        }
        if let Some(skip) = section.tls_insecure_skip_verify {
            client.tls_insecure_skip_verify = skip;
        }
        if let Some(ms) = section.tls_handshake_timeout_ms {
            client.tls_handshake_timeout = Some(Duration::from_millis(ms));
        }
        if let Some(ms) = section.dial_timeout_ms {
            client.dial_timeout = Some(Duration::from_millis(ms));
        }
        if let Some(ms) = section.dial_keep_alive_ms {
            client.dial_keep_alive = Some(Duration::from_millis(ms));
        }
        if let Some(ms) = section.timeout_ms {
            client.timeout = Some(Duration::from_millis(ms));
        }
        if section.user_agent.is_some() {
            client.user_agent = section.user_agent.clone();
        }
        if section.content_type.is_some() {
            client.content_type = section.content_type.clone();
        }
        if section.bind_ip.is_some() {
            client.bind_ip = section.bind_ip.clone();
        }
        if section.proxy.is_some() {
            client.proxy = section.proxy.clone();
        }
    }
}

pub fn resolve_settings(
    config: &HttpSnapConfig,
    requested: Option<&str>,
) -> Result<ResolvedSettings> {
    let mut section = config.base.clone();
    let profile_name = match resolve_profile(config, requested)? {
        Some((name, profile)) => {
            merge(&mut section, profile);
            Some(name.to_string())
        }
        None => None,
    };

    Ok(ResolvedSettings {
        profile_name,
        section,
    })
}

fn resolve_profile<'a>(
    config: &'a HttpSnapConfig,
    requested: Option<&'a str>,
) -> Result<Option<(&'a str, &'a ClientSection)>> {
    if let Some(name) = requested {
        if let Some(profile) = config.profiles.get(name) {
            return Ok(Some((name, profile)));
        }
        bail!("Unknown profile: {}", name);
    }

    if let Some(default) = &config.default_profile {
        if let Some(profile) = config.profiles.get(default) {
            return Ok(Some((default.as_str(), profile)));
        }
        bail!("Default profile {} is not defined", default);
    }

    Ok(config
        .profiles
        .iter()
        .min_by(|a, b| a.0.cmp(b.0))
        .map(|(name, profile)| (name.as_str(), profile)))
}

fn merge(base: &mut ClientSection, overlay: &ClientSection) {
    base.headers.extend(overlay.headers.clone());
    if overlay.tls_insecure_skip_verify.is_some() {
        base.tls_insecure_skip_verify = overlay.tls_insecure_skip_verify;
    }
    if overlay.tls_handshake_timeout_ms.is_some() {
        base.tls_handshake_timeout_ms = overlay.tls_handshake_timeout_ms;
    }
    if overlay.dial_timeout_ms.is_some() {
        base.dial_timeout_ms = overlay.dial_timeout_ms;
    }
    if overlay.dial_keep_alive_ms.is_some() {
        base.dial_keep_alive_ms = overlay.dial_keep_alive_ms;
    }
    if overlay.timeout_ms.is_some() {
        base.timeout_ms = overlay.timeout_ms;
    }
    if overlay.user_agent.is_some() {
        base.user_agent = overlay.user_agent.clone();
    }
    if overlay.content_type.is_some() {
        base.content_type = overlay.content_type.clone();
    }
    if overlay.bind_ip.is_some() {
        base.bind_ip = overlay.bind_ip.clone();
    }
    if overlay.proxy.is_some() {
        base.proxy = overlay.proxy.clone();
    }
}
