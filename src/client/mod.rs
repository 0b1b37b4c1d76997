mod redirect;
mod runner;
mod transport;

use std::{
    collections::BTreeMap,
    fmt,
    panic::AssertUnwindSafe,
    sync::Arc,
    time::Duration,
};

use futures_util::FutureExt;
use log::warn;
use reqwest::cookie::{CookieStore, Jar};
use url::Url;

use crate::{error::ClientError, response::ResponseSnapshot};

/// Connection options plus the single operation that uses them.
///
/// Every `execute` builds a fresh transport from the current options, so
/// changes made between calls take effect on the next call. Clones share the
/// cookie store.
#[derive(Clone)]
pub struct HttpClient {
    headers: BTreeMap<String, String>,
    pub tls_insecure_skip_verify: bool,
    pub tls_handshake_timeout: Option<Duration>,
    /// Only used when `bind_ip` is set.
    pub dial_timeout: Option<Duration>,
    /// Only used when `bind_ip` is set.
    pub dial_keep_alive: Option<Duration>,
    pub cookie_jar: Arc<Jar>,
    /// Deadline for the whole call, covering every redirect hop and the body.
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
    /// Sent on POST requests only.
    pub content_type: Option<String>,
    pub bind_ip: Option<String>,
    pub proxy: Option<String>,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self {
            headers: BTreeMap::new(),
            tls_insecure_skip_verify: false,
            tls_handshake_timeout: None,
            dial_timeout: None,
            dial_keep_alive: None,
            cookie_jar: Arc::new(Jar::default()),
            timeout: None,
            user_agent: None,
            content_type: None,
            bind_ip: None,
            proxy: None,
        }
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("headers", &self.headers)
            .field("tls_insecure_skip_verify", &self.tls_insecure_skip_verify)
            .field("tls_handshake_timeout", &self.tls_handshake_timeout)
            .field("dial_timeout", &self.dial_timeout)
            .field("dial_keep_alive", &self.dial_keep_alive)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("content_type", &self.content_type)
            .field("bind_ip", &self.bind_ip)
            .field("proxy", &self.proxy)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing cookie store, e.g. one shared with another client.
    pub fn with_cookie_jar(mut self, jar: Arc<Jar>) -> Self {
        self.cookie_jar = jar;
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        self.headers.remove(name)
    }

    pub fn clear_headers(&mut self) {
        self.headers.clear();
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The `Cookie` header the store would send to `url`.
    pub fn cookies_for(&self, url: &Url) -> Option<String> {
        self.cookie_jar
            .cookies(url)
            .and_then(|value| value.to_str().ok().map(str::to_string))
    }

    /// Perform one round trip.
    ///
    /// Never fails and never panics: every problem, including a panic inside
    /// the transport, ends up in [`ResponseSnapshot::error`].
    pub async fn execute(
        &self,
        method: &str,
        url: &str,
        body: Option<&[u8]>,
    ) -> ResponseSnapshot {
        let outcome = AssertUnwindSafe(runner::round_trip(self, method, url, body))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(snapshot)) => snapshot,
            Ok(Err(err)) => {
                warn!("{} {} failed: {}", method, url, err.report());
                ResponseSnapshot::from_error(err)
            }
            Err(payload) => {
                let err = ClientError::from_panic(payload);
                warn!("{} {} failed: {}", method, url, err.report());
                ResponseSnapshot::from_error(err)
            }
        }
    }

    /// Blocking form of [`execute`](Self::execute) for callers without a
    /// runtime. Must not be called from inside an async context.
    pub fn execute_blocking(
        &self,
        method: &str,
        url: &str,
        body: Option<&[u8]>,
    ) -> ResponseSnapshot {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => return ResponseSnapshot::from_error(ClientError::Runtime(err)),
        };

        match std::panic::catch_unwind(AssertUnwindSafe(|| {
            runtime.block_on(self.execute(method, url, body))
        })) {
            Ok(snapshot) => snapshot,
            Err(payload) => ResponseSnapshot::from_error(ClientError::from_panic(payload)),
        }
    }
}
