use std::{error::Error as _, time::Duration};

use thiserror::Error;

/// Every way a single round trip can fail.
///
/// None of these are raised to the caller of [`HttpClient::execute`]; they are
/// stored on the returned snapshot instead. `Display` renders only this
/// layer; [`ClientError::report`] appends the causes.
///
/// [`HttpClient::execute`]: crate::client::HttpClient::execute
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid proxy URL {proxy}: {reason}")]
    InvalidProxy { proxy: String, reason: String },

    #[error("cannot resolve bind address {addr}: {reason}")]
    BindAddress { addr: String, reason: String },

    #[error("invalid HTTP method {0}")]
    InvalidMethod(String),

    #[error("invalid URL {url}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("invalid redirect location {location}")]
    InvalidRedirect {
        location: String,
        #[source]
        source: url::ParseError,
    },

    #[error("building request failed")]
    Request(#[source] reqwest::Error),

    #[error("request failed")]
    Transport(#[source] reqwest::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("stopped after {0} redirects")]
    TooManyRedirects(usize),

    #[error("reading response body failed")]
    Body(#[source] reqwest::Error),

    #[error("request panicked: {0}")]
    Panicked(String),

    #[error("starting runtime failed")]
    Runtime(#[source] std::io::Error),
}

impl ClientError {
    pub fn is_timeout(&self) -> bool {
        match self {
            ClientError::Timeout(_) => true,
            ClientError::Transport(err) | ClientError::Body(err) => err.is_timeout(),
            _ => false,
        }
    }

    /// True when the client configuration or the call's own arguments were
    /// rejected. Most of these fail before the first request goes out, but a
    /// header or request-build failure can also surface on a later redirect
    /// hop, after earlier hops already reached the server.
    pub fn is_setup(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidProxy { .. }
                | ClientError::BindAddress { .. }
                | ClientError::InvalidMethod(_)
                | ClientError::InvalidUrl { .. }
                | ClientError::InvalidHeader { .. }
                | ClientError::Request(_)
        )
    }

    /// The message followed by every underlying cause, separated by `: `.
    pub fn report(&self) -> String {
        let mut text = self.to_string();
        let mut cause = self.source();
        while let Some(err) = cause {
            text.push_str(": ");
            text.push_str(&err.to_string());
            cause = err.source();
        }
        text
    }

    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            (*text).to_string()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "unknown panic".to_string()
        };
        ClientError::Panicked(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payloads_keep_their_message() {
        let err = ClientError::from_panic(Box::new("boom"));
        assert_eq!(err.to_string(), "request panicked: boom");

        let err = ClientError::from_panic(Box::new(String::from("owned boom")));
        assert_eq!(err.to_string(), "request panicked: owned boom");

        let err = ClientError::from_panic(Box::new(42_u8));
        assert_eq!(err.to_string(), "request panicked: unknown panic");
    }

    #[test]
    fn setup_errors_are_flagged() {
        let err = ClientError::InvalidMethod("GE T".to_string());
        assert!(err.is_setup());
        assert!(!err.is_timeout());

        let err = ClientError::TooManyRedirects(10);
        assert!(!err.is_setup());
        assert_eq!(err.to_string(), "stopped after 10 redirects");

        let err = ClientError::InvalidHeader {
            name: "bad header".to_string(),
            reason: "invalid HTTP header name".to_string(),
        };
        assert!(err.is_setup());

        let err = ClientError::InvalidRedirect {
            location: "http://[::1".to_string(),
            source: url::Url::parse("http://[::1").unwrap_err(),
        };
        assert!(!err.is_setup());

        let err = ClientError::Timeout(Duration::from_millis(400));
        assert!(err.is_timeout());
        assert!(!err.is_setup());
    }

    #[test]
    fn report_names_each_cause_once() {
        let source = url::Url::parse("no-scheme").unwrap_err();
        let cause = source.to_string();
        let err = ClientError::InvalidUrl {
            url: "no-scheme".to_string(),
            source,
        };

        assert_eq!(err.to_string(), "invalid URL no-scheme");
        let report = err.report();
        assert_eq!(report, format!("invalid URL no-scheme: {}", cause));
        assert_eq!(report.matches(&cause).count(), 1);

        let err = ClientError::Panicked("boom".to_string());
        assert_eq!(err.report(), "request panicked: boom");
    }
}
