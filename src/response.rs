//! Response snapshot model.
//!
//! A [`ResponseSnapshot`] is the fully buffered result of one call to
//! [`HttpClient::execute`](crate::client::HttpClient::execute). It either
//! carries an error, in which case every other field holds its default, or
//! the status, protocol, headers, body and the final request that produced
//! the response (after redirects).
use std::borrow::Cow;

use reqwest::{header::HeaderMap, Method, StatusCode, Version};
use url::Url;

use crate::error::ClientError;

/// The request that was actually sent for the final hop of a call.
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    pub method: Method,
    pub url: Url,
    /// Headers set by the client configuration plus the `Cookie` header taken
    /// from the cookie store. Transport defaults such as `accept` and
    /// `accept-encoding` are not included.
    pub headers: HeaderMap,
}

impl RequestSnapshot {
    pub(crate) fn from_request(request: &reqwest::Request) -> Self {
        Self {
            method: request.method().clone(),
            url: request.url().clone(),
            headers: request.headers().clone(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Debug, Default)]
pub struct ResponseSnapshot {
    /// Set when the call failed. Check this before trusting anything else.
    pub error: Option<ClientError>,
    /// Status line, e.g. `"200 OK"`.
    pub status: String,
    pub status_code: u16,
    /// Protocol name, e.g. `"HTTP/1.1"`.
    pub proto: String,
    pub proto_major: u8,
    pub proto_minor: u8,
    pub headers: HeaderMap,
    /// `None` when the length is unknown (chunked or decompressed bodies).
    pub content_length: Option<u64>,
    pub body: Vec<u8>,
    pub request: Option<RequestSnapshot>,
}

impl ResponseSnapshot {
    pub fn from_error(error: ClientError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    pub(crate) fn received(
        status: StatusCode,
        version: Version,
        headers: HeaderMap,
        content_length: Option<u64>,
        body: Vec<u8>,
        request: RequestSnapshot,
    ) -> Self {
        let (proto, proto_major, proto_minor) = protocol_parts(version);
        Self {
            error: None,
            status: status_line(status),
            status_code: status.as_u16(),
            proto: proto.to_string(),
            proto_major,
            proto_minor,
            headers,
            content_length,
            body,
            request: Some(request),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn error(&self) -> Option<&ClientError> {
        self.error.as_ref()
    }

    pub fn into_result(mut self) -> Result<Self, ClientError> {
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Case-insensitive response header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_str(), reason),
        None => status.as_str().to_string(),
    }
}

fn protocol_parts(version: Version) -> (&'static str, u8, u8) {
    match version {
        Version::HTTP_09 => ("HTTP/0.9", 0, 9),
        Version::HTTP_10 => ("HTTP/1.0", 1, 0),
        Version::HTTP_2 => ("HTTP/2.0", 2, 0),
        Version::HTTP_3 => ("HTTP/3.0", 3, 0),
        _ => ("HTTP/1.1", 1, 1),
    }
}
