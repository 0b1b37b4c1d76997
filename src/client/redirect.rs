use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, USER_AGENT},
    Method, StatusCode,
};
use url::Url;

use crate::error::ClientError;

use super::{transport::non_empty, HttpClient};

pub(super) const MAX_REDIRECTS: usize = 10;

/// One request in a redirect chain.
#[derive(Debug, Clone)]
pub(super) struct Hop {
    pub method: Method,
    pub url: Url,
    pub body: Option<Vec<u8>>,
}

/// Headers the client configuration puts on every hop.
///
/// User agent first, then content type, then the custom headers, each
/// overwriting whatever is already there under the same name. Content type is
/// sent when the method the call started with is POST, on every hop including
/// a redirect that turned it into GET.
pub(super) fn outgoing_headers(
    config: &HttpClient,
    original_method: &Method,
) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();

    if let Some(user_agent) = non_empty(&config.user_agent) {
        headers.insert(USER_AGENT, header_value(USER_AGENT.as_str(), user_agent)?);
    }

    if let Some(content_type) = non_empty(&config.content_type) {
        if *original_method == Method::POST {
            headers.insert(
                CONTENT_TYPE,
                header_value(CONTENT_TYPE.as_str(), content_type)?,
            );
        }
    }

    for (name, value) in config.headers() {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|err| ClientError::InvalidHeader {
                name: name.to_string(),
                reason: err.to_string(),
            })?;
        headers.insert(header_name, header_value(name, value)?);
    }

    Ok(headers)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ClientError> {
    HeaderValue::from_str(value).map_err(|err| ClientError::InvalidHeader {
        name: name.to_string(),
        reason: err.to_string(),
    })
}

/// Works out where a redirect response sends us, if anywhere.
///
/// 301/302/303 turn everything but GET/HEAD into GET and drop the body.
/// 307/308 replay method and body. A redirect status
/// without a `Location` header is treated as the final response.
pub(super) fn follow(
    hop: &Hop,
    status: StatusCode,
    location: Option<&HeaderValue>,
) -> Result<Option<Hop>, ClientError> {
    let keep_body = match status {
        StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::SEE_OTHER => false,
        StatusCode::TEMPORARY_REDIRECT | StatusCode::PERMANENT_REDIRECT => true,
        _ => return Ok(None),
    };

    let Some(location) = location else {
        return Ok(None);
    };

    let location = String::from_utf8_lossy(location.as_bytes()).into_owned();
    let url = hop
        .url
        .join(&location)
        .map_err(|source| ClientError::InvalidRedirect { location, source })?;

    let method = if keep_body || hop.method == Method::GET || hop.method == Method::HEAD {
        hop.method.clone()
    } else {
        Method::GET
    };

    Ok(Some(Hop {
        method,
        url,
        body: if keep_body { hop.body.clone() } else { None },
    }))
}
