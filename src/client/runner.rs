use log::debug;
use reqwest::{
    cookie::CookieStore,
    header::{COOKIE, LOCATION},
    Client, Method, Response,
};
use url::Url;

use crate::{
    error::ClientError,
    response::{RequestSnapshot, ResponseSnapshot},
};

use super::{
    redirect::{follow, outgoing_headers, Hop, MAX_REDIRECTS},
    transport::build_transport,
    HttpClient,
};

pub(super) async fn round_trip(
    config: &HttpClient,
    method: &str,
    url: &str,
    body: Option<&[u8]>,
) -> Result<ResponseSnapshot, ClientError> {
    // Transport problems (proxy, bind address) win over a bad method or URL.
    let client = build_transport(config).await?;

    let hop = Hop {
        method: normalize_method(method)?,
        url: Url::parse(url).map_err(|source| ClientError::InvalidUrl {
            url: url.to_string(),
            source,
        })?,
        body: body.map(<[u8]>::to_vec),
    };

    // The deadline spans every hop and the body read, not each request alone.
    match config.timeout {
        Some(deadline) => tokio::time::timeout(deadline, exchange(&client, config, hop))
            .await
            .map_err(|_| ClientError::Timeout(deadline))?,
        None => exchange(&client, config, hop).await,
    }
}

async fn exchange(
    client: &Client,
    config: &HttpClient,
    mut hop: Hop,
) -> Result<ResponseSnapshot, ClientError> {
    let original = hop.method.clone();
    let mut redirects = 0;
    loop {
        let (response, sent) = send(client, config, &original, &hop).await?;

        let status = response.status();
        let next = follow(&hop, status, response.headers().get(LOCATION))?;
        match next {
            Some(next) => {
                if redirects == MAX_REDIRECTS {
                    return Err(ClientError::TooManyRedirects(MAX_REDIRECTS));
                }
                redirects += 1;
                debug!("{} redirect to {} {}", status, next.method, next.url);
                hop = next;
            }
            None => return read_response(response, sent).await,
        }
    }
}

async fn send(
    client: &Client,
    config: &HttpClient,
    original: &Method,
    hop: &Hop,
) -> Result<(Response, RequestSnapshot), ClientError> {
    let headers = outgoing_headers(config, original)?;
    let mut builder = client
        .request(hop.method.clone(), hop.url.clone())
        .headers(headers);
    if let Some(body) = &hop.body {
        builder = builder.body(body.clone());
    }

    let request = builder.build().map_err(ClientError::Request)?;
    let mut sent = RequestSnapshot::from_request(&request);
    // Mirrors what the transport adds from the jar when no Cookie header is set.
    if !sent.headers.contains_key(COOKIE) {
        if let Some(cookie) = config.cookie_jar.cookies(&hop.url) {
            sent.headers.insert(COOKIE, cookie);
        }
    }
    debug!("{} {}", sent.method, sent.url);

    let response = client
        .execute(request)
        .await
        .map_err(ClientError::Transport)?;
    Ok((response, sent))
}

async fn read_response(
    response: Response,
    request: RequestSnapshot,
) -> Result<ResponseSnapshot, ClientError> {
    let status = response.status();
    let version = response.version();
    let headers = response.headers().clone();
    let content_length = response.content_length();

    let body = response.bytes().await.map_err(ClientError::Body)?;
    debug!(
        "{} {} -> {} ({} bytes)",
        request.method,
        request.url,
        status,
        body.len()
    );

    Ok(ResponseSnapshot::received(
        status,
        version,
        headers,
        content_length,
        body.to_vec(),
        request,
    ))
}

/// Upper-cases the method; an empty method means GET.
fn normalize_method(method: &str) -> Result<Method, ClientError> {
    let upper = method.trim().to_uppercase();
    if upper.is_empty() {
        return Ok(Method::GET);
    }
    Method::from_bytes(upper.as_bytes())
        .map_err(|_| ClientError::InvalidMethod(method.to_string()))
}
