//! Reqwest-based HTTP backend (blocking)
//!
//! Every [`Transport::open`] builds a dedicated `reqwest::blocking::Client`
//! so that timeout, TLS policy and credentials never leak between sessions.
//!
//! Basic credentials go out with every request. Digest credentials are only
//! used after the server answers `401` with a `Digest` challenge; the request
//! is then sent once more with the computed `Authorization` header.

use digest_auth::{AuthContext, HttpMethod};
use http::header::{AUTHORIZATION, HeaderMap, HeaderValue, WWW_AUTHENTICATE};
use http::StatusCode;
use tracing::debug;

use super::{
    AuthScheme, Connection, Credentials, HttpRequest, HttpResponse, SessionSettings, TlsPolicy,
    Transport,
};
use crate::error::{ClientError, ClientResult, TransportError};

/// A [`Transport`] implementation backed by [`reqwest::blocking`]
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    _private: (),
}

impl ReqwestTransport {
    /// Create the default transport
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for ReqwestTransport {
    fn open(&self, settings: &SessionSettings) -> ClientResult<Box<dyn Connection>> {
        // Explicit rustls: cargo features are additive and another dependency
        // may enable native-tls.
        let mut builder = reqwest::blocking::Client::builder()
            .use_rustls_tls()
            .timeout(settings.timeout);

        match &settings.tls {
            TlsPolicy::Verify => {}
            TlsPolicy::Insecure => {
                // Explicitly requested by the caller; stay quiet about it.
                debug!("Certificate validation disabled for this session");
                builder = builder.danger_accept_invalid_certs(true);
            }
            TlsPolicy::CaBundle(path) => {
                let pem = std::fs::read(path).map_err(|e| {
                    TransportError::Tls(format!(
                        "failed to read CA bundle {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                let certificates = reqwest::Certificate::from_pem_bundle(&pem).map_err(|e| {
                    TransportError::Tls(format!(
                        "failed to parse CA bundle {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                debug!(
                    "Loaded {} certificate(s) from {}",
                    certificates.len(),
                    path.display()
                );
                builder = builder.tls_built_in_root_certs(false);
                for certificate in certificates {
                    builder = builder.add_root_certificate(certificate);
                }
            }
        }

        // Client construction only fails while setting up the TLS backend.
        let client = builder
            .build()
            .map_err(|e| TransportError::Tls(e.to_string()))?;

        Ok(Box::new(ReqwestConnection {
            client,
            credentials: settings.credentials.clone(),
        }))
    }
}

#[derive(Debug)]
struct ReqwestConnection {
    client: reqwest::blocking::Client,
    credentials: Option<Credentials>,
}

impl ReqwestConnection {
    fn execute(
        &self,
        request: &HttpRequest,
        authorization: Option<HeaderValue>,
    ) -> ClientResult<HttpResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone());

        match (&self.credentials, authorization) {
            (_, Some(authorization)) => builder = builder.header(AUTHORIZATION, authorization),
            (Some(credentials), None) if credentials.scheme == AuthScheme::Basic => {
                builder = builder.basic_auth(&credentials.username, Some(&credentials.password));
            }
            _ => {}
        }

        if let Some(body) = &request.body {
            builder = builder.body(body.to_vec());
        }

        let response = builder.send().map_err(map_reqwest_error)?;

        let status = response.status();
        let url = response.url().to_string();
        let headers = response.headers().clone();
        let body = response.bytes().map_err(map_reqwest_error)?;

        Ok(HttpResponse::new(status, url, headers, body))
    }
}

impl Connection for ReqwestConnection {
    fn send(&self, request: HttpRequest) -> ClientResult<HttpResponse> {
        let response = self.execute(&request, None)?;

        let credentials = match &self.credentials {
            Some(credentials) if credentials.scheme == AuthScheme::Digest => credentials,
            _ => return Ok(response),
        };
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }
        let Some(challenge) = digest_challenge(response.headers()) else {
            debug!("401 from {} without a digest challenge", response.url());
            return Ok(response);
        };

        let authorization = digest_authorization(challenge, credentials, &request)?;
        self.execute(&request, Some(authorization))
    }
}

/// The first `WWW-Authenticate` value offering the digest scheme
fn digest_challenge(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(WWW_AUTHENTICATE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| {
            value
                .get(..6)
                .is_some_and(|scheme| scheme.eq_ignore_ascii_case("digest"))
        })
}

/// Answer a digest `challenge` for `request`
fn digest_authorization(
    challenge: &str,
    credentials: &Credentials,
    request: &HttpRequest,
) -> ClientResult<HeaderValue> {
    let url = reqwest::Url::parse(&request.url).map_err(|e| TransportError::Other(Box::new(e)))?;
    let uri = match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    };

    let mut prompt = digest_auth::parse(challenge)
        .map_err(|e| TransportError::Other(format!("invalid digest challenge: {e}").into()))?;
    let context = AuthContext::new_with_method(
        credentials.username.as_str(),
        credentials.password.as_str(),
        uri.as_str(),
        request.body.as_deref(),
        HttpMethod::from(request.method.as_str()),
    );
    let answer = prompt
        .respond(&context)
        .map_err(|e| TransportError::Other(format!("cannot answer digest challenge: {e}").into()))?;

    HeaderValue::from_str(&answer.to_header_string())
        .map_err(|e| TransportError::Other(Box::new(e)).into())
}

/// Map a reqwest error to our [`TransportError`]
///
/// Builder errors at this point come from the request itself, such as an
/// unparsable URL.
fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    let err = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection(err.to_string())
    } else {
        TransportError::Other(Box::new(err))
    };
    ClientError::Transport(err)
}
