//! Client configuration
//!
//! [`ClientConfig`] is the plain-data form of every constructor option. It can
//! be filled field by field, through [`ClientBuilder`](crate::ClientBuilder),
//! or deserialized from any serde source. Keys it does not know about are
//! kept in [`ClientConfig::extra`] and reported at debug level when the
//! client is built.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{DurationSecondsWithFrac, serde_as};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::transport::{AuthScheme, TlsPolicy};

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Certificate validation setting: a flag, or the path of a CA bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VerifyCertificate {
    /// `true` validates against the built-in roots, `false` disables validation
    Flag(bool),
    /// Validate against the certificates in this PEM file
    CaBundle(PathBuf),
}

impl Default for VerifyCertificate {
    fn default() -> Self {
        Self::Flag(true)
    }
}

impl VerifyCertificate {
    /// TLS policy for a secure session
    ///
    /// An empty bundle path counts as "no validation", like `false`.
    pub fn tls_policy(&self) -> TlsPolicy {
        match self {
            Self::Flag(true) => TlsPolicy::Verify,
            Self::Flag(false) => TlsPolicy::Insecure,
            Self::CaBundle(path) if path.as_os_str().is_empty() => TlsPolicy::Insecure,
            Self::CaBundle(path) => TlsPolicy::CaBundle(path.clone()),
        }
    }
}

impl From<bool> for VerifyCertificate {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

impl From<PathBuf> for VerifyCertificate {
    fn from(path: PathBuf) -> Self {
        Self::CaBundle(path)
    }
}

/// Connection parameters of one remote endpoint
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server host name; required
    pub host: Option<String>,

    /// Server port; omitted from URLs when unset
    pub port: Option<u16>,

    /// API version segment, e.g. `"1.0"`
    pub version: String,

    /// Authentication token sent as `X-Auth-Token`
    pub token: Option<String>,

    /// Tenant sent as `Wazo-Tenant`
    pub tenant: Option<String>,

    /// Use `https` (default) or `http`
    pub https: bool,

    /// Request timeout in seconds; `None` disables it
    #[serde_as(as = "Option<DurationSecondsWithFrac<f64>>", no_default)]
    pub timeout: Option<Duration>,

    /// Certificate validation for secure sessions
    pub verify_certificate: VerifyCertificate,

    /// Path prefix placed between host and version
    pub prefix: Option<String>,

    /// `User-Agent` header; defaults to the program name
    pub user_agent: Option<String>,

    /// HTTP auth user name
    pub username: Option<String>,

    /// HTTP auth password
    pub password: Option<String>,

    /// How `username` and `password` are presented: `basic` or `digest`
    pub auth_scheme: AuthScheme,

    /// Options this client does not recognize
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            version: String::new(),
            token: None,
            tenant: None,
            https: true,
            timeout: Some(DEFAULT_TIMEOUT),
            verify_certificate: VerifyCertificate::default(),
            prefix: None,
            user_agent: None,
            username: None,
            password: None,
            auth_scheme: AuthScheme::Basic,
            extra: BTreeMap::new(),
        }
    }
}

impl ClientConfig {
    /// Create a configuration for `host` with every other option defaulted
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            ..Default::default()
        }
    }

    /// Deserialize a configuration from a JSON value
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

/// Normalize a path prefix: leading `/`, no trailing `/`, empty when unset
pub(crate) fn normalize_prefix(prefix: Option<&str>) -> String {
    let trimmed = prefix.unwrap_or_default().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Program name used as the default user agent
pub(crate) fn default_user_agent() -> Option<String> {
    std::env::args_os()
        .next()
        .map(PathBuf::from)
        .and_then(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
        .filter(|name| !name.is_empty())
}
