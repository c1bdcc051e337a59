//! # Wazo REST Client
//!
//! Base library for clients of Wazo REST services. A concrete client only
//! declares a plugin namespace; its commands are discovered at construction
//! and bound onto it by name.
//!
//! ## Features
//!
//! - Base URL building from host, port, scheme, prefix and API version
//! - A fresh HTTP session per call carrying `Connection: close`, the
//!   authentication token, the tenant and the user agent
//! - Certificate validation on, off, or against a custom CA bundle
//! - Plugin discovery cached per namespace for the life of a [`PluginCache`]
//! - REST command helpers: resource URLs, JSON error reasons, tenant overrides
//! - A pluggable [`Transport`] seam with a blocking reqwest backend
//!
//! ## Architecture
//!
//! ```text
//! ExampleClient / your client
//!        ↓
//! BaseClient ──→ PluginCache ──→ PluginDiscovery (EntryPoints)
//!        ↓
//! SessionFactory ──→ Transport (ReqwestTransport) ──→ Connection
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use wazo_rest_client::{ClientConfig, EntryPoints, ExampleClient, PluginCache};
//!
//! # fn example() -> wazo_rest_client::ClientResult<()> {
//! let entry_points = EntryPoints::new();
//! ExampleClient::register(&entry_points);
//! let plugins = PluginCache::new(entry_points);
//!
//! let mut config = ClientConfig::new("wazo.example.com");
//! config.port = Some(9486);
//! config.version = "1.0".to_string();
//! config.token = Some("the-one-ring".to_string());
//!
//! let client = ExampleClient::new(config, &plugins)?;
//! if client.is_server_reachable() {
//!     let body = client.example().unwrap().test()?;
//!     println!("{}", String::from_utf8_lossy(&body));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! ```rust,no_run
//! # use wazo_rest_client::{ClientConfig, ClientError, EntryPoints, ExampleClient, PluginCache};
//! # let plugins = PluginCache::new(EntryPoints::new());
//! # let client = ExampleClient::new(ClientConfig::new("localhost"), &plugins).unwrap();
//! match client.example().map(|command| command.test()) {
//!     Some(Ok(body)) => println!("{} bytes", body.len()),
//!     Some(Err(ClientError::Http(e))) => eprintln!("server refused: {}", e),
//!     Some(Err(e)) => eprintln!("request failed: {}", e),
//!     None => eprintln!("example command not registered"),
//! }
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all
)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod client;
pub mod command;
pub mod config;
pub mod error;
pub mod example;
pub mod plugins;
pub mod pubsub;
pub mod session;
pub mod transport;

pub use client::{BaseClient, ClientBuilder, ClientHandle};
pub use command::{HttpCommand, RestCommand, RestCommandBase, error_message};
pub use config::{ClientConfig, DEFAULT_TIMEOUT, VerifyCertificate};
pub use error::{ClientError, ClientResult, HttpError, TransportError};
pub use example::{ExampleClient, ExampleCommand};
pub use plugins::{
    AsAny, Command, CommandFactory, CommandSet, DiscoveryResult, EntryPoints, PluginCache,
    PluginDescriptor, PluginDiscovery,
};
pub use pubsub::{Callback, CallbackError, Pubsub};
pub use session::{AUTH_TOKEN_HEADER, Session, SessionFactory, TENANT_HEADER};
pub use transport::{
    AuthScheme, Connection, Credentials, HttpRequest, HttpResponse, ReqwestTransport, SessionSettings,
    TlsPolicy, Transport,
};
